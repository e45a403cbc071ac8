//! This library reads **GFF** files, the Generic File Format used by Aurora
//! engine games for almost every structured asset (module info, areas,
//! creatures, dialogs, items).
//!
//! # GFF Format Documentation
//!
//! A GFF file is a 56-byte header followed by six cross-referenced tables.
//! All multi-byte integers are little-endian.
//!
//! ## Header
//!
//! | Offset (bytes) | Field                | Description                                         |
//! |----------------|----------------------|-----------------------------------------------------|
//! | 0x0000         | File Type            | 4 bytes: Content tag, e.g. `"IFO "`, `"ARE "`       |
//! | 0x0004         | Version              | 4 bytes: Fixed value `"V3.2"`                       |
//! | 0x0008         | Struct Offset/Count  | 8 bytes: Struct table position and element count    |
//! | 0x0010         | Field Offset/Count   | 8 bytes: Field table position and element count     |
//! | 0x0018         | Label Offset/Count   | 8 bytes: Label table position and element count     |
//! | 0x0020         | Field Data Off/Count | 8 bytes: Field-data blob position and size in bytes |
//! | 0x0028         | Field Idx Off/Count  | 8 bytes: Field-index array position and size        |
//! | 0x0030         | List Idx Off/Count   | 8 bytes: List-index array position and size         |
//!
//! ## Tables
//!
//! - **Struct entry** (12 bytes): `type_tag`, `data_or_offset`,
//!   `field_count`. A struct with one field stores the field index directly
//!   in `data_or_offset`; otherwise `data_or_offset` is a byte offset into
//!   the field-index array where `field_count` contiguous `u32` indices
//!   live.
//! - **Field entry** (12 bytes): `type_tag`, `label_index`,
//!   `data_or_offset`. Types of four bytes or fewer store their value
//!   inline; larger types store an offset into the field-data blob; LIST
//!   stores a byte offset into the list-index array.
//! - **Label entry** (16 bytes): field name, NUL-padded.
//! - **Field data**: variable-width payloads. `CExoString` is a `u32`
//!   length plus bytes; a resref is a `u8` length plus bytes;
//!   `CExoLocString` is a `u32` total length, `u32` string reference,
//!   `u32` substring count, then substrings of `u32 id`, `u32 length`,
//!   bytes, where `id = (language << 1) | gender`.
//! - **List index**: a `u32` count followed by that many `u32` struct
//!   indices.
//!
//! The root structure is the struct-table entry at index zero.
//!
//! Parsing validates table spans at open and every cross-table index
//! lazily per access; typed accessors return `None` on a missing field or
//! a type mismatch so optional fields can be probed.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Access**: Read-only; this library does not rewrite GFF files

pub mod error;
pub mod read;
pub mod types;

pub use read::{Gff, RawField, Struct};
pub use types::{FieldType, Quaternion, Vector3};

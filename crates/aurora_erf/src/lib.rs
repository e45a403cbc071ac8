//! This library reads and writes **ERF** archives, the flat resource
//! containers Aurora engine games use for modules (`.mod`), hak paks
//! (`.hak`), premium modules (`.nwm`), and saves (`.sav`).
//!
//! # ERF Format Documentation
//!
//! An ERF file is a fixed 160-byte header, a localized-description block, a
//! key table naming each resource, a resource table locating each payload,
//! and the payloads themselves. All multi-byte integers are little-endian.
//!
//! ## Header
//!
//! | Offset (bytes) | Field                 | Description                                        |
//! |----------------|-----------------------|----------------------------------------------------|
//! | 0x0000         | File Type             | 4 bytes: `"ERF "`, `"MOD "`, `"HAK "`, `"SAV "`, `"NWM "` |
//! | 0x0004         | Version               | 4 bytes: `"V1.0"` (16-byte resrefs) or `"V1.1"` (32-byte) |
//! | 0x0008         | Language Count        | 4 bytes: Number of localized description strings   |
//! | 0x000C         | Localized String Size | 4 bytes: Byte size of the description block        |
//! | 0x0010         | Entry Count           | 4 bytes: Number of resources in the archive        |
//! | 0x0014         | Localized String Off  | 4 bytes: Offset of the description block           |
//! | 0x0018         | Key Table Offset      | 4 bytes: Offset of the key table                   |
//! | 0x001C         | Resource Table Offset | 4 bytes: Offset of the resource table              |
//! | 0x0020         | Build Year            | 4 bytes: Years since 1900                          |
//! | 0x0024         | Build Day             | 4 bytes: Day of year                               |
//! | 0x0028         | Description StrRef    | 4 bytes: Talk-table reference for the description  |
//! | 0x002C         | Reserved              | 116 bytes: Zero                                    |
//!
//! ## Tables
//!
//! - **Localized description**: `language_count` elements of `u32 id`,
//!   `u32 length`, text bytes, where `id = (language << 1) | gender`.
//! - **Key table**: one element per resource: a NUL-padded resref (16 or
//!   32 bytes by version), a `u32` resource id, a `u16` resource type and
//!   two unused bytes.
//! - **Resource table**: one `(u32 offset, u32 size)` element per resource,
//!   parallel to the key table.
//!
//! The writer emits the key table sorted by `(type, resref)` so consumers
//! that binary-search the index can rely on the order; payloads stay in
//! insertion order.
//!
//! Later ERF revisions (V2.0 and up) add compression and encryption; this
//! library reports them as unsupported rather than misparsing.
//!
//! ## Additional Information
//!
//! - **File Extensions**: `.erf`, `.mod`, `.hak`, `.sav`, `.nwm`
//! - **Endianness**: Little-endian for all multi-byte integers

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use read::ErfArchive;
pub use types::{ErfKind, ErfVersion};
pub use write::{ErfWriter, ErfWriterOptions};

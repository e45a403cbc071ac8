//! This library reads **KEY/BIF** archive pairs, the external-index store
//! for an Aurora engine game's base resources. A single KEY file catalogs
//! resources spread across many BIF data files; each BIF carries its own
//! resource table adding a second level of indirection.
//!
//! # KEY Format Documentation
//!
//! | Offset (bytes) | Field             | Description                                   |
//! |----------------|-------------------|-----------------------------------------------|
//! | 0x0000         | Magic number      | 4 bytes: `"KEY "`                             |
//! | 0x0004         | Version           | 4 bytes: `"V1  "`                             |
//! | 0x0008         | BIF Count         | 4 bytes: Number of file-table entries         |
//! | 0x000C         | Key Count         | 4 bytes: Number of key-table entries          |
//! | 0x0010         | File Table Offset | 4 bytes: Offset of the BIF file table         |
//! | 0x0014         | Key Table Offset  | 4 bytes: Offset of the key table              |
//! | 0x0018         | Build Year        | 4 bytes: Years since 1900                     |
//! | 0x001C         | Build Day         | 4 bytes: Day of year                          |
//! | 0x0020         | Reserved          | 32 bytes: Zero                                |
//!
//! - **File table entry** (12 bytes): `u32` BIF size, `u32` filename
//!   offset, `u16` filename size, `u16` drive bits. Filenames are stored
//!   without terminators and use `\` separators relative to the install
//!   root.
//! - **Key table entry** (22 bytes): 16-byte resref, `u16` resource type,
//!   `u32` resource id, where
//!   `resource_id = (bif_index << 20) | variable_index`.
//!
//! # BIF Format Documentation
//!
//! | Offset (bytes) | Field                 | Description                             |
//! |----------------|-----------------------|-----------------------------------------|
//! | 0x0000         | Magic number          | 4 bytes: `"BIFF"`                       |
//! | 0x0004         | Version               | 4 bytes: `"V1  "`                       |
//! | 0x0008         | Variable Count        | 4 bytes: Variable-resource table length |
//! | 0x000C         | Fixed Count           | 4 bytes: Fixed-resource table length    |
//! | 0x0010         | Variable Table Offset | 4 bytes: Offset of the variable table   |
//!
//! - **Variable table entry** (16 bytes): `u32` id, `u32` payload offset,
//!   `u32` payload size, `u32` resource type.
//!
//! Fixed resources were never shipped by the games; lookups that land
//! outside the variable table report not-found rather than guessing.
//!
//! ## Additional Information
//!
//! - **File Extensions**: `.key`, `.bif`
//! - **Endianness**: Little-endian for all multi-byte integers

pub mod error;
pub mod read;
pub mod types;

pub use read::{BifArchive, KeyIndex};
pub use types::KeyLocation;

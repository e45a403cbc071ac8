//! This library reads **TLK** talk tables, the numbered localized-string
//! databases used by Aurora engine games.
//!
//! # TLK Format Documentation
//!
//! A TLK file is a header, a string-entry table, and a string-data block.
//! All multi-byte integers are little-endian.
//!
//! ## Header
//!
//! | Offset (bytes) | Field              | Description                                      |
//! |----------------|--------------------|--------------------------------------------------|
//! | 0x0000         | Magic number       | 4 bytes: `"TLK "`                                |
//! | 0x0004         | Version            | 4 bytes: `"V3.0"`                                |
//! | 0x0008         | Language ID        | 4 bytes: Language of every string in the table   |
//! | 0x000C         | String Count       | 4 bytes: Number of entries                       |
//! | 0x0010         | String Data Offset | 4 bytes: Offset of the string-data block         |
//!
//! The entry table begins immediately after the header at offset 0x14.
//!
//! ## String Entry
//!
//! Each entry is 40 bytes:
//!
//! | Offset (bytes) | Field            | Description                                          |
//! |----------------|------------------|------------------------------------------------------|
//! | 0x0000         | Flags            | 4 bytes: Bit 0 set when the entry carries text       |
//! | 0x0004         | Sound ResRef     | 16 bytes: Voice-over resource name, NUL-padded       |
//! | 0x0014         | Volume Variance  | 4 bytes: Unused by the game                          |
//! | 0x0018         | Pitch Variance   | 4 bytes: Unused by the game                          |
//! | 0x001C         | String Offset    | 4 bytes: Offset within the string-data block         |
//! | 0x0020         | String Length    | 4 bytes: Length of the text in bytes                 |
//! | 0x0024         | Sound Length     | 4 bytes: Duration of the voice-over in seconds (f32) |
//!
//! ## String References
//!
//! A [`StringRef`] is a 32-bit handle into a talk table. The low 24 bits are
//! the entry index; the flag bit above them selects the custom (module-
//! supplied) table instead of the base game table. `0xFFFFFFFF` is the
//! reserved invalid reference. Out-of-range and text-absent lookups resolve
//! to the empty string rather than an error.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.tlk`
//! - **Endianness**: Little-endian for all multi-byte integers

pub mod error;
pub mod read;
pub mod types;

pub use read::{TalkSet, TalkTable};
pub use types::{Gender, Language, LocString, StringRef, SubString};

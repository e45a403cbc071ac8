//! Shared resource model for the Aurora engine's file-format ecosystem.
//!
//! Every format crate in this workspace parses its bytes through the types
//! defined here:
//!
//! - [`ByteSource`] — a cheaply-cloneable view over an in-memory buffer or a
//!   byte range of an open file. Archive readers hand out sub-range views of
//!   their backing source instead of copying payloads.
//! - [`ByteReader`] — a bounds-checked little-endian cursor over a
//!   [`ByteSource`]. It implements [`std::io::Read`] and [`std::io::Seek`],
//!   so [`binrw`] records and [`byteorder`] primitives parse straight off it.
//! - [`ResRef16`] / [`ResRef32`] — the fixed-width, case-insensitive resource
//!   identifiers used by every container format.
//! - [`ResType`] — the 16-bit resource-kind tag and its extension registry.
//! - [`ResourceKey`] — the `(resref, type)` pair a resource is looked up by.
//! - [`error::Error`] — the error taxonomy shared by all crates.

pub mod error;
pub mod reader;
pub mod resref;
pub mod restype;
pub mod source;

pub use error::{Error, Result};
pub use reader::ByteReader;
pub use resref::{ResRef, ResRef16, ResRef32};
pub use restype::{ResType, ResourceKey};
pub use source::ByteSource;

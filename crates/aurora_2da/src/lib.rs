//! This library reads **2DA** files, the whitespace-delimited text tables
//! Aurora engine games use for rules data (feats, skills, appearance rows,
//! item properties).
//!
//! # 2DA Format Documentation
//!
//! A 2DA file is plain text:
//!
//! ```text
//! 2DA V2.0
//! DEFAULT: 0
//!    LABEL      VALUE     NAME
//! 0  first      1         "two words"
//! 1  second     ****      word
//! ```
//!
//! - The first line is the signature `2DA V2.0`.
//! - An optional `DEFAULT:` line declares the value missing cells resolve
//!   to.
//! - The next non-blank line names the columns; the first token of every
//!   data row is the row label and does not belong to any column.
//! - Cells are whitespace-delimited; a cell quoted with `"` may contain
//!   spaces; the token `****` means "no value".
//!
//! Column lookup is case-insensitive. Typed getters distinguish a missing
//! value from zero or the empty string by returning `None`.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.2da`
//! - **Encoding**: 8-bit text, tolerated as Latin-1

pub mod error;
pub mod read;

pub use read::TwoDA;

//! Error types shared by every crate in the workspace.

use miette::Diagnostic;
use thiserror::Error;

/// Error type for the resource system and all format parsers.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Underlying read or open failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An offset or length overruns a file, table, or blob
    #[error("range {offset:#x}+{len:#x} overruns a region of {size} bytes")]
    Bounds { offset: u64, len: u64, size: u64 },

    /// Header magic or version mismatch
    #[error("bad magic: expected {expected:?}, found {actual:?}")]
    BadMagic {
        expected: &'static str,
        actual: String,
    },

    /// A format feature this library declares unsupported
    #[error("unsupported format feature: {0}")]
    Unsupported(&'static str),

    /// Resource lookup failed across all providers
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Structural violation: inconsistent counts, non-monotonic offsets
    #[error("malformed file: {0}")]
    Malformed(String),
}

impl Error {
    /// Shorthand for a [`Error::Bounds`] produced by a failed range check.
    pub fn bounds(offset: u64, len: u64, size: u64) -> Self {
        Error::Bounds { offset, len, size }
    }

    /// Magic check against an exact expected byte string.
    pub fn bad_magic(expected: &'static str, actual: &[u8]) -> Self {
        Error::BadMagic {
            expected,
            actual: String::from_utf8_lossy(actual).into_owned(),
        }
    }
}

impl From<binrw::Error> for Error {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(e) => Error::Io(e),
            other => Error::Malformed(other.to_string()),
        }
    }
}

/// Generic result type with the crate's [`Error`] as its error variant
pub type Result<T> = core::result::Result<T, Error>;

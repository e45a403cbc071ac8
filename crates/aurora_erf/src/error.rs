//! Error types that can be emitted from this library

pub use aurora_core::error::{Error, Result};

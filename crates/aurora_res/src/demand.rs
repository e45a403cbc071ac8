//! Scoped acquisition handles.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aurora_core::{ByteReader, ByteSource, ResourceKey};

use crate::error::Result;
use crate::temp::TempFile;

/// The shared state behind a byte demand. The manager's cache holds a weak
/// reference to it so concurrent demands for the same resource share one
/// view.
pub(crate) struct DemandShared {
    pub key: ResourceKey,
    pub provider_id: u64,
    pub source: ByteSource,
}

/// A scoped acquisition of a resource's bytes.
///
/// Holds the provider's byte range alive for its lifetime. Movable, not
/// clonable; reuse goes through the manager, which shares the underlying
/// range between overlapping demands.
pub struct Demand {
    pub(crate) shared: Arc<DemandShared>,
}

impl Demand {
    /// The key this demand was opened with.
    pub fn key(&self) -> ResourceKey {
        self.shared.key
    }

    /// Identifier of the provider that served the demand.
    pub fn provider_id(&self) -> u64 {
        self.shared.provider_id
    }

    /// Size of the resource in bytes.
    pub fn len(&self) -> u64 {
        self.shared.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.source.is_empty()
    }

    /// The underlying byte range.
    pub fn source(&self) -> &ByteSource {
        &self.shared.source
    }

    /// A fresh cursor over the resource.
    pub fn reader(&self) -> ByteReader {
        ByteReader::new(self.shared.source.clone())
    }

    /// The whole resource as an owned buffer.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        self.shared.source.to_vec()
    }
}

/// A scoped acquisition of a resource as a real filesystem path.
///
/// When the bytes had to be materialized, the handle owns the temp file
/// and deletes it on drop.
pub struct DemandPath {
    key: ResourceKey,
    path: PathBuf,
    temp: Option<TempFile>,
}

impl DemandPath {
    pub(crate) fn external(key: ResourceKey, path: PathBuf) -> DemandPath {
        DemandPath {
            key,
            path,
            temp: None,
        }
    }

    pub(crate) fn materialized(key: ResourceKey, temp: TempFile) -> DemandPath {
        DemandPath {
            key,
            path: temp.path().to_path_buf(),
            temp: Some(temp),
        }
    }

    /// The key this demand was opened with.
    pub fn key(&self) -> ResourceKey {
        self.key
    }

    /// The real path; valid until this handle drops.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the path is a manager-owned temp file.
    pub fn is_materialized(&self) -> bool {
        self.temp.is_some()
    }
}

//! Providers over ERF containers and KEY/BIF pairs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use aurora_core::{ByteSource, Error, ResourceKey, ResRef16};
use aurora_erf::ErfArchive;
use aurora_key::{BifArchive, KeyIndex};
use tracing::debug;

use crate::error::Result;
use crate::provider::ResourceProvider;

/// A provider over a mounted ERF container (module, HAK, save).
pub struct ErfProvider {
    label: String,
    archive: ErfArchive,
}

impl ErfProvider {
    pub fn new(archive: ErfArchive, label: impl Into<String>) -> ErfProvider {
        ErfProvider {
            label: label.into(),
            archive,
        }
    }

    /// Open an ERF file and wrap it as a provider.
    pub fn open(path: impl AsRef<Path>) -> Result<ErfProvider> {
        let path = path.as_ref();
        Ok(ErfProvider {
            label: format!("erf:{}", path.display()),
            archive: ErfArchive::open(path)?,
        })
    }

    pub fn archive(&self) -> &ErfArchive {
        &self.archive
    }
}

impl ResourceProvider for ErfProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, key: &ResourceKey) -> bool {
        self.archive.contains(key)
    }

    fn open(&self, key: &ResourceKey) -> Result<Option<ByteSource>> {
        self.archive.by_key(key)
    }
}

/// A provider over one KEY index and the BIFs it catalogs.
///
/// BIFs open lazily on first hit and stay cached for the life of the
/// provider; the cache sits behind a mutex so concurrent lookups stay
/// safe.
pub struct KeyBifProvider {
    label: String,
    root: PathBuf,
    key: KeyIndex,
    bifs: Mutex<HashMap<u32, Arc<BifArchive>>>,
}

impl KeyBifProvider {
    pub fn new(key: KeyIndex, root: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        KeyBifProvider {
            label: label.into(),
            root: root.into(),
            key,
            bifs: Mutex::new(HashMap::new()),
        }
    }

    /// Open a `.key` file whose BIF paths are relative to `root`.
    pub fn open(key_path: impl AsRef<Path>, root: impl Into<PathBuf>) -> Result<Self> {
        let key_path = key_path.as_ref();
        Ok(Self::new(
            KeyIndex::open(key_path)?,
            root,
            format!("key:{}", key_path.display()),
        ))
    }

    pub fn index(&self) -> &KeyIndex {
        &self.key
    }

    fn bif(&self, index: u32) -> Result<Arc<BifArchive>> {
        let mut bifs = self.bifs.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bif) = bifs.get(&index) {
            return Ok(bif.clone());
        }
        let reference = self
            .key
            .bif(index)
            .ok_or_else(|| Error::NotFound(format!("BIF {index} in {}", self.label)))?;
        let path = self.root.join(reference.path());
        debug!(bif = %path.display(), "opening BIF");
        let bif = Arc::new(BifArchive::open(&path)?);
        bifs.insert(index, bif.clone());
        Ok(bif)
    }
}

impl ResourceProvider for KeyBifProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, key: &ResourceKey) -> bool {
        let Ok(resref) = ResRef16::try_from(key.resref) else {
            return false;
        };
        self.key.resolve(&resref, key.restype).is_some()
    }

    fn open(&self, key: &ResourceKey) -> Result<Option<ByteSource>> {
        let Ok(resref) = ResRef16::try_from(key.resref) else {
            return Ok(None);
        };
        let Some(location) = self.key.resolve(&resref, key.restype) else {
            return Ok(None);
        };
        let bif = self.bif(location.bif_index)?;
        match bif.open_variable(location.variable_index) {
            Ok(source) => Ok(Some(source)),
            // only a fixed entry could have matched; let the search go on
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

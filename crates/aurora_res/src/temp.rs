//! The manager-owned temp-file pool.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use aurora_core::ResourceKey;
use tempfile::TempDir;
use tracing::debug;

use crate::error::Result;

enum TempRoot {
    /// A directory created for this manager, removed with it
    Owned(TempDir),
    /// A caller-supplied directory the caller owns
    External(PathBuf),
}

/// Materializes resource bytes into uniquely named files.
///
/// Names combine the per-manager prefix with a monotonic counter, so
/// concurrent materializations never collide.
pub(crate) struct TempPool {
    root: TempRoot,
    prefix: String,
    counter: AtomicU64,
}

impl TempPool {
    pub fn new(dir: Option<PathBuf>, prefix: String) -> Result<TempPool> {
        let root = match dir {
            Some(path) => {
                std::fs::create_dir_all(&path)?;
                TempRoot::External(path)
            }
            None => TempRoot::Owned(TempDir::with_prefix(&prefix)?),
        };
        Ok(TempPool {
            root,
            prefix,
            counter: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        match &self.root {
            TempRoot::Owned(dir) => dir.path(),
            TempRoot::External(path) => path,
        }
    }

    /// Write `bytes` to a fresh pool file named after the resource.
    pub fn materialize(&self, key: &ResourceKey, bytes: &[u8]) -> Result<TempFile> {
        let serial = self.counter.fetch_add(1, Ordering::Relaxed);
        let ext = key.restype.ext().unwrap_or("bin");
        let name = format!("{}_{serial:08}_{}.{ext}", self.prefix, key.resref);
        let path = self.dir().join(name);
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), size = bytes.len(), "materialized resource");
        Ok(TempFile { path })
    }
}

/// A pool file deleted when dropped.
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod test {
    use super::TempPool;
    use aurora_core::{ResourceKey, ResRef32, ResType};

    #[test]
    fn names_are_unique_and_files_drop() {
        let pool = TempPool::new(None, "test".into()).unwrap();
        let key = ResourceKey::new(ResRef32::new("thing").unwrap(), ResType::TXT);

        let a = pool.materialize(&key, b"one").unwrap();
        let b = pool.materialize(&key, b"two").unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(std::fs::read(a.path()).unwrap(), b"one");

        let path = a.path().to_path_buf();
        drop(a);
        assert!(!path.exists());
        assert!(b.path().exists());
    }
}

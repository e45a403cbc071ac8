//! Filesystem-backed providers.

use std::path::{Path, PathBuf};

use aurora_core::{ByteSource, ResourceKey};

use crate::error::Result;
use crate::provider::ResourceProvider;

/// Resolves `(resref, type)` against a directory by filename convention:
/// `<dir>/<resref>.<ext>`.
///
/// The lowercase canonical name is tried first; on case-sensitive
/// filesystems a directory scan then matches ignoring case, so assets
/// authored on Windows keep resolving.
pub struct DirectoryProvider {
    root: PathBuf,
    label: String,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> DirectoryProvider {
        let root = root.into();
        DirectoryProvider {
            label: format!("dir:{}", root.display()),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &ResourceKey) -> Option<PathBuf> {
        let ext = key.restype.ext()?;
        let name = format!("{}.{}", key.resref, ext);

        let direct = self.root.join(&name);
        if direct.is_file() {
            return Some(direct);
        }

        let entries = std::fs::read_dir(&self.root).ok()?;
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().eq_ignore_ascii_case(&name)
                && entry.path().is_file()
            {
                return Some(entry.path());
            }
        }
        None
    }
}

impl ResourceProvider for DirectoryProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, key: &ResourceKey) -> bool {
        self.resolve(key).is_some()
    }

    fn open(&self, key: &ResourceKey) -> Result<Option<ByteSource>> {
        match self.resolve(key) {
            Some(path) => Ok(Some(ByteSource::open(path)?)),
            None => Ok(None),
        }
    }

    fn backing_path(&self, key: &ResourceKey) -> Option<PathBuf> {
        self.resolve(key)
    }
}

/// A single file pinned to a fixed key. Used to expose the module's custom
/// talk table through the provider stack.
pub struct FileProvider {
    key: ResourceKey,
    path: PathBuf,
    label: String,
}

impl FileProvider {
    pub fn new(key: ResourceKey, path: impl Into<PathBuf>) -> FileProvider {
        let path = path.into();
        FileProvider {
            key,
            label: format!("file:{}", path.display()),
            path,
        }
    }
}

impl ResourceProvider for FileProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, key: &ResourceKey) -> bool {
        *key == self.key && self.path.is_file()
    }

    fn open(&self, key: &ResourceKey) -> Result<Option<ByteSource>> {
        if !self.contains(key) {
            return Ok(None);
        }
        Ok(Some(ByteSource::open(&self.path)?))
    }

    fn backing_path(&self, key: &ResourceKey) -> Option<PathBuf> {
        self.contains(key).then(|| self.path.clone())
    }
}

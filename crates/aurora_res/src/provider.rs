//! The provider contract the manager searches over.

use std::path::PathBuf;

use aurora_core::{ByteSource, ResourceKey};

use crate::error::Result;

/// Priority classes, highest first. Providers are searched class by class;
/// within a class, earlier registration wins.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ProviderClass {
    /// Loose directories mounted by the caller
    Directory = 0,
    /// The module's custom talk table
    CustomTlk = 1,
    /// The module container itself
    Module = 2,
    /// HAK paks listed by the module
    Hak = 3,
    /// The user's override directory
    Override = 4,
    /// Base-game KEY/BIF indexes
    BaseKey = 5,
    /// Base-game zip archives
    ZipBase = 6,
}

/// A source of resources registered with the resource manager.
///
/// Implementations must be shareable across threads: `open` takes `&self`
/// and any stateful cursor belongs behind the provider's own lock.
pub trait ResourceProvider: Send + Sync {
    /// Human-readable description for diagnostics.
    fn label(&self) -> &str;

    /// Whether this provider holds the resource. Must not do I/O beyond
    /// what was done at mount.
    fn contains(&self, key: &ResourceKey) -> bool;

    /// A view of the resource bytes, or `None` when this provider does not
    /// hold it.
    fn open(&self, key: &ResourceKey) -> Result<Option<ByteSource>>;

    /// A real filesystem path backing the resource, when one exists.
    /// Providers serving archive members return `None` and leave
    /// materialization to the manager.
    fn backing_path(&self, key: &ResourceKey) -> Option<PathBuf> {
        let _ = key;
        None
    }
}

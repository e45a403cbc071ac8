//! An in-memory provider, for generated resources and tests.

use std::sync::Arc;

use aurora_core::{ByteSource, ResourceKey};
use indexmap::IndexMap;

use crate::error::Result;
use crate::provider::ResourceProvider;

/// A provider serving resources straight from memory.
pub struct MemoryProvider {
    label: String,
    entries: IndexMap<ResourceKey, Arc<[u8]>>,
}

impl MemoryProvider {
    pub fn new(label: impl Into<String>) -> MemoryProvider {
        MemoryProvider {
            label: label.into(),
            entries: IndexMap::new(),
        }
    }

    /// Add or replace a resource.
    pub fn insert(&mut self, key: ResourceKey, data: Vec<u8>) {
        self.entries.insert(key, data.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceProvider for MemoryProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, key: &ResourceKey) -> bool {
        self.entries.contains_key(key)
    }

    fn open(&self, key: &ResourceKey) -> Result<Option<ByteSource>> {
        Ok(self
            .entries
            .get(key)
            .map(|data| ByteSource::from_arc(data.clone())))
    }
}

//! The resource manager: an ordered provider stack behind one lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use aurora_core::{Error, ResourceKey, ResRef32, ResType};
use aurora_tlk::{Language, TalkSet, TalkTable};
use bon::Builder;
use tracing::{debug, info, instrument};

use crate::demand::{Demand, DemandPath, DemandShared};
use crate::error::Result;
use crate::module::LoadState;
use crate::provider::{ProviderClass, ResourceProvider};
use crate::temp::TempPool;

/// Diagnostic output injected at construction. The manager reports mounts
/// and materializations here in addition to its tracing events.
pub trait TextSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Options for constructing a [`ResourceManager`].
#[derive(Builder)]
pub struct ManagerOptions {
    /// Default language for locstring resolution
    #[builder(default)]
    pub language: Language,

    /// Directory for materialized temp files; a private directory is
    /// created (and removed with the manager) when unset
    pub temp_dir: Option<PathBuf>,

    /// Per-manager prefix for temp-file names
    #[builder(default = String::from("aurora"))]
    pub temp_prefix: String,

    /// Diagnostic sink
    pub sink: Option<Arc<dyn TextSink>>,
}

pub(crate) struct Mounted {
    pub id: u64,
    pub class: ProviderClass,
    pub seq: u64,
    pub provider: Box<dyn ResourceProvider>,
}

/// An ordered stack of resource providers with one `(name, type)` lookup.
///
/// `open` and `open_as_file` take `&self` and may be called concurrently
/// once mounting is done; `register_provider` and `load_module` take
/// `&mut self` and so demand exclusive access.
pub struct ResourceManager {
    language: Language,
    sink: Option<Arc<dyn TextSink>>,
    pub(crate) temp: TempPool,
    pub(crate) providers: Vec<Mounted>,
    next_id: u64,
    cache: Mutex<HashMap<(u64, ResourceKey), Weak<DemandShared>>>,
    pub(crate) talk: Option<Arc<TalkSet>>,
    pub(crate) state: LoadState,
    pub(crate) module_mounts: Vec<u64>,
}

impl ResourceManager {
    pub fn new(options: ManagerOptions) -> Result<ResourceManager> {
        Ok(ResourceManager {
            language: options.language,
            sink: options.sink,
            temp: TempPool::new(options.temp_dir, options.temp_prefix)?,
            providers: Vec::new(),
            next_id: 0,
            cache: Mutex::new(HashMap::new()),
            talk: None,
            state: LoadState::Init,
            module_mounts: Vec::new(),
        })
    }

    /// Default language for locstring resolution.
    pub fn language(&self) -> Language {
        self.language
    }

    /// The active talk tables, once a module (or caller) installed them.
    pub fn talk(&self) -> Option<Arc<TalkSet>> {
        self.talk.clone()
    }

    /// Install talk tables directly, outside of module loading.
    pub fn install_talk(&mut self, base: Option<TalkTable>, custom: Option<TalkTable>) {
        self.talk = Some(Arc::new(TalkSet::new(base, custom)));
    }

    /// The directory materialized temp files are written into.
    pub fn temp_dir(&self) -> &Path {
        self.temp.dir()
    }

    /// Current position in the module-load state machine.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Number of mounted providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub(crate) fn emit(&self, line: &str) {
        info!("{line}");
        if let Some(sink) = &self.sink {
            sink.write_line(line);
        }
    }

    /// Mount a provider at a priority class and return its id.
    ///
    /// Within a class, providers registered earlier shadow later ones.
    pub fn register_provider(
        &mut self,
        provider: Box<dyn ResourceProvider>,
        class: ProviderClass,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.emit(&format!("mounting {} at {class:?}", provider.label()));
        self.providers.push(Mounted {
            id,
            class,
            seq: id,
            provider,
        });
        self.providers.sort_by_key(|m| (m.class, m.seq));
        id
    }

    pub(crate) fn release_providers(&mut self, ids: &[u64]) {
        if ids.is_empty() {
            return;
        }
        self.providers.retain(|m| !ids.contains(&m.id));
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.retain(|(provider_id, _), _| !ids.contains(provider_id));
    }

    /// Whether any provider holds the resource.
    pub fn exists(&self, resref: ResRef32, restype: ResType) -> bool {
        let key = ResourceKey::new(resref, restype);
        self.providers.iter().any(|m| m.provider.contains(&key))
    }

    /// Open a resource, searching providers in priority order.
    ///
    /// The first provider holding the key wins. Fails with
    /// [`Error::NotFound`] when no provider has it.
    #[instrument(skip(self), err)]
    pub fn open(&self, resref: ResRef32, restype: ResType) -> Result<Demand> {
        let key = ResourceKey::new(resref, restype);
        for mounted in &self.providers {
            if !mounted.provider.contains(&key) {
                continue;
            }
            let cache_key = (mounted.id, key);
            {
                let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(shared) = cache.get(&cache_key).and_then(Weak::upgrade) {
                    debug!(%key, provider = mounted.provider.label(), "demand served from cache");
                    return Ok(Demand { shared });
                }
            }
            let Some(source) = mounted.provider.open(&key)? else {
                continue;
            };
            debug!(%key, provider = mounted.provider.label(), "demand served");
            let shared = Arc::new(DemandShared {
                key,
                provider_id: mounted.id,
                source,
            });
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if cache.len() > 256 {
                cache.retain(|_, weak| weak.strong_count() > 0);
            }
            cache.insert(cache_key, Arc::downgrade(&shared));
            return Ok(Demand { shared });
        }
        Err(Error::NotFound(key.to_string()))
    }

    /// Open a resource as a real filesystem path.
    ///
    /// When the hit provider already backs the resource with a file the
    /// path is handed out directly; otherwise the bytes are written to the
    /// manager's temp pool and the handle deletes the file on drop.
    #[instrument(skip(self), err)]
    pub fn open_as_file(&self, resref: ResRef32, restype: ResType) -> Result<DemandPath> {
        let key = ResourceKey::new(resref, restype);
        for mounted in &self.providers {
            if !mounted.provider.contains(&key) {
                continue;
            }
            if let Some(path) = mounted.provider.backing_path(&key) {
                return Ok(DemandPath::external(key, path));
            }
            let Some(source) = mounted.provider.open(&key)? else {
                continue;
            };
            let bytes = source.to_vec()?;
            let temp = self.temp.materialize(&key, &bytes)?;
            self.emit(&format!("materialized {key} at {}", temp.path().display()));
            return Ok(DemandPath::materialized(key, temp));
        }
        Err(Error::NotFound(key.to_string()))
    }

    /// Canonical resref for a path's file stem.
    pub fn resref32_from_path(path: impl AsRef<Path>) -> Result<ResRef32> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .ok_or_else(|| Error::Malformed(format!("{} has no file name", path.display())))?;
        ResRef32::new(&stem.to_string_lossy().to_ascii_lowercase())
    }

    /// Resource type for a path's extension; unknown extensions map to
    /// [`ResType::INVALID`].
    pub fn restype_from_path(path: impl AsRef<Path>) -> ResType {
        match path.as_ref().extension() {
            Some(ext) => ResType::from_ext(&ext.to_string_lossy()),
            None => ResType::INVALID,
        }
    }
}

//! Resource management for Aurora engine assets.
//!
//! The [`ResourceManager`] presents a flat `(name, type) → bytes` view over
//! an ordered stack of heterogeneous backing stores: loose directories, zip
//! archives, ERF containers, KEY/BIF pairs, and in-memory maps. Providers
//! are searched in priority-class order (see [`ProviderClass`]); within a
//! class, earlier registration wins, so a mounted override directory
//! shadows a module which shadows the base game data.
//!
//! Opening a resource yields a [`Demand`] — a scoped handle over the
//! backing byte range. [`ResourceManager::open_as_file`] yields a
//! [`DemandPath`] instead, materializing through a manager-owned temp pool
//! when the hit provider has no real file to point at; the temp file is
//! deleted when the handle drops.
//!
//! [`ResourceManager::load_module`] orchestrates the usual mount sequence:
//! locate the module, read its IFO, mount listed HAKs and the custom talk
//! table, then the base-game KEY/BIF indexes and zips.
//!
//! Once loading has finished, a manager and its providers may be shared
//! across threads for read-only lookups; `open` takes `&self` and every
//! stateful cursor sits behind its own lock.

pub mod archive;
pub mod demand;
pub mod directory;
pub mod error;
pub mod manager;
pub mod memory;
pub mod module;
pub mod provider;
pub mod temp;
pub mod zip;

pub use archive::{ErfProvider, KeyBifProvider};
pub use demand::{Demand, DemandPath};
pub use directory::{DirectoryProvider, FileProvider};
pub use manager::{ManagerOptions, ResourceManager, TextSink};
pub use memory::MemoryProvider;
pub use module::{LoadState, ModuleLoadParams};
pub use provider::{ProviderClass, ResourceProvider};
pub use zip::{ZipArchive, ZipProvider};

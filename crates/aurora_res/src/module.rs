//! Module loading: building the provider stack for one module.

use std::path::PathBuf;
use std::sync::Arc;

use aurora_core::{Error, ResourceKey, ResRef32, ResType};
use aurora_gff::Gff;
use aurora_tlk::{TalkSet, TalkTable};
use bon::Builder;
use tracing::instrument;

use crate::archive::{ErfProvider, KeyBifProvider};
use crate::directory::{DirectoryProvider, FileProvider};
use crate::error::Result;
use crate::manager::ResourceManager;
use crate::provider::{ProviderClass, ResourceProvider};
use crate::zip::ZipProvider;

/// Where the manager stands in the module-load state machine. Any failing
/// transition unwinds to `Init` with the attempt's mounts released.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LoadState {
    #[default]
    Init,
    FindModule,
    MountModule,
    ReadIfo,
    MountHaks,
    MountCustomTlk,
    MountBaseKeys,
    Ready,
}

/// Parameters for [`ResourceManager::load_module`].
#[derive(Builder, Clone)]
pub struct ModuleLoadParams {
    /// Module name without extension
    pub module_name: String,

    /// Directory holding `.mod` files and unpacked module directories
    pub module_dir: PathBuf,

    /// Game installation root; KEY files and `dialog.tlk` live here
    pub install_dir: PathBuf,

    /// Directory holding `.hak` files; defaults to the module directory
    pub hak_dir: Option<PathBuf>,

    /// Directory holding custom `.tlk` files
    pub tlk_dir: Option<PathBuf>,

    /// The user's override directory
    pub override_dir: Option<PathBuf>,

    /// KEY files to mount, install-relative and without extension, in
    /// priority order
    #[builder(default)]
    pub key_files: Vec<String>,

    /// Base-game zip archives to mount at the lowest priority
    #[builder(default)]
    pub base_zips: Vec<PathBuf>,

    /// Mount only what script tooling needs: the module and the KEYs,
    /// skipping override directories and base zips
    #[builder(default)]
    pub base_resources_only: bool,

    /// Prefer an unpacked module directory over a `.mod` of the same name
    #[builder(default)]
    pub prefer_directory_module: bool,
}

enum ModuleLocation {
    Directory(PathBuf),
    Erf(PathBuf),
}

impl ResourceManager {
    /// Build the provider stack for a module.
    ///
    /// Locates the module, mounts it, reads its IFO for the HAK list and
    /// custom talk table, then mounts those plus the base-game KEY/BIF
    /// indexes and zips. Providers from a previous `load_module` are
    /// released first; on failure every mount made by this call is
    /// released and the manager returns to `Init`.
    #[instrument(skip(self, params), fields(module = %params.module_name), err)]
    pub fn load_module(&mut self, params: &ModuleLoadParams) -> Result<()> {
        let previous = std::mem::take(&mut self.module_mounts);
        self.release_providers(&previous);
        self.talk = None;
        self.state = LoadState::Init;

        match self.mount_module_stack(params) {
            Ok(()) => {
                self.state = LoadState::Ready;
                self.emit(&format!("module {} ready", params.module_name));
                Ok(())
            }
            Err(e) => {
                let attempted = std::mem::take(&mut self.module_mounts);
                self.release_providers(&attempted);
                self.talk = None;
                self.state = LoadState::Init;
                Err(e)
            }
        }
    }

    fn mount_for_module(&mut self, provider: Box<dyn ResourceProvider>, class: ProviderClass) {
        let id = self.register_provider(provider, class);
        self.module_mounts.push(id);
    }

    fn mount_module_stack(&mut self, params: &ModuleLoadParams) -> Result<()> {
        self.state = LoadState::FindModule;
        let location = find_module(params)?;

        self.state = LoadState::MountModule;
        match &location {
            ModuleLocation::Directory(path) => self.mount_for_module(
                Box::new(DirectoryProvider::new(path.clone())),
                ProviderClass::Module,
            ),
            ModuleLocation::Erf(path) => {
                self.mount_for_module(Box::new(ErfProvider::open(path)?), ProviderClass::Module)
            }
        }

        self.state = LoadState::ReadIfo;
        let ifo = self.open(ResRef32::new("module")?, ResType::IFO)?;
        let gff = Gff::new(ifo.source().clone())?;
        let root = gff.root()?;

        let mut haks = Vec::new();
        if let Some(count) = root.list_len("Mod_HakList")? {
            for i in 0..count {
                let Some(element) = root.list_element("Mod_HakList", i)? else {
                    continue;
                };
                if let Some(hak) = element.cexostring("Mod_Hak")? {
                    if !hak.is_empty() {
                        haks.push(hak);
                    }
                }
            }
        } else if let Some(hak) = root.cexostring("Mod_Hak")? {
            if !hak.is_empty() {
                haks.push(hak);
            }
        }
        let custom_tlk = root.cexostring("Mod_CustomTlk")?.unwrap_or_default();

        self.state = LoadState::MountHaks;
        let hak_dir = params.hak_dir.as_ref().unwrap_or(&params.module_dir);
        for hak in &haks {
            let path = hak_dir.join(format!("{hak}.hak"));
            self.mount_for_module(Box::new(ErfProvider::open(&path)?), ProviderClass::Hak);
        }

        self.state = LoadState::MountCustomTlk;
        let mut custom_table = None;
        if !custom_tlk.is_empty() {
            if let Some(tlk_dir) = &params.tlk_dir {
                let path = tlk_dir.join(format!("{custom_tlk}.tlk"));
                custom_table = Some(TalkTable::open(&path)?);
                let key = ResourceKey::new(ResRef32::new(&custom_tlk)?, ResType::TLK);
                self.mount_for_module(
                    Box::new(FileProvider::new(key, &path)),
                    ProviderClass::CustomTlk,
                );
            }
        }

        self.state = LoadState::MountBaseKeys;
        if !params.base_resources_only {
            if let Some(override_dir) = &params.override_dir {
                self.mount_for_module(
                    Box::new(DirectoryProvider::new(override_dir.clone())),
                    ProviderClass::Override,
                );
            }
        }
        for key_name in &params.key_files {
            let path = params.install_dir.join(format!("{key_name}.key"));
            self.mount_for_module(
                Box::new(KeyBifProvider::open(&path, &params.install_dir)?),
                ProviderClass::BaseKey,
            );
        }
        if !params.base_resources_only {
            for zip in &params.base_zips {
                self.mount_for_module(Box::new(ZipProvider::open(zip)?), ProviderClass::ZipBase);
            }
        }

        let dialog = params.install_dir.join("dialog.tlk");
        let base_table = if dialog.is_file() {
            Some(TalkTable::open(&dialog)?)
        } else {
            None
        };
        if base_table.is_some() || custom_table.is_some() {
            self.talk = Some(Arc::new(TalkSet::new(base_table, custom_table)));
        }

        Ok(())
    }
}

fn find_module(params: &ModuleLoadParams) -> Result<ModuleLocation> {
    let unpacked = params.module_dir.join(&params.module_name);
    let packed = params
        .module_dir
        .join(format!("{}.mod", params.module_name));

    if params.prefer_directory_module && unpacked.is_dir() {
        return Ok(ModuleLocation::Directory(unpacked));
    }
    if packed.is_file() {
        return Ok(ModuleLocation::Erf(packed));
    }
    if unpacked.is_dir() {
        return Ok(ModuleLocation::Directory(unpacked));
    }
    Err(Error::NotFound(format!(
        "module {} in {}",
        params.module_name,
        params.module_dir.display()
    )))
}

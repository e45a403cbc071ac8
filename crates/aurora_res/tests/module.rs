//! Module loading: the full mount sequence and its failure unwinding.

mod common;

use std::io::Cursor;
use std::path::Path;

use aurora_core::{ResRef32, ResType};
use aurora_erf::{ErfKind, ErfWriter, ErfWriterOptions};
use aurora_res::{LoadState, ManagerOptions, ModuleLoadParams, ResourceManager};
use aurora_tlk::StringRef;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn write_erf(path: &Path, kind: ErfKind, entries: &[(&str, ResType, Vec<u8>)]) {
    let mut writer = ErfWriter::new(ErfWriterOptions::builder().kind(kind).build());
    for (name, restype, data) in entries {
        writer
            .add(ResRef32::new(name).unwrap(), *restype, data.clone())
            .unwrap();
    }
    let bytes = writer.finish(Cursor::new(Vec::new())).unwrap().into_inner();
    std::fs::write(path, bytes).unwrap();
}

/// Lay out a game tree: modules/, tlk/, override/, install root.
struct Fixture {
    root: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let path = root.path();
        std::fs::create_dir_all(path.join("modules")).unwrap();
        std::fs::create_dir_all(path.join("tlk")).unwrap();
        std::fs::create_dir_all(path.join("override")).unwrap();
        std::fs::create_dir_all(path.join("install").join("data")).unwrap();

        // the module lists one hak and the custom talk table
        write_erf(
            &path.join("modules").join("demo.mod"),
            ErfKind::Mod,
            &[
                (
                    "module",
                    ResType::IFO,
                    common::build_ifo(&["extra"], Some("custom")),
                ),
                ("shared", ResType::TXT, b"from module".to_vec()),
            ],
        );
        write_erf(
            &path.join("modules").join("extra.hak"),
            ErfKind::Hak,
            &[
                ("bonus", ResType::TXT, b"from hak".to_vec()),
                ("shared", ResType::TXT, b"from hak".to_vec()),
            ],
        );

        std::fs::write(
            path.join("tlk").join("custom.tlk"),
            common::build_tlk(&[Some("c0"), Some("custom string")]),
        )
        .unwrap();
        std::fs::write(
            path.join("install").join("dialog.tlk"),
            common::build_tlk(&[Some("base string")]),
        )
        .unwrap();

        // one KEY/BIF pair holding rules.2da
        let table = b"2DA V2.0\n A\n0 base\n";
        let mut bif = common::build_bif(64 + table.len(), &[(0, 64, table.len() as u32, 2017)]);
        bif[64..].copy_from_slice(table);
        std::fs::write(path.join("install").join("data").join("base.bif"), bif).unwrap();
        std::fs::write(
            path.join("install").join("chitin.key"),
            common::build_key(&["data\\base.bif"], &[("rules", 2017, 0)]),
        )
        .unwrap();

        // override shadows the BIF copy
        std::fs::write(
            path.join("override").join("rules.2da"),
            b"2DA V2.0\n A\n0 override\n",
        )
        .unwrap();

        // a base zip at the lowest priority
        std::fs::write(
            path.join("install").join("base.zip"),
            common::build_zip(&[("data/zipped.txt", b"from zip", true)]),
        )
        .unwrap();

        Fixture { root }
    }

    fn params(&self) -> ModuleLoadParams {
        let path = self.root.path();
        ModuleLoadParams::builder()
            .module_name("demo".into())
            .module_dir(path.join("modules"))
            .install_dir(path.join("install"))
            .tlk_dir(path.join("tlk"))
            .override_dir(path.join("override"))
            .key_files(vec!["chitin".into()])
            .base_zips(vec![path.join("install").join("base.zip")])
            .build()
    }
}

fn open_text(manager: &ResourceManager, name: &str, restype: ResType) -> String {
    let demand = manager.open(ResRef32::new(name).unwrap(), restype).unwrap();
    String::from_utf8(demand.to_vec().unwrap()).unwrap()
}

#[traced_test]
#[test]
fn full_module_load() {
    let fixture = Fixture::new();
    let mut manager = ResourceManager::new(ManagerOptions::builder().build()).unwrap();

    manager.load_module(&fixture.params()).unwrap();
    assert_eq!(manager.state(), LoadState::Ready);

    // hak content is reachable
    assert_eq!(open_text(&manager, "bonus", ResType::TXT), "from hak");
    // the module shadows its haks
    assert_eq!(open_text(&manager, "shared", ResType::TXT), "from module");
    // the override directory shadows the base KEY/BIF data
    assert_eq!(
        open_text(&manager, "rules", ResType::TWO_DA),
        "2DA V2.0\n A\n0 override\n"
    );
    // zip-backed base resources sit at the bottom but resolve
    assert_eq!(open_text(&manager, "zipped", ResType::TXT), "from zip");
    // the custom talk table is also exposed as a resource
    assert!(manager.exists(ResRef32::new("custom").unwrap(), ResType::TLK));

    // both talk tables are installed
    let talk = manager.talk().unwrap();
    assert_eq!(talk.resolve(StringRef::base(0)).unwrap(), "base string");
    assert_eq!(
        talk.resolve(StringRef::custom(1)).unwrap(),
        "custom string"
    );
}

#[traced_test]
#[test]
fn failed_load_unwinds_to_init() {
    let fixture = Fixture::new();
    // break the hak the IFO names
    std::fs::remove_file(fixture.root.path().join("modules").join("extra.hak")).unwrap();

    let mut manager = ResourceManager::new(ManagerOptions::builder().build()).unwrap();
    assert!(manager.load_module(&fixture.params()).is_err());
    assert_eq!(manager.state(), LoadState::Init);
    assert_eq!(manager.provider_count(), 0);
    assert!(manager.talk().is_none());

    // a later valid load still works on the same manager
    write_erf(
        &fixture.root.path().join("modules").join("extra.hak"),
        ErfKind::Hak,
        &[("bonus", ResType::TXT, b"restored".to_vec())],
    );
    manager.load_module(&fixture.params()).unwrap();
    assert_eq!(manager.state(), LoadState::Ready);
    assert_eq!(open_text(&manager, "bonus", ResType::TXT), "restored");
}

#[test]
fn reload_releases_previous_module() {
    let fixture = Fixture::new();
    let mut manager = ResourceManager::new(ManagerOptions::builder().build()).unwrap();

    manager.load_module(&fixture.params()).unwrap();
    let after_first = manager.provider_count();
    manager.load_module(&fixture.params()).unwrap();
    assert_eq!(manager.provider_count(), after_first);
}

#[test]
fn base_resources_only_skips_override_and_zips() {
    let fixture = Fixture::new();
    let mut params = fixture.params();
    params.base_resources_only = true;

    let mut manager = ResourceManager::new(ManagerOptions::builder().build()).unwrap();
    manager.load_module(&params).unwrap();

    // the BIF copy wins because no override directory was mounted
    assert_eq!(
        open_text(&manager, "rules", ResType::TWO_DA),
        "2DA V2.0\n A\n0 base\n"
    );
    assert!(manager
        .open(ResRef32::new("zipped").unwrap(), ResType::TXT)
        .is_err());
}

#[test]
fn unpacked_module_directory() {
    let fixture = Fixture::new();
    let unpacked = fixture.root.path().join("modules").join("demo");
    std::fs::create_dir_all(&unpacked).unwrap();
    std::fs::write(
        unpacked.join("module.ifo"),
        common::build_ifo(&[], None),
    )
    .unwrap();
    std::fs::write(unpacked.join("shared.txt"), b"from directory").unwrap();

    let mut params = fixture.params();
    params.prefer_directory_module = true;

    let mut manager = ResourceManager::new(ManagerOptions::builder().build()).unwrap();
    manager.load_module(&params).unwrap();
    assert_eq!(open_text(&manager, "shared", ResType::TXT), "from directory");
}

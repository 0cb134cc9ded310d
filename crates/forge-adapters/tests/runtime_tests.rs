mod common;

use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{read_zip, write_zip, FakeCompiler};
use forge_adapters::runtimes::{INJECT_STEP, RECOMPILE_STEP, SOURCES_STEP};
use forge_adapters::{base_runtime, dev_runtime, BaseRuntimeConfig, DevRuntimeConfig};
use forge_cache::{CacheConfig, CacheService};
use forge_core::{BuildEventKind, BuildSession, Definition, StepRole};
use serde_json::json;

struct Fixture {
    dir: tempfile::TempDir,
    base: Arc<dyn Definition>,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let client = dir.path().join("client.jar");
    let sources = dir.path().join("sources.jar");
    let natives = dir.path().join("natives.jar");
    write_zip(&client, &[("net/Main.class", Some(b"bytecode"))]);
    write_zip(&sources, &[("net/", None), ("net/Main.java", Some(b"class Main {}"))]);
    write_zip(&natives,
              &[("META-INF/", None), ("META-INF/MANIFEST.MF", Some(b"m")), ("liblwjgl.so", Some(b"so"))]);

    let base = base_runtime(BaseRuntimeConfig { name: "joined".into(),
                                                client_jar: client,
                                                sources_jar: sources,
                                                libraries: vec!["/libs/b.jar".into(), "/libs/a.jar".into()],
                                                natives_jar: Some(natives),
                                                asset_index: None,
                                                version_metadata: Some(json!({ "id": "1.21" })) }).unwrap();
    Fixture { dir, base }
}

fn injection(dir: &std::path::Path) -> std::path::PathBuf {
    let patches = dir.join("patches.zip");
    write_zip(&patches,
              &[("net/", None), ("net/Main.java", Some(b"class Patched {}")), ("net/Extra.java", Some(b"class Extra {}"))]);
    patches
}

#[test]
fn base_runtime_exposes_roles() {
    let f = fixture();
    let session = BuildSession::new(Arc::clone(&f.base), Arc::new(forge_core::DirectExecution), f.dir.path().join("work"));

    let listing = session.output_of_role(StepRole::ListLibraries).unwrap();
    assert_eq!(listing.file_name().unwrap(), "output.txt");
    assert_eq!(fs::read_to_string(listing).unwrap(), "-e=/libs/b.jar\n-e=/libs/a.jar\n");

    let natives = session.output_of_role(StepRole::Natives).unwrap();
    assert!(natives.join("liblwjgl.so").is_file());
    assert!(!natives.join("META-INF").exists());

    assert!(f.base.assets().is_none());
    assert_eq!(f.base.patch_base().unwrap().name(), SOURCES_STEP);
    assert_eq!(f.base.version_metadata(), Some(&json!({ "id": "1.21" })));
}

#[test]
fn dev_runtime_overrides_only_sources() {
    let f = fixture();
    let patches = injection(f.dir.path());
    let dev = dev_runtime(Arc::clone(&f.base),
                          DevRuntimeConfig { name: "dev".into(),
                                             injections: vec![patches],
                                             additional_sources: None,
                                             compiler: Arc::new(FakeCompiler::default()),
                                             classpath: vec![],
                                             release: None }).unwrap();

    assert_eq!(dev.delegation_chain(), vec!["dev", "joined"]);
    assert_eq!(dev.sources().unwrap().name(), INJECT_STEP);
    assert!(Arc::ptr_eq(&dev.raw_jar().unwrap(), &f.base.raw_jar().unwrap()));
    assert!(Arc::ptr_eq(&dev.natives().unwrap(), &f.base.natives().unwrap()));
    assert!(Arc::ptr_eq(&dev.patch_base().unwrap(), &f.base.patch_base().unwrap()));
    assert_eq!(dev.version_metadata(), f.base.version_metadata());

    let session = BuildSession::new(dev, Arc::new(forge_core::DirectExecution), f.dir.path().join("work"));
    let injected = session.output_of_role(StepRole::Sources).unwrap();
    let entries = read_zip(&injected);
    let main = entries.iter().find(|(name, _)| name == "net/Main.java").unwrap();
    assert_eq!(main.1, b"class Main {}".to_vec());
    assert!(entries.iter().any(|(name, _)| name == "net/Extra.java"));

    let events = session.events();
    let warnings = events.iter()
                         .find_map(|e| match &e.kind {
                             BuildEventKind::StepFinished { step, warnings, .. } if step == "dev/inject" => {
                                 Some(warnings.clone())
                             }
                             _ => None,
                         })
                         .unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("net/Main.java"));
}

#[test]
fn recompile_is_restored_from_cache_in_a_new_session() {
    let f = fixture();
    let patches = injection(f.dir.path());
    let compiler = Arc::new(FakeCompiler::default());
    let runs = Arc::clone(&compiler.runs);
    let dev = dev_runtime(Arc::clone(&f.base),
                          DevRuntimeConfig { name: "dev".into(),
                                             injections: vec![patches],
                                             additional_sources: None,
                                             compiler,
                                             classpath: vec!["/libs/a.jar".into()],
                                             release: Some("21".into()) }).unwrap();
    let cache = Arc::new(CacheService::new(CacheConfig::new(f.dir.path().join("cache"))));

    let first = BuildSession::new(Arc::clone(&dev), cache.clone(), f.dir.path().join("work1"));
    let out1 = first.output_of(RECOMPILE_STEP).unwrap();
    assert!(out1.join("classes/net/Extra.class").is_file());

    let second = BuildSession::new(dev, cache, f.dir.path().join("work2"));
    let out2 = second.output_of(RECOMPILE_STEP).unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(out2.join("classes/net/Extra.class").is_file());
    assert!(second.events()
                  .iter()
                  .any(|e| matches!(&e.kind, BuildEventKind::StepCached { step, .. } if step == "dev/recompile")));
}

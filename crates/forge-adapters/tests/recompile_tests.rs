mod common;

use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{write_zip, FakeCompiler};
use forge_adapters::steps::compile::{prune_shadowed_classes, CLASSES_DIR, GENERATED_SOURCES_DIR, HEADERS_DIR};
use forge_adapters::RecompileStep;
use forge_core::{BuildSession, DirectExecution, InputSpec, RuntimeBuilder, StepSpec};

#[test]
fn classes_from_additional_sources_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let classes = dir.path().join("classes");
    let additional = dir.path().join("additional");
    fs::create_dir_all(classes.join("net")).unwrap();
    fs::create_dir_all(additional.join("net")).unwrap();
    for name in ["Main.class", "Main$1.class", "Patch.class", "Patch$Inner.class", "Patch$Inner$Deep.class"] {
        fs::write(classes.join("net").join(name), b"c").unwrap();
    }
    fs::write(additional.join("net/Patch.java"), "class Patch {}").unwrap();

    let removed = prune_shadowed_classes(&classes, &additional).unwrap();

    assert_eq!(removed, 3);
    assert!(classes.join("net/Main.class").exists());
    assert!(classes.join("net/Main$1.class").exists());
    assert!(!classes.join("net/Patch.class").exists());
    assert!(!classes.join("net/Patch$Inner$Deep.class").exists());
}

#[test]
fn recompile_step_extracts_jar_and_prunes_additional_classes() {
    let dir = tempfile::tempdir().unwrap();
    let sources = dir.path().join("sources.jar");
    write_zip(&sources,
              &[("net/", None), ("net/Main.java", Some(b"class Main {}")), ("pack.mcmeta", Some(b"{}"))]);
    let additional = dir.path().join("additional");
    fs::create_dir_all(additional.join("net")).unwrap();
    fs::write(additional.join("net/Patch.java"), "class Patch {}").unwrap();

    let compiler = Arc::new(FakeCompiler::default());
    let runs = Arc::clone(&compiler.runs);
    let definition =
        RuntimeBuilder::new("dev").add_step(StepSpec::new("recompile", RecompileStep::new(compiler))
                                                .input(RecompileStep::SOURCES, InputSpec::path(&sources))
                                                .input(RecompileStep::ADDITIONAL, InputSpec::path(&additional))
                                                .multi_arg(RecompileStep::CLASSPATH, ["/libs/a.jar"]))
                                  .build()
                                  .unwrap();
    let session = BuildSession::new(definition, Arc::new(DirectExecution), dir.path().join("work"));

    let out = session.output_of("recompile").unwrap();

    assert_eq!(out.file_name().unwrap(), "output");
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(out.join(CLASSES_DIR).join("net/Main.class").exists());
    assert!(out.join(CLASSES_DIR).join("net/Main$Inner.class").exists());
    assert!(!out.join(CLASSES_DIR).join("net/Patch.class").exists());
    assert!(!out.join(CLASSES_DIR).join("net/Patch$Inner.class").exists());
    assert!(out.join(GENERATED_SOURCES_DIR).is_dir());
    assert!(out.join(HEADERS_DIR).is_dir());
}

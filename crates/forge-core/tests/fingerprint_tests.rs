//! Determinismo y sensibilidad del fingerprint calculado por la sesión.
mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use common::ConcatStep;
use forge_core::{BuildEventKind, BuildSession, DirectExecution, InputSpec, RuntimeBuilder, StepSpec};

fn fingerprint_of(work: &Path, spec: StepSpec) -> String {
    let definition = RuntimeBuilder::new("base").add_step(spec).build().unwrap();
    let session = BuildSession::new(definition, Arc::new(DirectExecution), work);
    let name = session.definition().steps()[0].name().to_string();
    session.output_of(&name).unwrap();
    session.events()
           .into_iter()
           .find_map(|e| match e.kind {
               BuildEventKind::StepFinished { fingerprint, .. } => Some(fingerprint),
               _ => None,
           })
           .expect("finished event")
}

#[test]
fn same_step_same_inputs_same_fingerprint() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("in.txt");
    fs::write(&input, "x").unwrap();
    let make = || StepSpec::new("step", ConcatStep::default()).arg("text", "a").input("in", InputSpec::path(&input));
    assert_eq!(fingerprint_of(work.path(), make()), fingerprint_of(work.path(), make()));
}

#[test]
fn argument_change_changes_fingerprint() {
    let work = tempfile::tempdir().unwrap();
    let a = fingerprint_of(work.path(), StepSpec::new("step", ConcatStep::default()).arg("text", "a"));
    let b = fingerprint_of(work.path(), StepSpec::new("step", ConcatStep::default()).arg("text", "b"));
    assert_ne!(a, b);
}

#[test]
fn multi_argument_order_changes_fingerprint() {
    let work = tempfile::tempdir().unwrap();
    let a = fingerprint_of(work.path(), StepSpec::new("step", ConcatStep::default()).multi_arg("classpath", ["a", "b"]));
    let b = fingerprint_of(work.path(), StepSpec::new("step", ConcatStep::default()).multi_arg("classpath", ["b", "a"]));
    assert_ne!(a, b);
}

#[test]
fn input_content_change_changes_fingerprint() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("in.txt");
    fs::write(&input, "one").unwrap();
    let first = fingerprint_of(work.path(), StepSpec::new("step", ConcatStep::default()).input("in", InputSpec::path(&input)));
    fs::write(&input, "two").unwrap();
    let second = fingerprint_of(work.path(), StepSpec::new("step", ConcatStep::default()).input("in", InputSpec::path(&input)));
    assert_ne!(first, second);
}

#[test]
fn step_name_participates() {
    let work = tempfile::tempdir().unwrap();
    let a = fingerprint_of(work.path(), StepSpec::new("decompile", ConcatStep::default()));
    let b = fingerprint_of(work.path(), StepSpec::new("recompile", ConcatStep::default()));
    assert_ne!(a, b);
}

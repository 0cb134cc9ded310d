mod common;

use std::sync::{Arc, Mutex};

use common::ConcatStep;
use forge_core::{CoreError, Definition, DefinitionRegistry, RuntimeBuilder, StepRole, StepSpec};

fn register_base(registry: &mut DefinitionRegistry) {
    registry.register("base", None, |_| {
                RuntimeBuilder::new("base").add_step(StepSpec::new("assets", ConcatStep::default()))
                                           .role(StepRole::Assets, "assets")
                                           .build()
            });
}

fn register_delegating(registry: &mut DefinitionRegistry, name: &'static str, inner: &'static str) {
    registry.register(name, Some(inner), move |inner: Option<Arc<dyn Definition>>| {
                let inner = inner.ok_or_else(|| CoreError::Internal("inner missing".into()))?;
                RuntimeBuilder::delegating(name, inner).build()
            });
}

#[test]
fn assembles_inner_before_outer() {
    let mut registry = DefinitionRegistry::new();
    register_delegating(&mut registry, "dev", "base");
    register_base(&mut registry);

    let built = registry.assemble().expect("assembles");
    let names: Vec<&str> = built.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["base", "dev"]);

    let dev = registry.get("dev").unwrap();
    let base = registry.get("base").unwrap();
    assert!(Arc::ptr_eq(&dev.assets().unwrap(), &base.assets().unwrap()));
}

#[test]
fn cycle_is_detected_before_any_build() {
    let mut registry = DefinitionRegistry::new();
    register_delegating(&mut registry, "a", "b");
    register_delegating(&mut registry, "b", "c");
    register_delegating(&mut registry, "c", "a");

    let err = registry.assemble().unwrap_err();
    assert_eq!(err,
               CoreError::DelegationCycle { chain: vec!["a".into(), "b".into(), "c".into(), "a".into()] });
    assert!(registry.get("a").is_err());
}

#[test]
fn unknown_delegate_is_reported() {
    let mut registry = DefinitionRegistry::new();
    register_delegating(&mut registry, "dev", "neoform");
    let err = registry.assemble().unwrap_err();
    assert_eq!(err, CoreError::UnknownDefinition { name: "neoform".into() });
}

#[test]
fn late_observer_is_replayed() {
    let mut registry = DefinitionRegistry::new();
    register_base(&mut registry);
    registry.assemble().unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    registry.when_definition_added(move |d| sink.lock().unwrap().push(d.name().to_string()));

    register_delegating(&mut registry, "dev", "base");
    registry.assemble().unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["base", "dev"]);
}

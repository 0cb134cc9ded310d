mod common;

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use common::{ConcatStep, RequiresArgStep};
use forge_core::{BuildEventKind, BuildSession, CoreError, DirectExecution, InputSpec, RuntimeBuilder, StepRole, StepSpec,
                 StepStatus};

#[test]
fn upstream_is_realized_first_and_output_lands_in_work_dir() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("client.txt");
    fs::write(&input, "|client").unwrap();

    let definition =
        RuntimeBuilder::new("base").add_step(StepSpec::new("raw_jar", ConcatStep::default()).arg("text", "raw")
                                                                                           .input("client", InputSpec::path(&input)))
                                   .add_step(StepSpec::new("decompile", ConcatStep::default()).arg("text", "src:")
                                                                                             .arg("outputExtension", "zip")
                                                                                             .input("jar", InputSpec::step("raw_jar")))
                                   .role(StepRole::Sources, "decompile")
                                   .build()
                                   .unwrap();
    let session = BuildSession::new(definition, Arc::new(DirectExecution), work.path());

    let out = session.output_of_role(StepRole::Sources).unwrap();
    assert_eq!(out, work.path().join("steps/base/decompile/output.zip"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "src:raw|client");
    assert!(work.path().join("steps/base/raw_jar/output.jar").is_file());

    let started: Vec<String> = session.events()
                                      .into_iter()
                                      .filter_map(|e| match e.kind {
                                          BuildEventKind::StepFinished { step, .. } => Some(step),
                                          _ => None,
                                      })
                                      .collect();
    assert_eq!(started, vec!["base/raw_jar", "base/decompile"]);
}

#[test]
fn each_step_runs_once_per_session_even_when_shared_between_threads() {
    let work = tempfile::tempdir().unwrap();
    let runs = Arc::new(AtomicUsize::new(0));
    let definition = RuntimeBuilder::new("base").add_step(StepSpec::new("assets", ConcatStep::counted(&runs)).arg("text", "a"))
                                                .role(StepRole::Assets, "assets")
                                                .build()
                                                .unwrap();
    let session = Arc::new(BuildSession::new(definition, Arc::new(DirectExecution), work.path()));
    let barrier = Arc::new(Barrier::new(6));

    let handles: Vec<_> = (0..6).map(|_| {
                                    let session = Arc::clone(&session);
                                    let barrier = Arc::clone(&barrier);
                                    thread::spawn(move || {
                                        barrier.wait();
                                        session.output_of("assets").unwrap()
                                    })
                                })
                                .collect();
    let outputs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(outputs.iter().all(|o| *o == outputs[0]));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_argument_surfaces_with_step_name_and_no_output() {
    let work = tempfile::tempdir().unwrap();
    let definition = RuntimeBuilder::new("base").add_step(StepSpec::new("extract", RequiresArgStep))
                                                .build()
                                                .unwrap();
    let session = BuildSession::new(definition, Arc::new(DirectExecution), work.path());

    let err = session.output_of("extract").unwrap_err();
    assert_eq!(err,
               CoreError::MissingArgument { key: "required".into(),
                                            step: "extract".into() });
    assert!(!work.path().join("steps/base/extract/output").exists());

    let step = session.definition().step("extract").unwrap();
    assert_eq!(session.status(&step), StepStatus::Failed);
    // El fallo queda memorizado en la sesión.
    assert_eq!(session.output_of("extract").unwrap_err(), err);
}

#[test]
fn default_argument_satisfies_required_key() {
    let work = tempfile::tempdir().unwrap();
    let definition = RuntimeBuilder::new("base").add_step(StepSpec::new("extract", RequiresArgStep).default_arg("required", "yes"))
                                                .build()
                                                .unwrap();
    let session = BuildSession::new(definition, Arc::new(DirectExecution), work.path());
    let out = session.output_of("extract").unwrap();
    assert_eq!(fs::read_to_string(out.join("value.txt")).unwrap(), "yes");
}

#[test]
fn missing_path_input_is_reported() {
    let work = tempfile::tempdir().unwrap();
    let definition =
        RuntimeBuilder::new("base").add_step(StepSpec::new("raw_jar", ConcatStep::default()).input("client",
                                                                                                  InputSpec::path(work.path().join("absent.jar"))))
                                   .build()
                                   .unwrap();
    let session = BuildSession::new(definition, Arc::new(DirectExecution), work.path());
    let err = session.output_of("raw_jar").unwrap_err();
    assert!(matches!(err, CoreError::MissingInput { ref input, .. } if input == "client"));
}

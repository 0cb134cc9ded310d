//! forge-core: modelo de steps, fingerprints y definiciones de runtime.
pub mod argument;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod runtime;
pub mod step;

pub use argument::{Provider, ResolvedArguments, ResolvedMultiArguments, RuntimeArguments, RuntimeMultiArguments};
pub use engine::{BuildSession, CacheRequest, CachedOutput, DirectExecution, Job, StepCache};
pub use errors::CoreError;
pub use event::{BuildEvent, BuildEventKind, EventStore, InMemoryEventStore};
pub use model::{ExecutionContext, Fingerprint, InputHash, JobPaths, OutputShape, StepFingerprintInput};
pub use runtime::{Definition, DefinitionRegistry, DelegatingDefinition, ReplayRegistry, RuntimeBuilder, RuntimeDefinition,
                  StepRole};
pub use step::{InputArtifact, InputSpec, Step, StepDefinition, StepKind, StepRunResult, StepSpec, StepStatus};

//! Steps.
//!
//! Un step es una unidad determinista con inputs declarados, un único
//! output y un cuerpo de ejecución. Este módulo define:
//! - `StepDefinition`: el cuerpo de ejecución (trait usado por la sesión).
//! - `StepSpec`: declaración sin resolver (inputs por nombre).
//! - `Step`: step inmutable, con inputs ya resueltos a `Arc<Step>`.
//! - `StepRunResult` y `StepStatus`.

pub mod definition;
mod run_result;
pub mod spec;
mod status;

pub use definition::{StepDefinition, StepKind};
pub use run_result::StepRunResult;
pub use spec::{InputArtifact, InputSpec, Step, StepSpec};
pub use status::StepStatus;

//! Modelos neutrales (forma de output, fingerprint, contexto de ejecución).

pub mod artifact;
pub mod context;
pub mod fingerprint;

pub use artifact::OutputShape;
pub use context::{ExecutionContext, JobPaths};
pub use fingerprint::{Fingerprint, InputHash, StepFingerprintInput};

//! Errores de la caché.
//! En la frontera con `StepCache` se convierten en `CoreError::StepExecutionFailed`:
//! un fallo al publicar equivale a un fallo del step.

use std::path::Path;

use forge_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("io error at {path}: {message}")]
    Io { path: String, message: String },
    #[error("cannot lock {path}: {message}")]
    Lock { path: String, message: String },
    #[error("corrupt cache entry {fingerprint}: {reason}")]
    Corrupt { fingerprint: String, reason: String },
    #[error("cannot publish {fingerprint}: {message}")]
    Publish { fingerprint: String, message: String },
    #[error("invalid manifest {path}: {message}")]
    Manifest { path: String, message: String },
}

impl CacheError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        CacheError::Io { path: path.display().to_string(),
                         message: err.to_string() }
    }

    pub fn lock(path: &Path, err: std::io::Error) -> Self {
        CacheError::Lock { path: path.display().to_string(),
                           message: err.to_string() }
    }

    /// Convierte el error al tipo que ve el scheduler.
    pub fn into_core(self, step: &str, fingerprint: &str) -> CoreError {
        CoreError::StepExecutionFailed { step: step.to_string(),
                                         fingerprint: Some(fingerprint.to_string()),
                                         cause: self.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_failure_becomes_step_failure() {
        let err = CacheError::Publish { fingerprint: "ab12".into(),
                                        message: "No space left on device".into() };
        match err.into_core("dev/recompile", "ab12") {
            CoreError::StepExecutionFailed { step, fingerprint, cause } => {
                assert_eq!(step, "dev/recompile");
                assert_eq!(fingerprint.as_deref(), Some("ab12"));
                assert!(cause.contains("No space left"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

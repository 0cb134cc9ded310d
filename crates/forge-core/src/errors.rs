//! Errores tipados del core.
//!
//! `CoreError` es la señal de fallo que recibe el scheduler externo. Es
//! `Clone` para que un mismo fallo pueda re-entregarse a todos los que
//! esperaban la misma clave de caché.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("missing argument '{key}' for step '{step}'")]
    MissingArgument { key: String, step: String },
    #[error("step '{step}' failed{}: {cause}", fingerprint_suffix(.fingerprint))]
    StepExecutionFailed {
        step: String,
        fingerprint: Option<String>,
        cause: String,
    },
    #[error("input '{input}' of step '{step}' does not exist: {path}")]
    MissingInput { step: String, input: String, path: String },
    #[error("malformed archive {path}: {message}")]
    ArchiveFormat { path: String, message: String },
    #[error("delegation cycle: {}", render_chain(.chain))]
    DelegationCycle { chain: Vec<String> },
    #[error("duplicate step '{step}' in definition '{definition}'")]
    DuplicateStep { definition: String, step: String },
    #[error("unknown step '{step}' in definition '{definition}'")]
    UnknownStep { definition: String, step: String },
    #[error("unknown definition '{name}'")]
    UnknownDefinition { name: String },
    #[error("io error at {path}: {message}")]
    Io { path: String, message: String },
    #[error("internal: {0}")]
    Internal(String),
}

fn fingerprint_suffix(fingerprint: &Option<String>) -> String {
    match fingerprint {
        Some(fp) => format!(" (fingerprint {fp})"),
        None => String::new(),
    }
}

fn render_chain(chain: &[String]) -> String {
    chain.join(" -> ")
}

impl CoreError {
    /// Construye un `Io` a partir de un `std::io::Error` y la ruta implicada.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        CoreError::Io { path: path.display().to_string(),
                        message: err.to_string() }
    }

    /// Envuelve un fallo del cuerpo de un step. `MissingArgument` y los
    /// fallos ya envueltos se propagan tal cual.
    pub fn into_step_failure(self, step: &str, fingerprint: Option<&str>) -> Self {
        match self {
            e @ CoreError::MissingArgument { .. } => e,
            CoreError::StepExecutionFailed { step, fingerprint: None, cause } => {
                CoreError::StepExecutionFailed { step,
                                                 fingerprint: fingerprint.map(str::to_string),
                                                 cause }
            }
            e @ CoreError::StepExecutionFailed { .. } => e,
            other => CoreError::StepExecutionFailed { step: step.to_string(),
                                                      fingerprint: fingerprint.map(str::to_string),
                                                      cause: other.to_string() },
        }
    }

    /// Nombre del step afectado cuando el error lo identifica.
    pub fn step(&self) -> Option<&str> {
        match self {
            CoreError::MissingArgument { step, .. }
            | CoreError::StepExecutionFailed { step, .. }
            | CoreError::MissingInput { step, .. }
            | CoreError::UnknownStep { step, .. } => Some(step),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_argument_names_key_and_step() {
        let err = CoreError::MissingArgument { key: "side".into(),
                                               step: "decompile".into() };
        assert_eq!(err.to_string(), "missing argument 'side' for step 'decompile'");
        assert_eq!(err.step(), Some("decompile"));
    }

    #[test]
    fn step_failure_wraps_cause_once() {
        let wrapped = CoreError::Internal("boom".into()).into_step_failure("inject", Some("abc"));
        assert_eq!(wrapped.to_string(), "step 'inject' failed (fingerprint abc): internal: boom");

        let again = wrapped.clone().into_step_failure("outer", None);
        assert_eq!(again, wrapped);
    }

    #[test]
    fn missing_argument_is_not_wrapped() {
        let err = CoreError::MissingArgument { key: "k".into(),
                                               step: "s".into() };
        assert_eq!(err.clone().into_step_failure("s", Some("fp")), err);
    }

    #[test]
    fn delegation_cycle_renders_chain() {
        let err = CoreError::DelegationCycle { chain: vec!["dev".into(), "base".into(), "dev".into()] };
        assert_eq!(err.to_string(), "delegation cycle: dev -> base -> dev");
    }
}

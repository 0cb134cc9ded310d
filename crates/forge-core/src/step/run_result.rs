use crate::errors::CoreError;

/// Resultado abstracto de ejecutar un step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRunResult {
    /// El output quedó escrito; `warnings` recoge incidencias no fatales
    /// (p. ej. entradas duplicadas en una combinación de zips).
    Success { warnings: Vec<String> },
    Failure { error: CoreError },
}

impl StepRunResult {
    pub fn ok() -> Self {
        StepRunResult::Success { warnings: Vec::new() }
    }

    pub fn with_warnings(warnings: Vec<String>) -> Self {
        StepRunResult::Success { warnings }
    }

    pub fn failed(error: CoreError) -> Self {
        StepRunResult::Failure { error }
    }

    pub fn into_result(self) -> Result<Vec<String>, CoreError> {
        match self {
            StepRunResult::Success { warnings } => Ok(warnings),
            StepRunResult::Failure { error } => Err(error),
        }
    }
}

impl From<Result<(), CoreError>> for StepRunResult {
    fn from(result: Result<(), CoreError>) -> Self {
        match result {
            Ok(()) => StepRunResult::ok(),
            Err(error) => StepRunResult::failed(error),
        }
    }
}

impl From<Result<Vec<String>, CoreError>> for StepRunResult {
    fn from(result: Result<Vec<String>, CoreError>) -> Self {
        match result {
            Ok(warnings) => StepRunResult::with_warnings(warnings),
            Err(error) => StepRunResult::failed(error),
        }
    }
}

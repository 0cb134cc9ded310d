use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::argument::{ResolvedArguments, ResolvedMultiArguments};
use crate::errors::CoreError;

/// Rutas que la caché entrega a un job: dónde escribir el output (temporal,
/// publicado solo si el job termina bien) y un directorio scratch que se
/// descarta tras el intento.
#[derive(Debug, Clone)]
pub struct JobPaths {
    pub output: PathBuf,
    pub scratch: PathBuf,
}

/// Contexto de ejecución entregado a `StepDefinition::run`.
///
/// Es una instantánea: el cuerpo del step solo lee de aquí, nunca de estado
/// ambiental mutable.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub step: String,
    pub arguments: ResolvedArguments,
    pub multi_arguments: ResolvedMultiArguments,
    pub inputs: IndexMap<String, PathBuf>,
    pub output: PathBuf,
    pub scratch: PathBuf,
}

impl ExecutionContext {
    /// Ruta resuelta del input `name`.
    pub fn input(&self, name: &str) -> Result<&Path, CoreError> {
        self.inputs
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| CoreError::MissingInput { step: self.step.clone(),
                                                     input: name.to_string(),
                                                     path: String::new() })
    }

    /// Inputs en orden de declaración.
    pub fn inputs_in_order(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.inputs.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

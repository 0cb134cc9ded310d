use std::fmt::Debug;

use crate::model::{ExecutionContext, OutputShape};

use super::run_result::StepRunResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Trae un archivo externo al pipeline.
    Provide,
    /// Descomprime un archivo en un directorio.
    Extract,
    /// Combina archivos zip.
    Inject,
    /// Compila fuentes.
    Compile,
    /// Cualquier otra transformación de archivos.
    Transform,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Provide => "provide",
            StepKind::Extract => "extract",
            StepKind::Inject => "inject",
            StepKind::Compile => "compile",
            StepKind::Transform => "transform",
        }
    }
}

/// Cuerpo de ejecución de un step. Implementaciones deben ser puras respecto
/// a inputs + argumentos: todo lo que leen llega por `ExecutionContext`.
pub trait StepDefinition: Debug + Send + Sync {
    /// Identificador estable de la implementación. Entra al fingerprint:
    /// cambiarlo invalida los outputs cacheados de este tipo de step.
    fn implementation_id(&self) -> &str;

    fn kind(&self) -> StepKind;

    fn output_shape(&self) -> OutputShape {
        OutputShape::File
    }

    /// Ejecución pura. Escribe únicamente en `ctx.output` y `ctx.scratch`.
    fn run(&self, ctx: &ExecutionContext) -> StepRunResult;
}

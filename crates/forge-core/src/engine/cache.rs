//! Costura entre la sesión de build y la caché de outputs.
//!
//! La sesión describe qué quiere realizar (`CacheRequest`) y entrega el
//! cuerpo del step como job. Una implementación de `StepCache` decide si
//! ejecuta el job o restaura un output previo, y publica el resultado de
//! forma atómica en `target`.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::model::{Fingerprint, JobPaths, OutputShape, StepFingerprintInput};

/// Cuerpo de un step visto por la caché.
pub type Job<'a> = dyn Fn(&JobPaths) -> Result<(), CoreError> + 'a;

pub struct CacheRequest<'a> {
    /// Nombre cualificado del step (para logs y manifiestos).
    pub step: &'a str,
    pub fingerprint_input: &'a StepFingerprintInput<'a>,
    pub shape: OutputShape,
    /// Ruta final del output en el directorio de trabajo de la sesión.
    pub target: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedOutput {
    pub fingerprint: Fingerprint,
    pub path: PathBuf,
    /// `true` si el output se restauró sin ejecutar el job.
    pub hit: bool,
}

pub trait StepCache: Send + Sync {
    fn cached(&self, request: &CacheRequest<'_>, job: &Job<'_>) -> Result<CachedOutput, CoreError>;
}

/// Ejecución sin caché: siempre corre el job, pero publica igual de forma
/// atómica (output temporal hermano de `target`, luego rename).
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectExecution;

impl StepCache for DirectExecution {
    fn cached(&self, request: &CacheRequest<'_>, job: &Job<'_>) -> Result<CachedOutput, CoreError> {
        let fingerprint = Fingerprint::compute(request.fingerprint_input);
        let parent = request.target.parent().unwrap_or_else(|| Path::new("."));
        let attempt = parent.join(format!(".attempt-{}", Uuid::new_v4()));
        fs::create_dir_all(&attempt).map_err(|e| CoreError::io(&attempt, e))?;

        let file_name = request.target.file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("output"));
        let paths = JobPaths { output: attempt.join(file_name),
                               scratch: attempt.join("scratch") };
        let result = fs::create_dir_all(&paths.scratch).map_err(|e| CoreError::io(&paths.scratch, e))
                                                       .and_then(|_| job(&paths))
                                                       .and_then(|_| publish(&paths.output, request.target));
        let _ = fs::remove_dir_all(&attempt);
        result?;
        debug!("{}: executed without cache ({})", request.step, fingerprint.short());
        Ok(CachedOutput { fingerprint,
                          path: request.target.to_path_buf(),
                          hit: false })
    }
}

/// Reemplaza `target` por `staged` con un rename.
pub fn publish(staged: &Path, target: &Path) -> Result<(), CoreError> {
    if !staged.exists() {
        return Err(CoreError::Internal(format!("step produced no output at {}", staged.display())));
    }
    remove_existing(target)?;
    fs::rename(staged, target).map_err(|e| CoreError::io(target, e))
}

/// Borra un archivo o directorio si existe.
pub fn remove_existing(path: &Path) -> Result<(), CoreError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map_err(|e| CoreError::io(path, e)),
        Ok(_) => fs::remove_file(path).map_err(|e| CoreError::io(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoreError::io(path, e)),
    }
}

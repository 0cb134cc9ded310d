//! Combinación de fuentes en un único zip.

use std::fs;
use std::path::Path;

use forge_core::engine::cache::remove_existing;
use forge_core::CoreError;
use log::{debug, info};

use super::sink::{ArchiveSink, InjectReport};
use super::source::InjectSource;

/// Fuentes en orden de prioridad: ante una colisión de archivo gana la
/// primera que lo aporta.
#[derive(Debug, Default)]
pub struct ArchiveInjector {
    sources: Vec<Box<dyn InjectSource>>,
}

impl ArchiveInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl InjectSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn push(&mut self, source: Box<dyn InjectSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Escribe `dest` con el contenido de todas las fuentes. Si algo falla
    /// no queda un archivo parcial.
    pub fn inject(&self, dest: &Path) -> Result<InjectReport, CoreError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
        let result = self.write_all(dest);
        match &result {
            Ok(report) => info!("injected {} entries into {} ({} duplicates skipped)",
                                report.entries.len(),
                                dest.display(),
                                report.conflicts.len()),
            Err(_) => {
                let _ = remove_existing(dest);
            }
        }
        result
    }

    fn write_all(&self, dest: &Path) -> Result<InjectReport, CoreError> {
        let mut sink = ArchiveSink::create(dest)?;
        for source in &self.sources {
            debug!("injecting {}", source.describe());
            source.copy_to(&mut sink)?;
        }
        sink.finish()
    }

    /// Bytes de `path` en la primera fuente que lo contiene.
    pub fn read(&self, path: &str) -> Result<Option<Vec<u8>>, CoreError> {
        for source in &self.sources {
            if let Some(bytes) = source.try_read(path)? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}

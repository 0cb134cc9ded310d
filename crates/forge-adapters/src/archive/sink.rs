//! Archivo de salida de una inyección.
//!
//! Escribe entradas en el orden en que llegan, con timestamps normalizados
//! (1980-01-01) y compresión deflate, de modo que las mismas entradas
//! producen siempre los mismos bytes. Las colisiones se resuelven aquí:
//! un directorio repetido se ignora en silencio y un archivo repetido se
//! omite con un warning (gana el primero). Los nombres que escapan de la
//! raíz del archivo (`..`, rutas absolutas) no se escriben.

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use forge_core::CoreError;
use log::warn;
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Archivo duplicado que no se escribió.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeConflict {
    pub path: String,
    /// Fuente cuya entrada se descartó.
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InjectReport {
    /// Entradas escritas, en orden.
    pub entries: Vec<String>,
    pub conflicts: Vec<MergeConflict>,
}

impl InjectReport {
    /// Mensajes de warning, uno por conflicto.
    pub fn warnings(&self) -> Vec<String> {
        self.conflicts
            .iter()
            .map(|c| format!("Cannot inject duplicate file {} (from {})", c.path, c.source))
            .collect()
    }
}

/// Forma canónica de un nombre de entrada: separadores `/`, sin `.` ni
/// componentes vacíos. `None` si el nombre es absoluto, contiene `..`,
/// barras invertidas o un prefijo de unidad.
pub(crate) fn normalize_entry_name(name: &str) -> Option<String> {
    if name.starts_with('/') || name.contains('\\') {
        return None;
    }
    let mut parts = Vec::new();
    for part in name.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            _ if parts.is_empty() && part.contains(':') => return None,
            _ => parts.push(part),
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

pub struct ArchiveSink {
    path: PathBuf,
    writer: ZipWriter<File>,
    written: HashSet<String>,
    report: InjectReport,
}

impl ArchiveSink {
    pub fn create(path: &Path) -> Result<Self, CoreError> {
        let file = File::create(path).map_err(|e| CoreError::io(path, e))?;
        Ok(Self { path: path.to_path_buf(),
                  writer: ZipWriter::new(file),
                  written: HashSet::new(),
                  report: InjectReport::default() })
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
                                    .last_modified_time(DateTime::default())
                                    .unix_permissions(0o644)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.written.contains(name)
    }

    pub fn add_directory(&mut self, name: &str) -> Result<(), CoreError> {
        let Some(normalized) = normalize_entry_name(name) else {
            warn!("skipping unsafe entry {name}");
            return Ok(());
        };
        let name = format!("{normalized}/");
        if self.written.contains(&name) {
            return Ok(());
        }
        self.writer
            .add_directory(name.as_str(), Self::options().unix_permissions(0o755))
            .map_err(|e| self.format_error(e))?;
        self.report.entries.push(name.clone());
        self.written.insert(name);
        Ok(())
    }

    pub fn add_file(&mut self, name: &str, bytes: &[u8], source: &str) -> Result<(), CoreError> {
        let Some(normalized) = normalize_entry_name(name) else {
            warn!("skipping unsafe entry {name} from {source}");
            return Ok(());
        };
        let name = normalized.as_str();
        if self.written.contains(name) {
            warn!("Cannot inject duplicate file {name}");
            self.report.conflicts.push(MergeConflict { path: name.to_string(),
                                                       source: source.to_string() });
            return Ok(());
        }
        self.writer.start_file(name, Self::options()).map_err(|e| self.format_error(e))?;
        self.writer.write_all(bytes).map_err(|e| CoreError::io(&self.path, e))?;
        self.report.entries.push(name.to_string());
        self.written.insert(name.to_string());
        Ok(())
    }

    pub fn finish(self) -> Result<InjectReport, CoreError> {
        self.writer.finish().map_err(|e| CoreError::ArchiveFormat { path: self.path.display().to_string(),
                                                                    message: e.to_string() })?;
        Ok(self.report)
    }

    fn format_error(&self, err: zip::result::ZipError) -> CoreError {
        CoreError::ArchiveFormat { path: self.path.display().to_string(),
                                   message: err.to_string() }
    }
}

//! Fuentes de inyección: un zip o un árbol de directorios.

use std::fmt::Debug;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use forge_core::hashing::content::relative_unix_path;
use forge_core::CoreError;
use log::debug;
use walkdir::WalkDir;
use zip::read::{read_zipfile_from_stream, ZipFile};
use zip::result::ZipError;
use zip::ZipArchive;

use super::filter::{EntryFilter, IncludeAll};
use super::sink::{normalize_entry_name, ArchiveSink};

pub trait InjectSource: Debug + Send + Sync {
    /// Nombre de la fuente para logs y conflictos.
    fn describe(&self) -> String;

    /// Bytes de `path`, o `None` si la fuente no lo contiene.
    fn try_read(&self, path: &str) -> Result<Option<Vec<u8>>, CoreError>;

    /// Copia las entradas admitidas por el filtro, en su orden almacenado.
    fn copy_to(&self, sink: &mut ArchiveSink) -> Result<(), CoreError>;
}

fn format_error(path: &Path, err: ZipError) -> CoreError {
    CoreError::ArchiveFormat { path: path.display().to_string(),
                               message: err.to_string() }
}

pub(crate) fn open_archive(path: &Path) -> Result<ZipArchive<File>, CoreError> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    ZipArchive::new(file).map_err(|e| format_error(path, e))
}

/// Entrada leída de un zip: nombre, si es directorio y contenido.
type StoredEntry = (String, bool, Vec<u8>);

// El tamaño declarado en la cabecera no se usa para reservar memoria.
fn read_entry(entry: &mut ZipFile<'_>) -> Result<StoredEntry, ZipError> {
    let name = entry.name().to_string();
    let is_dir = entry.is_dir();
    let mut bytes = Vec::new();
    if !is_dir {
        entry.read_to_end(&mut bytes)?;
    }
    Ok((name, is_dir, bytes))
}

/// Todas las entradas locales en orden almacenado, duplicados incluidos.
fn stream_entries(path: &Path) -> Result<Vec<StoredEntry>, ZipError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut entries = Vec::new();
    while let Some(mut entry) = read_zipfile_from_stream(&mut reader)? {
        entries.push(read_entry(&mut entry)?);
    }
    Ok(entries)
}

/// Entradas según el directorio central; los nombres repetidos quedan
/// colapsados en uno.
fn indexed_entries(path: &Path) -> Result<Vec<StoredEntry>, CoreError> {
    let mut archive = open_archive(path)?;
    (0..archive.len()).map(|index| {
                          let mut entry = archive.by_index(index).map_err(|e| format_error(path, e))?;
                          read_entry(&mut entry).map_err(|e| format_error(path, e))
                      })
                      .collect()
}

/// Contenido de otro archivo zip.
#[derive(Clone)]
pub struct ZipSource {
    path: PathBuf,
    filter: Arc<dyn EntryFilter>,
}

impl ZipSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(),
               filter: Arc::new(IncludeAll) }
    }

    pub fn with_filter(mut self, filter: impl EntryFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_shared_filter(mut self, filter: Arc<dyn EntryFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Debug for ZipSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipSource").field("path", &self.path).finish()
    }
}

impl InjectSource for ZipSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    // Acceso aleatorio; el handle vive solo durante la consulta.
    fn try_read(&self, path: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let mut archive = open_archive(&self.path)?;
        let mut entry = match archive.by_name(path) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(format_error(&self.path, e)),
        };
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(|e| format_error(&self.path, ZipError::Io(e)))?;
        Ok(Some(bytes))
    }

    // Se recorren las cabeceras locales para ver también los nombres
    // repetidos. Si el zip no admite lectura secuencial (data descriptors,
    // prefijos, zip vacío) se usa el directorio central.
    fn copy_to(&self, sink: &mut ArchiveSink) -> Result<(), CoreError> {
        let entries = match stream_entries(&self.path) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("sequential read of {} failed ({err}), using central directory", self.path.display());
                indexed_entries(&self.path)?
            }
        };
        let source = self.describe();
        for (name, is_dir, bytes) in entries {
            if !self.filter.includes(name.trim_end_matches('/'), is_dir) {
                continue;
            }
            if is_dir {
                sink.add_directory(&name)?;
            } else {
                sink.add_file(&name, &bytes, &source)?;
            }
        }
        Ok(())
    }
}

/// Árbol de directorios inyectado como entradas (recorrido en orden de nombre).
#[derive(Clone)]
pub struct DirectorySource {
    root: PathBuf,
    filter: Arc<dyn EntryFilter>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(),
               filter: Arc::new(IncludeAll) }
    }

    pub fn with_filter(mut self, filter: impl EntryFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_shared_filter(mut self, filter: Arc<dyn EntryFilter>) -> Self {
        self.filter = filter;
        self
    }
}

impl Debug for DirectorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySource").field("root", &self.root).finish()
    }
}

impl InjectSource for DirectorySource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn try_read(&self, path: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let Some(relative) = normalize_entry_name(path) else {
            return Ok(None);
        };
        let candidate = self.root.join(relative);
        if !candidate.is_file() {
            return Ok(None);
        }
        fs::read(&candidate).map(Some).map_err(|e| CoreError::io(&candidate, e))
    }

    fn copy_to(&self, sink: &mut ArchiveSink) -> Result<(), CoreError> {
        let source = self.describe();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| CoreError::Io { path: self.root.display().to_string(),
                                                          message: e.to_string() })?;
            let name = relative_unix_path(&self.root, entry.path());
            let is_dir = entry.file_type().is_dir();
            if !self.filter.includes(&name, is_dir) {
                continue;
            }
            if is_dir {
                sink.add_directory(&name)?;
            } else {
                let bytes = fs::read(entry.path()).map_err(|e| CoreError::io(entry.path(), e))?;
                sink.add_file(&name, &bytes, &source)?;
            }
        }
        Ok(())
    }
}

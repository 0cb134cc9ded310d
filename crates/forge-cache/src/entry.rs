//! Manifiesto de una entrada de caché.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use forge_core::OutputShape;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryManifest {
    pub fingerprint: String,
    /// Step que produjo la entrada (informativo; no forma parte de la clave).
    pub step: String,
    pub shape: OutputShape,
    /// Nombre del snapshot dentro del directorio de la entrada.
    pub output_name: String,
    /// sha256 del snapshot, usado por `verify`.
    pub checksum: String,
    pub size: u64,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
}

impl EntryManifest {
    pub fn read(path: &Path) -> Result<Self, CacheError> {
        let raw = fs::read_to_string(path).map_err(|e| CacheError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| CacheError::Manifest { path: path.display().to_string(),
                                                                      message: e.to_string() })
    }

    pub fn write(&self, path: &Path) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Manifest { path: path.display().to_string(),
                                                                                         message: e.to_string() })?;
        fs::write(path, json).map_err(|e| CacheError::io(path, e))
    }
}

/// Entrada publicada, tal como la ven `list`, `verify` y `prune`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub manifest: EntryManifest,
    pub dir: PathBuf,
    pub last_used: DateTime<Utc>,
}

impl CacheEntry {
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(&self.manifest.output_name)
    }
}

/// mtime de `marker` o, si falta, `fallback`.
pub(crate) fn marker_time(marker: &Path, fallback: DateTime<Utc>) -> DateTime<Utc> {
    fs::metadata(marker).and_then(|m| m.modified())
                        .map(|t: SystemTime| DateTime::<Utc>::from(t))
                        .unwrap_or(fallback)
}

//! Disposición en disco de la caché.
//!
//! ```text
//! <root>/entries/<fp[0..2]>/<fp>/output[.ext]   snapshot publicado
//! <root>/entries/<fp[0..2]>/<fp>/entry.json     manifiesto
//! <root>/entries/<fp[0..2]>/<fp>/last-used      marcador (mtime = último uso)
//! <root>/locks/<fp>.lock                        lock advisory entre procesos
//! <root>/tmp/<fp>-<uuid>.partial/               intento en curso
//! ```
//!
//! Una entrada existe si y solo si su `entry.json` existe: el manifiesto se
//! escribe dentro del directorio temporal y el directorio completo se publica
//! con un único rename.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::CacheError;

pub const ENTRIES_DIR: &str = "entries";
pub const LOCKS_DIR: &str = "locks";
pub const TMP_DIR: &str = "tmp";
pub const MANIFEST_FILE: &str = "entry.json";
pub const LAST_USED_FILE: &str = "last-used";
pub const PARTIAL_SUFFIX: &str = ".partial";

#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure(&self) -> Result<(), CacheError> {
        for dir in [ENTRIES_DIR, LOCKS_DIR, TMP_DIR] {
            let path = self.root.join(dir);
            fs::create_dir_all(&path).map_err(|e| CacheError::io(&path, e))?;
        }
        Ok(())
    }

    pub fn entries_dir(&self) -> PathBuf {
        self.root.join(ENTRIES_DIR)
    }

    pub fn entry_dir(&self, fingerprint: &str) -> PathBuf {
        let shard = fingerprint.get(0..2).unwrap_or("xx");
        self.root.join(ENTRIES_DIR).join(shard).join(fingerprint)
    }

    pub fn manifest_path(&self, fingerprint: &str) -> PathBuf {
        self.entry_dir(fingerprint).join(MANIFEST_FILE)
    }

    pub fn last_used_path(&self, fingerprint: &str) -> PathBuf {
        self.entry_dir(fingerprint).join(LAST_USED_FILE)
    }

    pub fn lock_path(&self, fingerprint: &str) -> PathBuf {
        self.root.join(LOCKS_DIR).join(format!("{fingerprint}.lock"))
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join(TMP_DIR)
    }

    /// Directorio de un intento nuevo; único aunque dos procesos compitan.
    pub fn attempt_dir(&self, fingerprint: &str) -> PathBuf {
        self.tmp_dir().join(format!("{fingerprint}-{}{PARTIAL_SUFFIX}", Uuid::new_v4()))
    }

    /// Fingerprint al que pertenece un directorio de intento.
    pub fn attempt_fingerprint(name: &str) -> Option<&str> {
        let stem = name.strip_suffix(PARTIAL_SUFFIX)?;
        stem.split('-').next().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_sharded_by_prefix() {
        let layout = CacheLayout::new("/cache");
        assert_eq!(layout.entry_dir("abcdef"), PathBuf::from("/cache/entries/ab/abcdef"));
        assert_eq!(layout.lock_path("abcdef"), PathBuf::from("/cache/locks/abcdef.lock"));
    }

    #[test]
    fn attempt_names_map_back_to_fingerprint() {
        let layout = CacheLayout::new("/cache");
        let attempt = layout.attempt_dir("abcdef");
        let name = attempt.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(CacheLayout::attempt_fingerprint(&name), Some("abcdef"));
        assert_eq!(CacheLayout::attempt_fingerprint("stray"), None);
    }
}

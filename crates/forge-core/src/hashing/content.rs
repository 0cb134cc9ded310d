//! Hash de contenido de artifacts en disco (archivo o árbol de directorios).
//!
//! Para un directorio se recorre el árbol en orden de nombre, se hashea cada
//! archivo en paralelo (`rayon`) y se combinan los digests en orden, junto con
//! la ruta relativa (separada por `/`) y el tipo de entrada. El resultado no
//! depende del orden de recorrido del sistema de archivos ni de timestamps.

use std::fs;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::errors::CoreError;

/// Digest hex del contenido en `path`.
pub fn hash_path(path: &Path) -> Result<String, CoreError> {
    let meta = fs::metadata(path).map_err(|e| CoreError::io(path, e))?;
    if meta.is_file() {
        let digest = hash_file(path)?;
        let mut h = Hasher::new();
        h.update(b"file\0");
        h.update(digest.as_bytes());
        return Ok(h.finalize().to_hex().to_string());
    }

    let mut entries: Vec<(String, Option<PathBuf>)> = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| CoreError::Io { path: path.display().to_string(),
                                                      message: e.to_string() })?;
        let rel = relative_unix_path(path, entry.path());
        if entry.file_type().is_dir() {
            entries.push((rel, None));
        } else {
            entries.push((rel, Some(entry.into_path())));
        }
    }

    let digests: Vec<Option<String>> = entries.par_iter()
                                              .map(|(_, file)| file.as_deref().map(hash_file).transpose())
                                              .collect::<Result<_, _>>()?;

    let mut h = Hasher::new();
    h.update(b"dir\0");
    for ((rel, _), digest) in entries.iter().zip(digests) {
        h.update(rel.as_bytes());
        h.update(b"\0");
        match digest {
            Some(d) => {
                h.update(b"f");
                h.update(d.as_bytes());
            }
            None => {
                h.update(b"d");
            }
        }
        h.update(b"\n");
    }
    Ok(h.finalize().to_hex().to_string())
}

fn hash_file(path: &Path) -> Result<String, CoreError> {
    let mut file = fs::File::open(path).map_err(|e| CoreError::io(path, e))?;
    let mut h = Hasher::new();
    std::io::copy(&mut file, &mut h).map_err(|e| CoreError::io(path, e))?;
    Ok(h.finalize().to_hex().to_string())
}

/// Ruta relativa a `root` con separadores `/`, como en las entradas de un zip.
pub fn relative_unix_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
       .map(|c| c.as_os_str().to_string_lossy().into_owned())
       .collect::<Vec<_>>()
       .join("/")
}

//! Snapshots de outputs: checksum, copia y restauración atómica.

use std::fs;
use std::io;
use std::path::Path;

use forge_core::engine::cache::publish;
use forge_core::hashing::content::relative_unix_path;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::CacheError;

/// sha256 (hex) y tamaño total de un archivo o árbol de directorios.
pub fn checksum(path: &Path) -> Result<(String, u64), CacheError> {
    let meta = fs::metadata(path).map_err(|e| CacheError::io(path, e))?;
    let mut hasher = Sha256::new();
    if meta.is_file() {
        let size = hash_file_into(&mut hasher, path)?;
        return Ok((hex::encode(hasher.finalize()), size));
    }
    let mut size = 0u64;
    for entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| CacheError::Io { path: path.display().to_string(),
                                                       message: e.to_string() })?;
        let rel = relative_unix_path(path, entry.path());
        hasher.update(rel.as_bytes());
        if entry.file_type().is_dir() {
            hasher.update(b"\0d\n");
        } else {
            hasher.update(b"\0f");
            size += hash_file_into(&mut hasher, entry.path())?;
            hasher.update(b"\n");
        }
    }
    Ok((hex::encode(hasher.finalize()), size))
}

fn hash_file_into(hasher: &mut Sha256, path: &Path) -> Result<u64, CacheError> {
    let mut file = fs::File::open(path).map_err(|e| CacheError::io(path, e))?;
    io::copy(&mut file, hasher).map_err(|e| CacheError::io(path, e))
}

/// Copia un archivo o un árbol completo a `dst` (que no debe existir).
pub fn copy_tree(src: &Path, dst: &Path) -> Result<(), CacheError> {
    let meta = fs::metadata(src).map_err(|e| CacheError::io(src, e))?;
    if meta.is_file() {
        fs::copy(src, dst).map_err(|e| CacheError::io(dst, e))?;
        return Ok(());
    }
    fs::create_dir_all(dst).map_err(|e| CacheError::io(dst, e))?;
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| CacheError::Io { path: src.display().to_string(),
                                                       message: e.to_string() })?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let out = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&out).map_err(|e| CacheError::io(&out, e))?;
        } else {
            fs::copy(entry.path(), &out).map_err(|e| CacheError::io(&out, e))?;
        }
    }
    Ok(())
}

/// Materializa el snapshot `stored` en `target` como una unidad: se copia a
/// un hermano temporal y se publica con rename, así que nadie ve un
/// directorio a medio poblar.
pub fn restore(stored: &Path, target: &Path) -> Result<(), CacheError> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
    let staging = parent.join(format!(".restore-{}", Uuid::new_v4()));
    let result = copy_tree(stored, &staging).and_then(|_| {
                                                publish(&staging, target).map_err(|e| CacheError::Io { path: target.display()
                                                                                                                   .to_string(),
                                                                                                       message: e.to_string() })
                                            });
    if result.is_err() {
        let _ = fs::remove_dir_all(&staging);
        let _ = fs::remove_file(&staging);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_for_equal_trees() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        for root in [a.path(), b.path()] {
            fs::create_dir_all(root.join("net/minecraft")).unwrap();
            fs::write(root.join("net/minecraft/Main.class"), b"cafebabe").unwrap();
        }
        assert_eq!(checksum(a.path()).unwrap(), checksum(b.path()).unwrap());
        fs::write(b.path().join("net/minecraft/Main.class"), b"changed").unwrap();
        assert_ne!(checksum(a.path()).unwrap().0, checksum(b.path()).unwrap().0);
    }

    #[test]
    fn restore_replaces_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let stored = dir.path().join("stored");
        fs::create_dir_all(stored.join("pkg")).unwrap();
        fs::write(stored.join("pkg/A.class"), b"new").unwrap();

        let target = dir.path().join("work/output");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("stale.class"), b"old").unwrap();

        restore(&stored, &target).unwrap();
        assert!(!target.join("stale.class").exists());
        assert_eq!(fs::read(target.join("pkg/A.class")).unwrap(), b"new");
        assert!(stored.join("pkg/A.class").exists());
    }
}

use std::fs::{self, File};
use std::io;
use std::path::Path;

use forge_core::CoreError;
use log::warn;

use super::filter::EntryFilter;
use super::source::open_archive;

/// Descomprime en `dest` las entradas de `archive` admitidas por `filter`.
/// Devuelve el número de archivos escritos. Entradas con rutas que escapan
/// de `dest` se omiten.
pub fn extract_archive(archive: &Path, dest: &Path, filter: &dyn EntryFilter) -> Result<usize, CoreError> {
    let mut zip = open_archive(archive)?;
    fs::create_dir_all(dest).map_err(|e| CoreError::io(dest, e))?;
    let mut files = 0;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| CoreError::ArchiveFormat { path: archive.display().to_string(),
                                                                                   message: e.to_string() })?;
        let Some(relative) = entry.enclosed_name() else {
            warn!("skipping unsafe entry {} in {}", entry.name(), archive.display());
            continue;
        };
        let is_dir = entry.is_dir();
        if !filter.includes(entry.name().trim_end_matches('/'), is_dir) {
            continue;
        }
        let target = dest.join(relative);
        if is_dir {
            fs::create_dir_all(&target).map_err(|e| CoreError::io(&target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| CoreError::io(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| CoreError::io(&target, e))?;
        files += 1;
    }
    Ok(files)
}

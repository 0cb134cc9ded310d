//! Servicio de caché direccionado por fingerprint.
//!
//! `cached` garantiza como mucho una ejecución del job por fingerprint:
//! - dentro del proceso, un slot "en vuelo" por fingerprint (`DashMap`): el
//!   primero que llega lidera y el resto espera su resultado, sea un output o
//!   el mismo error;
//! - entre procesos, un lock advisory (`fs2`) en `locks/<fp>.lock`, con
//!   re-chequeo de la entrada una vez adquirido.
//!
//! El job escribe en un directorio temporal bajo `tmp/`; solo si termina bien
//! se escribe el manifiesto y el directorio completo se publica con un
//! rename. Un intento fallido o interrumpido nunca queda visible como
//! entrada y es barrido por `sweep_partials`.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use filetime::FileTime;
use forge_core::constants::ENGINE_VERSION;
use forge_core::{CacheRequest, CachedOutput, CoreError, DirectExecution, Fingerprint, Job, JobPaths, StepCache};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::CacheConfig;
use crate::entry::{marker_time, CacheEntry, EntryManifest};
use crate::error::CacheError;
use crate::layout::{CacheLayout, MANIFEST_FILE, PARTIAL_SUFFIX};
use crate::snapshot;

type FlightResult = Result<PathBuf, CoreError>;

/// Cómputo en curso para un fingerprint dentro de este proceso.
struct Flight {
    outcome: Mutex<Option<FlightResult>>,
    done: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self { outcome: Mutex::new(None),
               done: Condvar::new() }
    }

    fn complete(&self, result: FlightResult) {
        let mut slot = self.outcome.lock().unwrap_or_else(|p| p.into_inner());
        if slot.is_none() {
            *slot = Some(result);
        }
        self.done.notify_all();
    }

    fn wait(&self) -> FlightResult {
        let mut slot = self.outcome.lock().unwrap_or_else(|p| p.into_inner());
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            slot = self.done.wait(slot).unwrap_or_else(|p| p.into_inner());
        }
    }
}

/// Libera el slot en vuelo aunque el líder haga panic, para que los que
/// esperan no queden bloqueados.
struct FlightGuard<'a> {
    service: &'a CacheService,
    key: String,
    flight: Arc<Flight>,
    step: String,
}

impl FlightGuard<'_> {
    fn finish(self, result: FlightResult) {
        self.service.in_flight.remove(&self.key);
        self.flight.complete(result);
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.service.in_flight.remove_if(&self.key, |_, f| Arc::ptr_eq(f, &self.flight)).is_some() {
            self.flight.complete(Err(CoreError::StepExecutionFailed { step: self.step.clone(),
                                                                      fingerprint: Some(self.key.clone()),
                                                                      cause: "execution was interrupted".into() }));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneSummary {
    pub removed: usize,
    pub reclaimed_bytes: u64,
    pub locked_skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub checked: usize,
    /// `(fingerprint, motivo)` de cada entrada inválida.
    pub corrupt: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: u64,
    pub partials: usize,
}

pub struct CacheService {
    config: CacheConfig,
    layout: CacheLayout,
    in_flight: DashMap<String, Arc<Flight>>,
}

impl CacheService {
    pub fn new(config: CacheConfig) -> Self {
        let layout = CacheLayout::new(config.root.clone());
        Self { config,
               layout,
               in_flight: DashMap::new() }
    }

    pub fn from_env() -> Self {
        Self::new(CacheConfig::from_env())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Entrada publicada para `fingerprint`, si existe y es legible.
    pub fn lookup(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError> {
        let manifest_path = self.layout.manifest_path(fingerprint);
        if !manifest_path.is_file() {
            return Ok(None);
        }
        let manifest = match EntryManifest::read(&manifest_path) {
            Ok(m) => m,
            Err(e) => {
                warn!("ignoring unreadable cache entry {fingerprint}: {e}");
                return Ok(None);
            }
        };
        let dir = self.layout.entry_dir(fingerprint);
        if !dir.join(&manifest.output_name).exists() {
            warn!("ignoring cache entry {fingerprint}: snapshot missing");
            return Ok(None);
        }
        let last_used = marker_time(&self.layout.last_used_path(fingerprint), manifest.created_at);
        Ok(Some(CacheEntry { manifest,
                             dir,
                             last_used }))
    }

    fn touch(&self, fingerprint: &str) {
        let marker = self.layout.last_used_path(fingerprint);
        if !marker.exists() {
            let _ = File::create(&marker);
        }
        if let Err(e) = filetime::set_file_mtime(&marker, FileTime::now()) {
            debug!("cannot touch {}: {e}", marker.display());
        }
    }

    fn acquire_lock(&self, fingerprint: &str) -> Result<File, CacheError> {
        let path = self.layout.lock_path(fingerprint);
        let file = open_lock_file(&path)?;
        file.lock_exclusive().map_err(|e| CacheError::lock(&path, e))?;
        Ok(file)
    }

    fn try_lock(&self, fingerprint: &str) -> Result<Option<File>, CacheError> {
        let path = self.layout.lock_path(fingerprint);
        let file = open_lock_file(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(file)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(None),
            Err(e) => Err(CacheError::lock(&path, e)),
        }
    }

    /// Camino del líder: lock entre procesos, re-chequeo, ejecución y
    /// publicación. Devuelve la ruta del snapshot y si fue un hit.
    fn lead(&self, request: &CacheRequest<'_>, fingerprint: &Fingerprint, job: &Job<'_>) -> Result<(PathBuf, bool), CoreError> {
        let fp = fingerprint.as_str();
        let to_core = |e: CacheError| e.into_core(request.step, fp);

        self.layout.ensure().map_err(to_core)?;
        let lock = self.acquire_lock(fp).map_err(to_core)?;

        if let Some(entry) = self.lookup(fp).map_err(to_core)? {
            debug!("{}: published concurrently ({})", request.step, fingerprint.short());
            self.touch(fp);
            return Ok((entry.output_path(), true));
        }

        let attempt = self.layout.attempt_dir(fp);
        let output_name = request.target
                                 .file_name()
                                 .map(|n| n.to_string_lossy().into_owned())
                                 .unwrap_or_else(|| "output".to_string());
        let paths = JobPaths { output: attempt.join(&output_name),
                               scratch: attempt.join("scratch") };
        let outcome = fs::create_dir_all(&paths.scratch).map_err(|e| to_core(CacheError::io(&paths.scratch, e)))
                                                        .and_then(|_| job(&paths))
                                                        .and_then(|_| {
                                                            self.publish(request, fp, &attempt, &paths, &output_name)
                                                                .map_err(to_core)
                                                        });
        if let Err(e) = &outcome {
            debug!("{}: attempt discarded ({}): {e}", request.step, fingerprint.short());
            let _ = fs::remove_dir_all(&attempt);
        }
        let _ = lock.unlock();
        outcome.map(|stored| (stored, false))
    }

    fn publish(&self,
               request: &CacheRequest<'_>,
               fp: &str,
               attempt: &Path,
               paths: &JobPaths,
               output_name: &str)
               -> Result<PathBuf, CacheError> {
        if !paths.output.exists() {
            return Err(CacheError::Publish { fingerprint: fp.to_string(),
                                             message: format!("step produced no output at {}", paths.output.display()) });
        }
        let _ = fs::remove_dir_all(&paths.scratch);

        let (checksum, size) = snapshot::checksum(&paths.output)?;
        let manifest = EntryManifest { fingerprint: fp.to_string(),
                                       step: request.step.to_string(),
                                       shape: request.shape,
                                       output_name: output_name.to_string(),
                                       checksum,
                                       size,
                                       engine_version: ENGINE_VERSION.to_string(),
                                       created_at: Utc::now() };
        manifest.write(&attempt.join(MANIFEST_FILE))?;

        let entry_dir = self.layout.entry_dir(fp);
        if let Some(parent) = entry_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
        }
        // Restos sin manifiesto válido (p. ej. de una versión anterior).
        if entry_dir.exists() {
            fs::remove_dir_all(&entry_dir).map_err(|e| CacheError::io(&entry_dir, e))?;
        }
        fs::rename(attempt, &entry_dir).map_err(|e| CacheError::Publish { fingerprint: fp.to_string(),
                                                                          message: e.to_string() })?;
        self.touch(fp);
        debug!("{}: published {} ({size} bytes)", request.step, &fp[..fp.len().min(12)]);
        Ok(entry_dir.join(output_name))
    }

    fn deliver(&self, request: &CacheRequest<'_>, fingerprint: Fingerprint, stored: &Path, hit: bool) -> Result<CachedOutput, CoreError> {
        snapshot::restore(stored, request.target).map_err(|e| e.into_core(request.step, fingerprint.as_str()))?;
        Ok(CachedOutput { fingerprint,
                          path: request.target.to_path_buf(),
                          hit })
    }

    /// Entradas publicadas, ordenadas por fingerprint.
    pub fn list(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let mut entries = Vec::new();
        let root = self.layout.entries_dir();
        if !root.exists() {
            return Ok(entries);
        }
        for shard in read_dirs(&root)? {
            for dir in read_dirs(&shard)? {
                let Some(fp) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                    continue;
                };
                if let Some(entry) = self.lookup(&fp)? {
                    entries.push(entry);
                }
            }
        }
        entries.sort_by(|a, b| a.manifest.fingerprint.cmp(&b.manifest.fingerprint));
        Ok(entries)
    }

    /// Recalcula el checksum de cada entrada.
    pub fn verify(&self) -> Result<VerifyReport, CacheError> {
        let mut report = VerifyReport::default();
        for entry in self.list()? {
            report.checked += 1;
            match snapshot::checksum(&entry.output_path()) {
                Ok((sum, _)) if sum == entry.manifest.checksum => {}
                Ok(_) => report.corrupt.push((entry.manifest.fingerprint.clone(), "checksum mismatch".into())),
                Err(e) => report.corrupt.push((entry.manifest.fingerprint.clone(), e.to_string())),
            }
        }
        if !report.corrupt.is_empty() {
            warn!("{} corrupt cache entr(ies) found", report.corrupt.len());
        }
        Ok(report)
    }

    /// Elimina una entrada; `false` si no existía o está en uso.
    pub fn remove(&self, fingerprint: &str) -> Result<bool, CacheError> {
        let Some(_lock) = self.try_lock(fingerprint)? else {
            return Ok(false);
        };
        let dir = self.layout.entry_dir(fingerprint);
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;
        Ok(true)
    }

    /// Elimina las entradas no usadas en `max_age`.
    pub fn prune(&self, max_age: Duration) -> Result<PruneSummary, CacheError> {
        let cutoff = Utc::now() - chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::days(365_000));
        let mut summary = PruneSummary::default();
        for entry in self.list()? {
            if entry.last_used >= cutoff {
                continue;
            }
            let fp = entry.manifest.fingerprint.clone();
            let Some(_lock) = self.try_lock(&fp)? else {
                summary.locked_skipped += 1;
                continue;
            };
            fs::remove_dir_all(&entry.dir).map_err(|e| CacheError::io(&entry.dir, e))?;
            summary.removed += 1;
            summary.reclaimed_bytes = summary.reclaimed_bytes.saturating_add(entry.manifest.size);
        }
        info!("pruned {} cache entr(ies), {} bytes reclaimed", summary.removed, summary.reclaimed_bytes);
        Ok(summary)
    }

    /// Borra los intentos interrumpidos que quedaron en `tmp/`. Un intento
    /// cuyo fingerprint sigue bloqueado pertenece a un cómputo vivo y se
    /// respeta.
    pub fn sweep_partials(&self) -> Result<u64, CacheError> {
        let tmp = self.layout.tmp_dir();
        if !tmp.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&tmp).map_err(|e| CacheError::io(&tmp, e))? {
            let entry = entry.map_err(|e| CacheError::io(&tmp, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(PARTIAL_SUFFIX) {
                continue;
            }
            let guard = match CacheLayout::attempt_fingerprint(&name) {
                Some(fp) => match self.try_lock(fp)? {
                    Some(lock) => Some(lock),
                    None => continue,
                },
                None => None,
            };
            let path = entry.path();
            let result = if path.is_dir() { fs::remove_dir_all(&path) } else { fs::remove_file(&path) };
            result.map_err(|e| CacheError::io(&path, e))?;
            drop(guard);
            warn!("removed interrupted cache attempt {}", path.display());
            removed += 1;
        }
        Ok(removed)
    }

    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.list()?;
        let tmp = self.layout.tmp_dir();
        let partials = if tmp.exists() {
            fs::read_dir(&tmp).map_err(|e| CacheError::io(&tmp, e))?
                              .filter_map(Result::ok)
                              .filter(|e| e.file_name().to_string_lossy().ends_with(PARTIAL_SUFFIX))
                              .count()
        } else {
            0
        };
        Ok(CacheStats { entries: entries.len(),
                        total_bytes: entries.iter().map(|e| e.manifest.size).sum(),
                        partials })
    }
}

impl StepCache for CacheService {
    fn cached(&self, request: &CacheRequest<'_>, job: &Job<'_>) -> Result<CachedOutput, CoreError> {
        if !self.config.enabled {
            return DirectExecution.cached(request, job);
        }
        let fingerprint = Fingerprint::compute(request.fingerprint_input);
        let fp = fingerprint.to_string();

        if let Some(entry) = self.lookup(&fp).map_err(|e| e.into_core(request.step, &fp))? {
            debug!("{}: cache hit ({})", request.step, fingerprint.short());
            self.touch(&fp);
            return self.deliver(request, fingerprint, &entry.output_path(), true);
        }

        let (flight, leader) = match self.in_flight.entry(fp.clone()) {
            Entry::Occupied(o) => (Arc::clone(o.get()), false),
            Entry::Vacant(v) => {
                let flight = Arc::new(Flight::new());
                v.insert(Arc::clone(&flight));
                (flight, true)
            }
        };

        if !leader {
            debug!("{}: waiting for in-flight computation ({})", request.step, fingerprint.short());
            let stored = flight.wait()?;
            return self.deliver(request, fingerprint, &stored, true);
        }

        debug!("{}: cache miss ({})", request.step, fingerprint.short());
        let guard = FlightGuard { service: self,
                                  key: fp,
                                  flight,
                                  step: request.step.to_string() };
        let outcome = self.lead(request, &fingerprint, job);
        guard.finish(outcome.as_ref().map(|(p, _)| p.clone()).map_err(Clone::clone));
        let (stored, hit) = outcome?;
        self.deliver(request, fingerprint, &stored, hit)
    }
}

fn open_lock_file(path: &Path) -> Result<File, CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
    }
    OpenOptions::new().create(true)
                      .read(true)
                      .write(true)
                      .truncate(false)
                      .open(path)
                      .map_err(|e| CacheError::lock(path, e))
}

fn read_dirs(path: &Path) -> Result<Vec<PathBuf>, CacheError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| CacheError::io(path, e))? {
        let entry = entry.map_err(|e| CacheError::io(path, e))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

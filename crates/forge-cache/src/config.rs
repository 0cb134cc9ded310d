//! Configuración de la caché desde variables de entorno.
//!
//! - `FORGE_CACHE_DIR`: raíz de la caché (por defecto `<cache del sistema>/forgeflow`).
//! - `FORGE_CACHE_DISABLED`: `1`/`true` desactiva la persistencia.
//! - `FORGE_CACHE_RETENTION_DAYS`: retención usada por `prune` (30 por defecto).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

pub const CACHE_DIR_VAR: &str = "FORGE_CACHE_DIR";
pub const CACHE_DISABLED_VAR: &str = "FORGE_CACHE_DISABLED";
pub const RETENTION_DAYS_VAR: &str = "FORGE_CACHE_RETENTION_DAYS";
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub root: PathBuf,
    pub enabled: bool,
    pub retention_days: u64,
}

impl CacheConfig {
    /// Configuración explícita (tests, embebidos).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(),
               enabled: true,
               retention_days: DEFAULT_RETENTION_DAYS }
    }

    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let root = env::var_os(CACHE_DIR_VAR).filter(|v| !v.is_empty())
                                             .map(PathBuf::from)
                                             .unwrap_or_else(default_root);
        let enabled = !env::var(CACHE_DISABLED_VAR).map(|v| is_truthy(&v)).unwrap_or(false);
        let retention_days = env::var(RETENTION_DAYS_VAR).ok()
                                                         .and_then(|v| v.trim().parse().ok())
                                                         .unwrap_or(DEFAULT_RETENTION_DAYS);
        Self { root,
               enabled,
               retention_days }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_retention_days(mut self, days: u64) -> Self {
        self.retention_days = days;
        self
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(24 * 60 * 60))
    }
}

fn default_root() -> PathBuf {
    dirs::cache_dir().map(|d| d.join("forgeflow"))
                     .unwrap_or_else(|| PathBuf::from(".forgeflow-cache"))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

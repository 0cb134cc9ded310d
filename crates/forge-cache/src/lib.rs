//! forge-cache: caché persistente de outputs de steps, direccionada por
//! fingerprint y segura entre hilos y procesos.
pub mod config;
pub mod entry;
pub mod error;
pub mod layout;
pub mod service;
pub mod snapshot;

pub use config::CacheConfig;
pub use entry::{CacheEntry, EntryManifest};
pub use error::CacheError;
pub use service::{CacheService, CacheStats, PruneSummary, VerifyReport};

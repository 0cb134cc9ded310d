//! Realización de steps: sesión de build y costura con la caché.

pub mod cache;
pub mod session;

pub use cache::{CacheRequest, CachedOutput, DirectExecution, Job, StepCache};
pub use session::BuildSession;

//! ForgeFlow
//!
//! Fachada sobre los crates del pipeline:
//! - `forge_core`: argumentos, steps, fingerprints, definiciones y sesión.
//! - `forge_cache`: caché persistente de outputs.
//! - `forge_adapters`: steps concretos (zip, extracción, recompilación) y
//!   runtimes predefinidos.

pub use forge_adapters;
pub use forge_cache;
pub use forge_core;

/// Lo necesario para declarar y ejecutar un pipeline.
pub mod prelude {
    pub use forge_adapters::{base_runtime, dev_runtime, BaseRuntimeConfig, DevRuntimeConfig, JavacCompiler};
    pub use forge_cache::{CacheConfig, CacheService};
    pub use forge_core::{BuildSession, CoreError, Definition, DefinitionRegistry, InputSpec, RuntimeBuilder, StepRole,
                         StepSpec};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn core_error_messages() {
        let e = CoreError::MissingArgument { key: "mappings".into(),
                                             step: "decompile".into() };
        assert_eq!(e.to_string(), "missing argument 'mappings' for step 'decompile'");
        let e = CoreError::DelegationCycle { chain: vec!["a".into(), "b".into(), "a".into()] };
        assert_eq!(e.to_string(), "delegation cycle: a -> b -> a");
    }
}

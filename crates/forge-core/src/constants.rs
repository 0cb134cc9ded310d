//! Constantes del core.
//!
//! Valores estáticos que participan en el cálculo de fingerprints. Cambiar
//! `ENGINE_VERSION` invalida todas las entradas de caché existentes.

/// Versión lógica del motor. Se incluye en `StepFingerprintInput`, de modo que
/// un cambio incompatible en la forma de ejecutar steps recalcula los
/// fingerprints aunque argumentos e inputs no cambien.
pub const ENGINE_VERSION: &str = "FF1.0";

/// Argumento convencional que fija la extensión del output de tipo archivo.
pub const OUTPUT_EXTENSION_ARG: &str = "outputExtension";

/// Extensión usada cuando `outputExtension` no está definido.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "jar";

/// Directorio (relativo al directorio de trabajo) donde se publican outputs.
pub const STEPS_DIR: &str = "steps";

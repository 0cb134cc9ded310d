//! Implementaciones de `StepDefinition`.

pub mod compile;
pub mod extract;
pub mod inject;
pub mod libraries;
pub mod provide;

pub use compile::{CompileRequest, Compiler, JavacCompiler, RecompileStep};
pub use extract::ExtractArchiveStep;
pub use inject::InjectZipContentStep;
pub use libraries::ListLibrariesStep;
pub use provide::ProvideFileStep;

/// Multi-argumento con patrones de inclusión.
pub const INCLUDES_ARG: &str = "includes";
/// Multi-argumento con patrones de exclusión.
pub const EXCLUDES_ARG: &str = "excludes";

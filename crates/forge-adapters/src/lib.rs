//! forge-adapters: implementaciones concretas de steps (zip, extracción,
//! recompilación) y definiciones de runtime predefinidas.
pub mod archive;
pub mod runtimes;
pub mod steps;

pub use archive::{ArchiveInjector, DirectorySource, EntryFilter, InjectReport, InjectSource, PatternFilter, ZipSource};
pub use runtimes::{base_runtime, dev_runtime, BaseRuntimeConfig, DevRuntimeConfig};
pub use steps::{Compiler, ExtractArchiveStep, InjectZipContentStep, JavacCompiler, ListLibrariesStep, ProvideFileStep,
                RecompileStep};

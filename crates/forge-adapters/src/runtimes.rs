//! Definiciones de runtime predefinidas.
//!
//! - `base_runtime`: jar del cliente, listado de librerías, natives y jar
//!   de fuentes. Su patch base es el jar de fuentes.
//! - `dev_runtime`: delega en otra definición, inyecta contenido extra
//!   sobre su patch base y recompila el resultado. Solo sobreescribe el rol
//!   `Sources`; el resto se hereda.

use std::path::PathBuf;
use std::sync::Arc;

use forge_core::constants::OUTPUT_EXTENSION_ARG;
use forge_core::{CoreError, Definition, InputSpec, RuntimeBuilder, StepRole, StepSpec};
use serde_json::Value;

use crate::steps::{Compiler, ExtractArchiveStep, InjectZipContentStep, ListLibrariesStep, ProvideFileStep,
                   RecompileStep};

pub const RAW_JAR_STEP: &str = "raw_jar";
pub const LIST_LIBRARIES_STEP: &str = "list_libraries";
pub const NATIVES_STEP: &str = "natives";
pub const ASSETS_STEP: &str = "assets";
pub const SOURCES_STEP: &str = "sources";
pub const INJECT_STEP: &str = "inject";
pub const RECOMPILE_STEP: &str = "recompile";

#[derive(Debug, Clone, Default)]
pub struct BaseRuntimeConfig {
    pub name: String,
    pub client_jar: PathBuf,
    pub sources_jar: PathBuf,
    pub libraries: Vec<String>,
    pub natives_jar: Option<PathBuf>,
    pub asset_index: Option<PathBuf>,
    pub version_metadata: Option<Value>,
}

pub fn base_runtime(config: BaseRuntimeConfig) -> Result<Arc<dyn Definition>, CoreError> {
    let mut builder =
        RuntimeBuilder::new(&config.name).add_step(StepSpec::new(RAW_JAR_STEP, ProvideFileStep::new())
                                                       .input(ProvideFileStep::SOURCE, InputSpec::path(&config.client_jar)))
                                         .add_step(StepSpec::new(LIST_LIBRARIES_STEP, ListLibrariesStep::new())
                                                       .default_arg(OUTPUT_EXTENSION_ARG, "txt")
                                                       .multi_arg(ListLibrariesStep::LIBRARIES, config.libraries.clone()))
                                         .add_step(StepSpec::new(SOURCES_STEP, ProvideFileStep::new())
                                                       .input(ProvideFileStep::SOURCE, InputSpec::path(&config.sources_jar)))
                                         .role(StepRole::RawJar, RAW_JAR_STEP)
                                         .role(StepRole::ListLibraries, LIST_LIBRARIES_STEP)
                                         .role(StepRole::Sources, SOURCES_STEP)
                                         .patch_base(SOURCES_STEP);
    if let Some(natives) = &config.natives_jar {
        builder = builder.add_step(StepSpec::new(NATIVES_STEP, ExtractArchiveStep::new())
                                       .input(ExtractArchiveStep::ARCHIVE, InputSpec::path(natives))
                                       .multi_arg(crate::steps::EXCLUDES_ARG, ["META-INF/"]))
                         .role(StepRole::Natives, NATIVES_STEP);
    }
    if let Some(index) = &config.asset_index {
        builder = builder.add_step(StepSpec::new(ASSETS_STEP, ProvideFileStep::new())
                                       .default_arg(OUTPUT_EXTENSION_ARG, "json")
                                       .input(ProvideFileStep::SOURCE, InputSpec::path(index)))
                         .role(StepRole::Assets, ASSETS_STEP);
    }
    if let Some(metadata) = config.version_metadata {
        builder = builder.version_metadata(metadata);
    }
    builder.build()
}

#[derive(Debug, Clone)]
pub struct DevRuntimeConfig {
    pub name: String,
    /// Zips o directorios inyectados sobre el patch base, en orden de
    /// prioridad (el patch base va siempre primero).
    pub injections: Vec<PathBuf>,
    /// Fuentes adicionales: sourcepath de la recompilación. Sus clases se
    /// eliminan del output.
    pub additional_sources: Option<PathBuf>,
    pub compiler: Arc<dyn Compiler>,
    pub classpath: Vec<String>,
    pub release: Option<String>,
}

pub fn dev_runtime(inner: Arc<dyn Definition>, config: DevRuntimeConfig) -> Result<Arc<dyn Definition>, CoreError> {
    let patch_base = inner.patch_base()
                          .ok_or_else(|| CoreError::UnknownStep { definition: inner.name().to_string(),
                                                                  step: "patch base".to_string() })?;

    let mut inject = StepSpec::new(INJECT_STEP, InjectZipContentStep::new()).input("base", InputSpec::Resolved(Arc::clone(&patch_base)));
    for (idx, path) in config.injections.iter().enumerate() {
        inject = inject.input(format!("injection_{idx}"), InputSpec::path(path));
    }

    let mut recompile = StepSpec::new(RECOMPILE_STEP, RecompileStep::new(Arc::clone(&config.compiler)))
        .input(RecompileStep::SOURCES, InputSpec::step(INJECT_STEP))
        .multi_arg(RecompileStep::CLASSPATH, config.classpath.clone());
    if let Some(additional) = &config.additional_sources {
        recompile = recompile.input(RecompileStep::ADDITIONAL, InputSpec::path(additional));
    }
    if let Some(release) = &config.release {
        recompile = recompile.arg(RecompileStep::RELEASE, release.as_str());
    }

    RuntimeBuilder::delegating(&config.name, inner).add_step(inject)
                                                    .add_step(recompile)
                                                    .role(StepRole::Sources, INJECT_STEP)
                                                    .patch_base(patch_base.name())
                                                    .build()
}

//! Recompilación de un jar de fuentes.
//!
//! El input `sources` (jar o directorio) se compila contra el classpath
//! declarado. El output es un directorio con `classes/`,
//! `generated/sources/annotationProcessor/` y `generated/sources/headers/`.
//! Si se declara el input `additional`, sus fuentes se pasan como
//! sourcepath y, tras compilar, se borran las clases que provienen de ellas
//! (ver `prune_shadowed_classes`).

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use forge_core::hashing::content::relative_unix_path;
use forge_core::{CoreError, ExecutionContext, OutputShape, StepDefinition, StepKind, StepRunResult};
use log::{debug, info};
use walkdir::WalkDir;

use crate::archive::{extract_archive, IncludeAll};

pub const CLASSES_DIR: &str = "classes";
pub const GENERATED_SOURCES_DIR: &str = "generated/sources/annotationProcessor";
pub const HEADERS_DIR: &str = "generated/sources/headers";

/// Todo lo que un compilador necesita para una invocación.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub source_root: PathBuf,
    /// Archivos `.java` bajo `source_root`, en orden de nombre.
    pub sources: Vec<PathBuf>,
    pub sourcepath: Option<PathBuf>,
    pub classpath: Vec<String>,
    pub processor_path: Vec<String>,
    pub release: Option<String>,
    pub classes_dir: PathBuf,
    pub generated_sources_dir: PathBuf,
    pub headers_dir: PathBuf,
    pub scratch: PathBuf,
}

pub trait Compiler: Debug + Send + Sync {
    /// Identificador estable; entra al fingerprint del step.
    fn id(&self) -> &str;

    fn compile(&self, request: &CompileRequest) -> Result<(), CoreError>;
}

/// Invoca `javac` como proceso externo.
#[derive(Debug, Clone)]
pub struct JavacCompiler {
    javac: PathBuf,
    id: String,
}

impl JavacCompiler {
    pub fn new(javac: impl Into<PathBuf>) -> Self {
        let javac = javac.into();
        Self { id: format!("javac:{}", javac.display()),
               javac }
    }

    /// `javac` de `JAVA_HOME` o, si no está definido, el del `PATH`.
    pub fn from_env() -> Self {
        match std::env::var_os("JAVA_HOME") {
            Some(home) => Self::new(Path::new(&home).join("bin").join("javac")),
            None => Self::new("javac"),
        }
    }

    /// Argumentos de la invocación; las fuentes van en un argfile.
    pub fn arguments(&self, request: &CompileRequest, argfile: &Path) -> Result<Vec<String>, CoreError> {
        let mut args = vec!["-d".to_string(),
                            display(&request.classes_dir),
                            "-s".to_string(),
                            display(&request.generated_sources_dir),
                            "-h".to_string(),
                            display(&request.headers_dir),
                            "-nowarn".to_string()];
        if !request.classpath.is_empty() {
            args.push("-cp".to_string());
            args.push(join_paths(&request.classpath)?);
        }
        if let Some(sourcepath) = &request.sourcepath {
            args.push("-sourcepath".to_string());
            args.push(display(sourcepath));
        }
        if request.processor_path.is_empty() {
            args.push("-proc:none".to_string());
        } else {
            args.push("-processorpath".to_string());
            args.push(join_paths(&request.processor_path)?);
        }
        if let Some(release) = &request.release {
            args.push("--release".to_string());
            args.push(release.clone());
        }
        args.push(format!("@{}", argfile.display()));
        Ok(args)
    }
}

impl Compiler for JavacCompiler {
    fn id(&self) -> &str {
        &self.id
    }

    fn compile(&self, request: &CompileRequest) -> Result<(), CoreError> {
        let argfile = request.scratch.join("sources.args");
        let listing: String = request.sources
                                     .iter()
                                     .map(|p| format!("\"{}\"\n", display(p).replace('\\', "\\\\")))
                                     .collect();
        fs::write(&argfile, listing).map_err(|e| CoreError::io(&argfile, e))?;

        let args = self.arguments(request, &argfile)?;
        debug!("{} {}", self.javac.display(), args.join(" "));
        let output = Command::new(&self.javac).args(&args)
                                              .current_dir(&request.scratch)
                                              .output()
                                              .map_err(|e| CoreError::io(&self.javac, e))?;
        if !output.status.success() {
            return Err(CoreError::Internal(format!("javac exited with {}: {}",
                                                   output.status,
                                                   String::from_utf8_lossy(&output.stderr).trim())));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecompileStep {
    compiler: Arc<dyn Compiler>,
    id: String,
}

impl RecompileStep {
    pub const SOURCES: &'static str = "sources";
    pub const ADDITIONAL: &'static str = "additional";
    pub const CLASSPATH: &'static str = "classpath";
    pub const PROCESSOR_PATH: &'static str = "annotationProcessorPath";
    pub const RELEASE: &'static str = "release";

    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        let id = format!("forge/recompile@1+{}", compiler.id());
        Self { compiler, id }
    }

    fn source_root(&self, ctx: &ExecutionContext) -> Result<PathBuf, CoreError> {
        let sources = ctx.input(Self::SOURCES)?;
        if sources.is_dir() {
            return Ok(sources.to_path_buf());
        }
        let root = ctx.scratch.join("sources");
        extract_archive(sources, &root, &IncludeAll)?;
        Ok(root)
    }

    fn compile(&self, ctx: &ExecutionContext) -> Result<(), CoreError> {
        let source_root = self.source_root(ctx)?;
        let additional = ctx.inputs.get(Self::ADDITIONAL).cloned();
        let request = CompileRequest { sources: java_sources(&source_root)?,
                                       source_root,
                                       sourcepath: additional.clone(),
                                       classpath: ctx.multi_arguments.get_or_empty(Self::CLASSPATH).to_vec(),
                                       processor_path: ctx.multi_arguments.get_or_empty(Self::PROCESSOR_PATH).to_vec(),
                                       release: ctx.arguments.get(Self::RELEASE).ok().map(str::to_string),
                                       classes_dir: ctx.output.join(CLASSES_DIR),
                                       generated_sources_dir: ctx.output.join(GENERATED_SOURCES_DIR),
                                       headers_dir: ctx.output.join(HEADERS_DIR),
                                       scratch: ctx.scratch.clone() };
        for dir in [&request.classes_dir, &request.generated_sources_dir, &request.headers_dir] {
            fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;
        }

        if request.sources.is_empty() {
            info!("{}: no sources to compile", ctx.step);
        } else {
            info!("{}: compiling {} sources with {}", ctx.step, request.sources.len(), self.compiler.id());
            self.compiler.compile(&request)?;
        }

        if let Some(additional) = additional {
            let removed = prune_shadowed_classes(&request.classes_dir, &additional)?;
            debug!("{}: removed {removed} classes compiled from additional sources", ctx.step);
        }
        Ok(())
    }
}

impl StepDefinition for RecompileStep {
    fn implementation_id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StepKind {
        StepKind::Compile
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::Directory
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        self.compile(ctx).into()
    }
}

fn java_sources(root: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| CoreError::Io { path: root.display().to_string(),
                                                      message: e.to_string() })?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "java") {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

/// Fuente de la que proviene una clase: `a/B.class` -> `a/B.java`,
/// `a/B$Inner.class` -> `a/B.java` (se corta en el primer `$`).
pub fn source_for_class(relative: &str) -> Option<String> {
    let stem = relative.strip_suffix(".class")?;
    match stem.find('$') {
        Some(idx) => Some(format!("{}.java", &stem[..idx])),
        None => Some(format!("{stem}.java")),
    }
}

/// Borra de `classes_dir` las clases cuya fuente existe bajo
/// `additional_root`. Devuelve cuántas se borraron.
pub fn prune_shadowed_classes(classes_dir: &Path, additional_root: &Path) -> Result<usize, CoreError> {
    let mut removed = 0;
    for entry in WalkDir::new(classes_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| CoreError::Io { path: classes_dir.display().to_string(),
                                                      message: e.to_string() })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = relative_unix_path(classes_dir, entry.path());
        let Some(source) = source_for_class(&relative) else {
            continue;
        };
        if additional_root.join(&source).is_file() {
            fs::remove_file(entry.path()).map_err(|e| CoreError::io(entry.path(), e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn join_paths(entries: &[String]) -> Result<String, CoreError> {
    std::env::join_paths(entries).map(|joined| joined.to_string_lossy().into_owned())
                                 .map_err(|e| CoreError::Internal(format!("invalid classpath entry: {e}")))
}

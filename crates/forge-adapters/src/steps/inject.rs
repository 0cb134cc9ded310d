//! Step de inyección: combina todos sus inputs en un único zip.
//!
//! Los inputs se procesan en orden de declaración; un input archivo se lee
//! como zip y un input directorio se recorre como árbol. Ante un archivo
//! duplicado gana el primer input que lo aporta y el resto queda como
//! warning del step.

use std::sync::Arc;

use forge_core::{CoreError, ExecutionContext, OutputShape, StepDefinition, StepKind, StepRunResult};

use super::{EXCLUDES_ARG, INCLUDES_ARG};
use crate::archive::{ArchiveInjector, DirectorySource, EntryFilter, PatternFilter, ZipSource};

#[derive(Debug, Default, Clone, Copy)]
pub struct InjectZipContentStep;

impl InjectZipContentStep {
    pub fn new() -> Self {
        Self
    }

    /// Injector con una fuente por input, en orden de declaración.
    pub fn injector_for(ctx: &ExecutionContext) -> Result<ArchiveInjector, CoreError> {
        let filter: Arc<dyn EntryFilter> =
            Arc::new(PatternFilter::new(ctx.multi_arguments.get_or_empty(INCLUDES_ARG),
                                        ctx.multi_arguments.get_or_empty(EXCLUDES_ARG))?);
        let mut injector = ArchiveInjector::new();
        for (_, path) in ctx.inputs_in_order() {
            if path.is_dir() {
                injector.push(Box::new(DirectorySource::new(path).with_shared_filter(Arc::clone(&filter))));
            } else {
                injector.push(Box::new(ZipSource::new(path).with_shared_filter(Arc::clone(&filter))));
            }
        }
        Ok(injector)
    }
}

impl StepDefinition for InjectZipContentStep {
    fn implementation_id(&self) -> &str {
        "forge/inject-zip@1"
    }

    fn kind(&self) -> StepKind {
        StepKind::Inject
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::File
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        Self::injector_for(ctx).and_then(|injector| injector.inject(&ctx.output))
                               .map(|report| report.warnings())
                               .into()
    }
}

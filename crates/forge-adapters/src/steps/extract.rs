use forge_core::{CoreError, ExecutionContext, OutputShape, StepDefinition, StepKind, StepRunResult};
use log::debug;

use super::{EXCLUDES_ARG, INCLUDES_ARG};
use crate::archive::{extract_archive, PatternFilter};

/// Descomprime el input `archive` en un directorio, opcionalmente filtrado
/// por los multi-argumentos `includes` / `excludes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractArchiveStep;

impl ExtractArchiveStep {
    pub const ARCHIVE: &'static str = "archive";

    pub fn new() -> Self {
        Self
    }
}

impl StepDefinition for ExtractArchiveStep {
    fn implementation_id(&self) -> &str {
        "forge/extract-archive@1"
    }

    fn kind(&self) -> StepKind {
        StepKind::Extract
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::Directory
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        let result = (|| -> Result<(), CoreError> {
            let archive = ctx.input(Self::ARCHIVE)?;
            let filter = PatternFilter::new(ctx.multi_arguments.get_or_empty(INCLUDES_ARG),
                                            ctx.multi_arguments.get_or_empty(EXCLUDES_ARG))?;
            let files = extract_archive(archive, &ctx.output, &filter)?;
            debug!("{}: extracted {files} files", ctx.step);
            Ok(())
        })();
        result.into()
    }
}

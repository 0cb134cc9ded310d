// Helpers compartidos por los tests de integración de forge-core.
#![allow(dead_code)]

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use forge_core::{CoreError, ExecutionContext, OutputShape, StepDefinition, StepKind, StepRunResult};

/// Escribe el argumento `text` seguido del contenido de cada input.
#[derive(Debug, Default)]
pub struct ConcatStep {
    pub runs: Arc<AtomicUsize>,
}

impl ConcatStep {
    pub fn counted(runs: &Arc<AtomicUsize>) -> Self {
        Self { runs: Arc::clone(runs) }
    }
}

impl StepDefinition for ConcatStep {
    fn implementation_id(&self) -> &str {
        "test/concat@1"
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let result = (|| -> Result<(), CoreError> {
            let mut out = ctx.arguments.get_or("text", "").to_string();
            for (_, path) in ctx.inputs_in_order() {
                out.push_str(&fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?);
            }
            fs::write(&ctx.output, out).map_err(|e| CoreError::io(&ctx.output, e))
        })();
        result.into()
    }
}

/// Step que exige el argumento `required`.
#[derive(Debug)]
pub struct RequiresArgStep;

impl StepDefinition for RequiresArgStep {
    fn implementation_id(&self) -> &str {
        "test/requires-arg@1"
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::Directory
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        match ctx.arguments.get("required") {
            Ok(v) => {
                let _ = fs::create_dir_all(&ctx.output);
                fs::write(ctx.output.join("value.txt"), v).map_err(|e| CoreError::io(&ctx.output, e))
                                                          .into()
            }
            Err(e) => StepRunResult::failed(e),
        }
    }
}

use std::fs;

use forge_core::{CoreError, ExecutionContext, OutputShape, StepDefinition, StepKind, StepRunResult};

/// Input que trae un archivo externo (jar del cliente, jar de fuentes...)
/// al pipeline copiándolo al output del step.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProvideFileStep;

impl ProvideFileStep {
    pub const SOURCE: &'static str = "source";

    pub fn new() -> Self {
        Self
    }
}

impl StepDefinition for ProvideFileStep {
    fn implementation_id(&self) -> &str {
        "forge/provide-file@1"
    }

    fn kind(&self) -> StepKind {
        StepKind::Provide
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::File
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        let result = (|| -> Result<(), CoreError> {
            let source = ctx.input(Self::SOURCE)?;
            if !source.is_file() {
                return Err(CoreError::MissingInput { step: ctx.step.clone(),
                                                     input: Self::SOURCE.to_string(),
                                                     path: source.display().to_string() });
            }
            fs::copy(source, &ctx.output).map_err(|e| CoreError::io(&ctx.output, e))?;
            Ok(())
        })();
        result.into()
    }
}

use std::fs;

use forge_core::{CoreError, ExecutionContext, StepDefinition, StepKind, StepRunResult};

/// Escribe el listado de librerías del runtime, una por línea con el
/// formato `-e=<ruta>` que consumen las herramientas de decompilación.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListLibrariesStep;

impl ListLibrariesStep {
    pub const LIBRARIES: &'static str = "libraries";

    pub fn new() -> Self {
        Self
    }
}

pub fn render_library_list(libraries: &[String]) -> String {
    let mut out = String::new();
    for lib in libraries {
        out.push_str("-e=");
        out.push_str(lib);
        out.push('\n');
    }
    out
}

impl StepDefinition for ListLibrariesStep {
    fn implementation_id(&self) -> &str {
        "forge/list-libraries@1"
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        let listing = render_library_list(ctx.multi_arguments.get_or_empty(Self::LIBRARIES));
        fs::write(&ctx.output, listing).map_err(|e| CoreError::io(&ctx.output, e))
                                       .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_library_in_order() {
        let libs = vec!["/libs/b.jar".to_string(), "/libs/a.jar".to_string()];
        assert_eq!(render_library_list(&libs), "-e=/libs/b.jar\n-e=/libs/a.jar\n");
        assert_eq!(render_library_list(&[]), "");
    }
}

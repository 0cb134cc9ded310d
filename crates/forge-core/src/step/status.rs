/// Estado de un step dentro de una sesión de build.
///
/// Transiciones válidas:
/// - `Pending` -> `Running`
/// - `Running` -> `Cached` | `FinishedOk` | `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Aún no se pidió su output.
    Pending,
    /// En ejecución (o esperando la caché).
    Running,
    /// Output restaurado desde la caché sin ejecutar el cuerpo.
    Cached,
    /// El cuerpo se ejecutó y el output fue publicado.
    FinishedOk,
    /// El step falló.
    Failed,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Cached | StepStatus::FinishedOk | StepStatus::Failed)
    }
}

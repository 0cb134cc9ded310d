use std::fmt;

use serde::{Deserialize, Serialize};

/// Roles bien conocidos por los que colaboradores externos consultan una
/// definición, sin conocer el cableado interno de sus steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepRole {
    /// Descarga de assets.
    Assets,
    /// Extracción de natives.
    Natives,
    /// Proveedor de fuentes.
    Sources,
    /// Proveedor del binario crudo.
    RawJar,
    /// Listado de librerías.
    ListLibraries,
}

impl StepRole {
    pub const ALL: [StepRole; 5] = [StepRole::Assets,
                                    StepRole::Natives,
                                    StepRole::Sources,
                                    StepRole::RawJar,
                                    StepRole::ListLibraries];

    pub fn as_str(self) -> &'static str {
        match self {
            StepRole::Assets => "assets",
            StepRole::Natives => "natives",
            StepRole::Sources => "sources",
            StepRole::RawJar => "raw-jar",
            StepRole::ListLibraries => "list-libraries",
        }
    }
}

impl fmt::Display for StepRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

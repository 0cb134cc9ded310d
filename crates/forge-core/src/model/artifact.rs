//! Forma del output declarado por un step.
//!
//! Un step produce exactamente un artifact: un archivo (`output.<ext>`) o un
//! directorio (`output`). La caché trata ambos como una unidad lógica.

use serde::{Deserialize, Serialize};

/// Nombre base de todo output publicado.
pub const OUTPUT_STEM: &str = "output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    File,
    Directory,
}

impl OutputShape {
    /// Nombre del artifact publicado para esta forma.
    pub fn file_name(self, extension: &str) -> String {
        match self {
            OutputShape::File if extension.is_empty() => OUTPUT_STEM.to_string(),
            OutputShape::File => format!("{OUTPUT_STEM}.{extension}"),
            OutputShape::Directory => OUTPUT_STEM.to_string(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputShape::File => "file",
            OutputShape::Directory => "directory",
        }
    }
}

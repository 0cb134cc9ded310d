//! Tipos de evento de una sesión de build.
//!
//! Cada realización de un step en una `BuildSession` emite eventos a un
//! `EventStore` append-only. Sirven para auditar qué se ejecutó, qué se
//! restauró desde la caché y qué falló, sin consultar estado mutable.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildEventKind {
    /// Se empezó a realizar un step. No implica ejecución del cuerpo.
    StepStarted { step: String },
    /// El output se restauró desde la caché sin ejecutar el cuerpo.
    StepCached {
        step: String,
        fingerprint: String,
        output: String,
    },
    /// El cuerpo se ejecutó y el output fue publicado.
    StepFinished {
        step: String,
        fingerprint: String,
        output: String,
        warnings: Vec<String>,
    },
    /// El step falló; no se publicó nada.
    StepFailed {
        step: String,
        fingerprint: Option<String>,
        error: CoreError,
    },
}

impl BuildEventKind {
    pub fn step(&self) -> &str {
        match self {
            BuildEventKind::StepStarted { step }
            | BuildEventKind::StepCached { step, .. }
            | BuildEventKind::StepFinished { step, .. }
            | BuildEventKind::StepFailed { step, .. } => step,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub session_id: Uuid,
    pub kind: BuildEventKind,
    pub ts: DateTime<Utc>,
}

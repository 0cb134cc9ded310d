//! Contrato de una definición de runtime y su implementación base.
//!
//! Una definición es una colección ordenada y nombrada de steps, más los
//! roles bien conocidos y los metadatos de versión. Los colaboradores
//! externos solo la consultan por rol o por nombre de step.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::roles::StepRole;
use crate::errors::CoreError;
use crate::step::Step;

pub trait Definition: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Step visible con ese nombre (local primero, luego la cadena de
    /// delegación).
    fn step(&self, name: &str) -> Option<Arc<Step>>;

    /// Todos los steps visibles; los heredados primero, en orden de
    /// declaración, con los locales reemplazando a los homónimos.
    fn steps(&self) -> Vec<Arc<Step>>;

    fn role(&self, role: StepRole) -> Option<Arc<Step>>;

    fn version_metadata(&self) -> Option<&Value>;

    /// Definición envuelta, si esta delega.
    fn delegate(&self) -> Option<&Arc<dyn Definition>> {
        None
    }

    /// Step cuyo output es la base sobre la que se aplican parches.
    fn patch_base(&self) -> Option<Arc<Step>> {
        None
    }

    fn assets(&self) -> Option<Arc<Step>> {
        self.role(StepRole::Assets)
    }

    fn natives(&self) -> Option<Arc<Step>> {
        self.role(StepRole::Natives)
    }

    fn sources(&self) -> Option<Arc<Step>> {
        self.role(StepRole::Sources)
    }

    fn raw_jar(&self) -> Option<Arc<Step>> {
        self.role(StepRole::RawJar)
    }

    fn list_libraries(&self) -> Option<Arc<Step>> {
        self.role(StepRole::ListLibraries)
    }

    fn require_step(&self, name: &str) -> Result<Arc<Step>, CoreError> {
        self.step(name).ok_or_else(|| CoreError::UnknownStep { definition: self.name().to_string(),
                                                               step: name.to_string() })
    }

    /// Nombres desde esta definición hasta la más interna.
    fn delegation_chain(&self) -> Vec<String> {
        let mut chain = vec![self.name().to_string()];
        let mut current = self.delegate().cloned();
        while let Some(def) = current {
            chain.push(def.name().to_string());
            current = def.delegate().cloned();
        }
        chain
    }
}

/// Definición sin delegación.
#[derive(Debug)]
pub struct RuntimeDefinition {
    name: String,
    steps: IndexMap<String, Arc<Step>>,
    roles: HashMap<StepRole, Arc<Step>>,
    version_metadata: Option<Value>,
    patch_base: Option<Arc<Step>>,
}

impl RuntimeDefinition {
    pub(crate) fn new(name: String,
                      steps: IndexMap<String, Arc<Step>>,
                      roles: HashMap<StepRole, Arc<Step>>,
                      version_metadata: Option<Value>,
                      patch_base: Option<Arc<Step>>)
                      -> Self {
        Self { name,
               steps,
               roles,
               version_metadata,
               patch_base }
    }

    pub fn local_steps(&self) -> impl Iterator<Item = &Arc<Step>> {
        self.steps.values()
    }

    pub fn local_step(&self, name: &str) -> Option<&Arc<Step>> {
        self.steps.get(name)
    }

    pub fn local_role(&self, role: StepRole) -> Option<&Arc<Step>> {
        self.roles.get(&role)
    }

    pub(crate) fn local_patch_base(&self) -> Option<&Arc<Step>> {
        self.patch_base.as_ref()
    }
}

impl Definition for RuntimeDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&self, name: &str) -> Option<Arc<Step>> {
        self.steps.get(name).cloned()
    }

    fn steps(&self) -> Vec<Arc<Step>> {
        self.steps.values().cloned().collect()
    }

    fn role(&self, role: StepRole) -> Option<Arc<Step>> {
        self.roles.get(&role).cloned()
    }

    fn version_metadata(&self) -> Option<&Value> {
        self.version_metadata.as_ref()
    }

    fn patch_base(&self) -> Option<Arc<Step>> {
        self.patch_base.clone()
    }
}

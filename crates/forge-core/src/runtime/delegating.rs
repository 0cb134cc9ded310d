//! Definición que delega en otra.
//!
//! Composición explícita: `DelegatingDefinition` contiene su parte local y
//! una referencia a la definición interna. Toda consulta sin override local
//! se reenvía a la interna; como la interna puede delegar a su vez, el
//! reenvío es transitivo. La cadena es finita porque cada definición se
//! construye sobre una interna ya construida e inmutable, y el constructor
//! rechaza una interna cuya cadena ya contiene el nombre propio.

use std::sync::Arc;

use serde_json::Value;

use super::definition::{Definition, RuntimeDefinition};
use super::roles::StepRole;
use crate::errors::CoreError;
use crate::step::Step;

#[derive(Debug)]
pub struct DelegatingDefinition {
    local: RuntimeDefinition,
    inner: Arc<dyn Definition>,
}

impl DelegatingDefinition {
    pub fn new(local: RuntimeDefinition, inner: Arc<dyn Definition>) -> Result<Self, CoreError> {
        let inner_chain = inner.delegation_chain();
        if inner_chain.iter().any(|n| n == local.name()) {
            let mut chain = vec![local.name().to_string()];
            chain.extend(inner_chain);
            return Err(CoreError::DelegationCycle { chain });
        }
        Ok(Self { local, inner })
    }

    pub fn inner(&self) -> &Arc<dyn Definition> {
        &self.inner
    }

    pub fn local(&self) -> &RuntimeDefinition {
        &self.local
    }
}

impl Definition for DelegatingDefinition {
    fn name(&self) -> &str {
        self.local.name()
    }

    fn step(&self, name: &str) -> Option<Arc<Step>> {
        self.local.local_step(name).cloned().or_else(|| self.inner.step(name))
    }

    fn steps(&self) -> Vec<Arc<Step>> {
        let mut all: Vec<Arc<Step>> = self.inner
                                          .steps()
                                          .into_iter()
                                          .filter(|s| self.local.local_step(s.name()).is_none())
                                          .collect();
        all.extend(self.local.local_steps().cloned());
        all
    }

    fn role(&self, role: StepRole) -> Option<Arc<Step>> {
        self.local.local_role(role).cloned().or_else(|| self.inner.role(role))
    }

    fn version_metadata(&self) -> Option<&Value> {
        self.local.version_metadata().or_else(|| self.inner.version_metadata())
    }

    fn delegate(&self) -> Option<&Arc<dyn Definition>> {
        Some(&self.inner)
    }

    fn patch_base(&self) -> Option<Arc<Step>> {
        self.local.local_patch_base().cloned().or_else(|| self.inner.patch_base())
    }
}

//! Builder de definiciones.
//!
//! Acumula `StepSpec`s en orden y, en `build`, los resuelve a `Arc<Step>`:
//! cada input que nombra un step se busca entre los steps locales ya
//! declarados y, si no está, en la definición interna. Un step solo puede
//! depender de steps declarados antes o heredados, así que una definición
//! externa depende de la interna y nunca al revés.
//!
//! ```ignore
//! let base = RuntimeBuilder::new("base")
//!     .add_step(StepSpec::new("raw_jar", ProvideFileStep::new()).input("source", InputSpec::path(jar)))
//!     .role(StepRole::RawJar, "raw_jar")
//!     .build()?;
//! let dev = RuntimeBuilder::delegating("dev", base)
//!     .add_step(StepSpec::new("recompile", RecompileStep::new(compiler)).input("sources", InputSpec::step("decompile")))
//!     .role(StepRole::Sources, "recompile")
//!     .build()?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use super::definition::{Definition, RuntimeDefinition};
use super::delegating::DelegatingDefinition;
use super::roles::StepRole;
use crate::errors::CoreError;
use crate::step::{InputArtifact, InputSpec, Step, StepSpec};

#[derive(Debug)]
pub struct RuntimeBuilder {
    name: String,
    inner: Option<Arc<dyn Definition>>,
    specs: Vec<StepSpec>,
    roles: Vec<(StepRole, String)>,
    version_metadata: Option<Value>,
    patch_base: Option<String>,
}

impl RuntimeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               inner: None,
               specs: Vec::new(),
               roles: Vec::new(),
               version_metadata: None,
               patch_base: None }
    }

    /// Builder de una definición que delega en `inner`.
    pub fn delegating(name: impl Into<String>, inner: Arc<dyn Definition>) -> Self {
        let mut builder = Self::new(name);
        builder.inner = Some(inner);
        builder
    }

    pub fn add_step(mut self, spec: StepSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Asigna (o, al delegar, sobreescribe) un rol con un step local.
    pub fn role(mut self, role: StepRole, step: impl Into<String>) -> Self {
        self.roles.push((role, step.into()));
        self
    }

    pub fn version_metadata(mut self, metadata: Value) -> Self {
        self.version_metadata = Some(metadata);
        self
    }

    pub fn patch_base(mut self, step: impl Into<String>) -> Self {
        self.patch_base = Some(step.into());
        self
    }

    pub fn build(self) -> Result<Arc<dyn Definition>, CoreError> {
        let RuntimeBuilder { name,
                             inner,
                             specs,
                             roles,
                             version_metadata,
                             patch_base } = self;

        let mut steps: IndexMap<String, Arc<Step>> = IndexMap::with_capacity(specs.len());
        for spec in specs {
            if steps.contains_key(&spec.name) {
                return Err(CoreError::DuplicateStep { definition: name,
                                                      step: spec.name });
            }
            let mut inputs = IndexMap::with_capacity(spec.inputs.len());
            for (input_name, input) in &spec.inputs {
                let resolved = match input {
                    InputSpec::Path(p) => InputArtifact::Path(p.clone()),
                    InputSpec::Resolved(s) => InputArtifact::Step(Arc::clone(s)),
                    InputSpec::Step(upstream) => {
                        let found = steps.get(upstream)
                                         .cloned()
                                         .or_else(|| inner.as_ref().and_then(|i| i.step(upstream)));
                        match found {
                            Some(s) => InputArtifact::Step(s),
                            None => {
                                return Err(CoreError::UnknownStep { definition: name,
                                                                    step: upstream.clone() })
                            }
                        }
                    }
                };
                inputs.insert(input_name.clone(), resolved);
            }
            let step = Arc::new(Step::new(&name, spec, inputs));
            debug!("definition '{}': step '{}' resolved", name, step.name());
            steps.insert(step.name().to_string(), step);
        }

        let mut role_map = HashMap::with_capacity(roles.len());
        for (role, step_name) in roles {
            let step = lookup(&name, &steps, inner.as_ref(), &step_name)?;
            role_map.insert(role, step);
        }
        let patch_base = match patch_base {
            Some(step_name) => Some(lookup(&name, &steps, inner.as_ref(), &step_name)?),
            None => None,
        };

        let local = RuntimeDefinition::new(name, steps, role_map, version_metadata, patch_base);
        match inner {
            Some(inner) => Ok(Arc::new(DelegatingDefinition::new(local, inner)?)),
            None => Ok(Arc::new(local)),
        }
    }
}

fn lookup(definition: &str,
          steps: &IndexMap<String, Arc<Step>>,
          inner: Option<&Arc<dyn Definition>>,
          step_name: &str)
          -> Result<Arc<Step>, CoreError> {
    steps.get(step_name)
         .cloned()
         .or_else(|| inner.and_then(|i| i.step(step_name)))
         .ok_or_else(|| CoreError::UnknownStep { definition: definition.to_string(),
                                                 step: step_name.to_string() })
}

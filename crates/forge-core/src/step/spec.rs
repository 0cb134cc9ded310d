//! Declaración (`StepSpec`) y forma resuelta (`Step`) de un step.
//!
//! Un `StepSpec` referencia a sus upstream por nombre. El builder de
//! definiciones lo convierte en un `Step` inmutable cuyos inputs son
//! `Arc<Step>` ya resueltos: el grafo es acíclico por construcción y los
//! steps de una definición interna nunca ven overrides de la externa.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;

use super::definition::StepDefinition;
use crate::argument::{Provider, RuntimeArguments, RuntimeMultiArguments};
use crate::constants::{DEFAULT_OUTPUT_EXTENSION, OUTPUT_EXTENSION_ARG};
use crate::errors::CoreError;
use crate::model::OutputShape;

/// Input declarado, antes de resolver.
#[derive(Debug, Clone)]
pub enum InputSpec {
    /// Archivo o directorio externo.
    Path(PathBuf),
    /// Output de otro step, buscado por nombre en la definición local y
    /// luego en la cadena de delegación.
    Step(String),
    /// Output de un step ya resuelto (p. ej. de otra definición).
    Resolved(Arc<Step>),
}

impl InputSpec {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        InputSpec::Path(path.into())
    }

    pub fn step(name: impl Into<String>) -> Self {
        InputSpec::Step(name.into())
    }
}

/// Input resuelto.
#[derive(Debug, Clone)]
pub enum InputArtifact {
    Path(PathBuf),
    Step(Arc<Step>),
}

pub struct StepSpec {
    pub(crate) name: String,
    pub(crate) body: Arc<dyn StepDefinition>,
    pub(crate) inputs: IndexMap<String, InputSpec>,
    pub(crate) arguments: RuntimeArguments,
    pub(crate) multi_arguments: RuntimeMultiArguments,
}

impl StepSpec {
    pub fn new(name: impl Into<String>, body: impl StepDefinition + 'static) -> Self {
        Self::with_body(name, Arc::new(body))
    }

    pub fn with_body(name: impl Into<String>, body: Arc<dyn StepDefinition>) -> Self {
        let name = name.into();
        Self { arguments: RuntimeArguments::new(name.clone()),
               multi_arguments: RuntimeMultiArguments::new(name.clone()),
               name,
               body,
               inputs: IndexMap::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declara un input. El orden de declaración entra al fingerprint.
    pub fn input(mut self, name: impl Into<String>, input: InputSpec) -> Self {
        self.inputs.insert(name.into(), input);
        self
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Provider<String>>) -> Self {
        self.arguments.set(key, value);
        self
    }

    pub fn default_arg(mut self, key: impl Into<String>, value: impl Into<Provider<String>>) -> Self {
        self.arguments.set_default(key, value);
        self
    }

    pub fn multi_arg<I, S>(mut self, key: impl Into<String>, values: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.multi_arguments.set_values(key, values);
        self
    }

    pub fn arguments_mut(&mut self) -> &mut RuntimeArguments {
        &mut self.arguments
    }

    pub fn multi_arguments_mut(&mut self) -> &mut RuntimeMultiArguments {
        &mut self.multi_arguments
    }
}

impl fmt::Debug for StepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSpec")
         .field("name", &self.name)
         .field("body", &self.body)
         .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
         .finish()
    }
}

/// Step resuelto e inmutable. Se comparte como `Arc<Step>`; dos consultas
/// que devuelven el mismo step devuelven el mismo puntero.
pub struct Step {
    name: String,
    definition: String,
    body: Arc<dyn StepDefinition>,
    inputs: IndexMap<String, InputArtifact>,
    arguments: RuntimeArguments,
    multi_arguments: RuntimeMultiArguments,
}

impl Step {
    pub(crate) fn new(definition: &str, spec: StepSpec, inputs: IndexMap<String, InputArtifact>) -> Self {
        Self { name: spec.name,
               definition: definition.to_string(),
               body: spec.body,
               inputs,
               arguments: spec.arguments,
               multi_arguments: spec.multi_arguments }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Definición que declaró este step.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// `"<definición>/<step>"`, único dentro de una sesión.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.definition, self.name)
    }

    pub fn body(&self) -> &Arc<dyn StepDefinition> {
        &self.body
    }

    pub fn inputs(&self) -> &IndexMap<String, InputArtifact> {
        &self.inputs
    }

    /// Steps de los que depende directamente, en orden de declaración.
    pub fn upstream(&self) -> impl Iterator<Item = &Arc<Step>> {
        self.inputs.values().filter_map(|i| match i {
                                 InputArtifact::Step(s) => Some(s),
                                 InputArtifact::Path(_) => None,
                             })
    }

    pub fn arguments(&self) -> &RuntimeArguments {
        &self.arguments
    }

    pub fn multi_arguments(&self) -> &RuntimeMultiArguments {
        &self.multi_arguments
    }

    pub fn output_shape(&self) -> OutputShape {
        self.body.output_shape()
    }

    /// `output.<ext>` para archivos (según `outputExtension`), `output` para
    /// directorios.
    pub fn output_file_name(&self) -> Result<String, CoreError> {
        let ext = self.arguments.get_or_default(OUTPUT_EXTENSION_ARG, DEFAULT_OUTPUT_EXTENSION)?;
        Ok(self.output_shape().file_name(&ext))
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
         .field("name", &self.name)
         .field("definition", &self.definition)
         .field("implementation", &self.body.implementation_id())
         .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
         .finish()
    }
}

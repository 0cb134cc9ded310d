//! Registro de definiciones.
//!
//! Cada definición se registra con una fábrica y, opcionalmente, el nombre de
//! la definición en la que delega. `assemble` construye todas en orden de
//! dependencia (las internas primero) y detecta ciclos de delegación antes de
//! construir nada: un ciclo es un error de configuración, no de uso.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info};

use super::definition::Definition;
use super::observe::ReplayRegistry;
use crate::errors::CoreError;

/// Construye una definición a partir de su interna ya ensamblada (si delega).
pub type DefinitionFactory =
    Box<dyn Fn(Option<Arc<dyn Definition>>) -> Result<Arc<dyn Definition>, CoreError> + Send + Sync>;

struct Registration {
    delegate: Option<String>,
    factory: DefinitionFactory,
}

#[derive(Default)]
pub struct DefinitionRegistry {
    registrations: IndexMap<String, Registration>,
    assembled: IndexMap<String, Arc<dyn Definition>>,
    added: ReplayRegistry<Arc<dyn Definition>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra (o reemplaza) la definición `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, delegate: Option<&str>, factory: F)
        where F: Fn(Option<Arc<dyn Definition>>) -> Result<Arc<dyn Definition>, CoreError> + Send + Sync + 'static
    {
        self.registrations.insert(name.into(),
                                  Registration { delegate: delegate.map(str::to_string),
                                                 factory: Box::new(factory) });
    }

    /// Observa cada definición ensamblada, incluidas las ya ensambladas.
    pub fn when_definition_added<F>(&self, callback: F)
        where F: Fn(&Arc<dyn Definition>) + Send + Sync + 'static
    {
        self.added.subscribe(callback);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Definition>, CoreError> {
        self.assembled
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::UnknownDefinition { name: name.to_string() })
    }

    /// Orden de ensamblado: cada definición después de aquella en la que delega.
    pub fn assembly_order(&self) -> Result<Vec<String>, CoreError> {
        let mut order = Vec::with_capacity(self.registrations.len());
        let mut done: HashSet<&str> = HashSet::new();
        for name in self.registrations.keys() {
            let mut stack: Vec<&str> = Vec::new();
            self.visit(name, &mut stack, &mut done, &mut order)?;
        }
        Ok(order)
    }

    fn visit<'a>(&'a self,
                 name: &'a str,
                 stack: &mut Vec<&'a str>,
                 done: &mut HashSet<&'a str>,
                 order: &mut Vec<String>)
                 -> Result<(), CoreError> {
        if done.contains(name) {
            return Ok(());
        }
        if let Some(pos) = stack.iter().position(|n| *n == name) {
            let mut chain: Vec<String> = stack[pos..].iter().map(|n| n.to_string()).collect();
            chain.push(name.to_string());
            return Err(CoreError::DelegationCycle { chain });
        }
        let registration = match self.registrations.get_key_value(name) {
            Some((_, r)) => r,
            None if self.assembled.contains_key(name) => return Ok(()),
            None => return Err(CoreError::UnknownDefinition { name: name.to_string() }),
        };
        stack.push(name);
        if let Some(delegate) = registration.delegate.as_deref() {
            self.visit(delegate, stack, done, order)?;
        }
        stack.pop();
        done.insert(name);
        order.push(name.to_string());
        Ok(())
    }

    /// Ensambla todas las definiciones registradas. Devuelve las nuevas en
    /// orden de ensamblado.
    pub fn assemble(&mut self) -> Result<Vec<Arc<dyn Definition>>, CoreError> {
        let order = self.assembly_order()?;
        let mut built = Vec::with_capacity(order.len());
        for name in order {
            let Some(registration) = self.registrations.shift_remove(&name) else {
                continue;
            };
            let inner = match registration.delegate.as_deref() {
                Some(delegate) => Some(self.get(delegate)?),
                None => None,
            };
            let definition = (registration.factory)(inner)?;
            debug!("definition '{}' assembled (chain: {})", name, definition.delegation_chain().join(" -> "));
            self.assembled.insert(name, Arc::clone(&definition));
            self.added.add(Arc::clone(&definition));
            built.push(definition);
        }
        info!("{} runtime definition(s) assembled", built.len());
        Ok(built)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Arc<dyn Definition>> {
        self.assembled.values()
    }
}

impl fmt::Debug for DefinitionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionRegistry")
         .field("pending", &self.registrations.keys().collect::<Vec<_>>())
         .field("assembled", &self.assembled.keys().collect::<Vec<_>>())
         .finish()
    }
}

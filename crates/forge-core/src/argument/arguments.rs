//! Contenedores de argumentos de un step.
//!
//! - `RuntimeArguments`: clave -> valor escalar.
//! - `RuntimeMultiArguments`: clave -> lista ordenada de escalares.
//!
//! Ambos conservan el orden de inserción de las claves (`IndexMap`) y se
//! resuelven de forma perezosa. El orden de las claves no entra al
//! fingerprint (el JSON canónico ordena las claves); el orden de los
//! elementos de una lista sí.

use indexmap::IndexMap;

use super::provider::Provider;
use super::resolved::{ResolvedArguments, ResolvedMultiArguments};
use crate::errors::CoreError;

#[derive(Debug, Clone, Default)]
struct Argument<T> {
    value: Option<Provider<T>>,
    default: Option<Provider<T>>,
}

impl<T> Argument<T> where T: Clone + Send + Sync + 'static
{
    fn provider(&self) -> Option<&Provider<T>> {
        self.value.as_ref().or(self.default.as_ref())
    }
}

/// Argumentos escalares de un step.
#[derive(Debug, Clone)]
pub struct RuntimeArguments {
    owner: String,
    entries: IndexMap<String, Argument<String>>,
}

impl RuntimeArguments {
    /// Crea un contenedor vacío para el step `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self { owner: owner.into(),
               entries: IndexMap::new() }
    }

    /// Step dueño de estos argumentos (aparece en `MissingArgument`).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Fija el valor de `key` (reemplaza uno previo).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Provider<String>>) {
        self.entries.entry(key.into()).or_default().value = Some(value.into());
    }

    /// Fija un valor ya conocido.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, Provider::of(value.into()));
    }

    /// Valor usado cuando `key` no tiene valor propio.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Provider<String>>) {
        self.entries.entry(key.into()).or_default().default = Some(value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.get(key).and_then(|a| a.provider()).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Valor resuelto de `key`; `MissingArgument` si no hay valor ni default.
    pub fn get(&self, key: &str) -> Result<String, CoreError> {
        match self.entries.get(key).and_then(|a| a.provider()) {
            Some(p) => p.get(),
            None => Err(CoreError::MissingArgument { key: key.to_string(),
                                                     step: self.owner.clone() }),
        }
    }

    /// Valor resuelto de `key` o `fallback` si no está definido.
    pub fn get_or_default(&self, key: &str, fallback: impl Into<Provider<String>>) -> Result<String, CoreError> {
        match self.entries.get(key).and_then(|a| a.provider()) {
            Some(p) => p.get(),
            None => fallback.into().get(),
        }
    }

    /// Instantánea de todos los argumentos definidos (valor o default).
    pub fn resolve_all(&self) -> Result<ResolvedArguments, CoreError> {
        let mut values = IndexMap::with_capacity(self.entries.len());
        for (key, arg) in &self.entries {
            if let Some(p) = arg.provider() {
                values.insert(key.clone(), p.get()?);
            }
        }
        Ok(ResolvedArguments::new(self.owner.clone(), values))
    }
}

/// Argumentos multi-valor de un step (p. ej. entradas de classpath).
#[derive(Debug, Clone)]
pub struct RuntimeMultiArguments {
    owner: String,
    entries: IndexMap<String, Argument<Vec<String>>>,
}

impl RuntimeMultiArguments {
    pub fn new(owner: impl Into<String>) -> Self {
        Self { owner: owner.into(),
               entries: IndexMap::new() }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Fija la lista completa de `key`.
    pub fn set(&mut self, key: impl Into<String>, values: impl Into<Provider<Vec<String>>>) {
        self.entries.entry(key.into()).or_default().value = Some(values.into());
    }

    pub fn set_values<I, S>(&mut self, key: impl Into<String>, values: I)
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        let list: Vec<String> = values.into_iter().map(Into::into).collect();
        self.set(key, Provider::of(list));
    }

    pub fn set_default(&mut self, key: impl Into<String>, values: impl Into<Provider<Vec<String>>>) {
        self.entries.entry(key.into()).or_default().default = Some(values.into());
    }

    /// Añade un elemento al final de la lista de `key`, preservando el orden.
    /// La primera adición parte del default vigente, si lo hay.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Provider<String>>) {
        let item: Provider<String> = value.into();
        let arg = self.entries.entry(key.into()).or_default();
        let previous = arg.value.take().or_else(|| arg.default.clone());
        arg.value = Some(Provider::from_fn(move || {
            let mut list = match &previous {
                Some(p) => p.get()?,
                None => Vec::new(),
            };
            list.push(item.get()?);
            Ok(list)
        }));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.get(key).and_then(|a| a.provider()).is_some()
    }

    pub fn get(&self, key: &str) -> Result<Vec<String>, CoreError> {
        match self.entries.get(key).and_then(|a| a.provider()) {
            Some(p) => p.get(),
            None => Err(CoreError::MissingArgument { key: key.to_string(),
                                                     step: self.owner.clone() }),
        }
    }

    pub fn get_or_default(&self, key: &str, fallback: impl Into<Provider<Vec<String>>>) -> Result<Vec<String>, CoreError> {
        match self.entries.get(key).and_then(|a| a.provider()) {
            Some(p) => p.get(),
            None => fallback.into().get(),
        }
    }

    pub fn resolve_all(&self) -> Result<ResolvedMultiArguments, CoreError> {
        let mut values = IndexMap::with_capacity(self.entries.len());
        for (key, arg) in &self.entries {
            if let Some(p) = arg.provider() {
                values.insert(key.clone(), p.get()?);
            }
        }
        Ok(ResolvedMultiArguments::new(self.owner.clone(), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_prefers_value_over_default() {
        let mut args = RuntimeArguments::new("decompile");
        args.set_default("side", "joined");
        assert_eq!(args.get("side").unwrap(), "joined");
        args.set_value("side", "client");
        assert_eq!(args.get("side").unwrap(), "client");
    }

    #[test]
    fn unset_key_without_default_fails_with_owner() {
        let args = RuntimeArguments::new("decompile");
        let err = args.get("mappings").unwrap_err();
        assert_eq!(err,
                   CoreError::MissingArgument { key: "mappings".into(),
                                                step: "decompile".into() });
        assert_eq!(args.get_or_default("mappings", "official").unwrap(), "official");
    }

    #[test]
    fn multi_add_preserves_insertion_order() {
        let mut multi = RuntimeMultiArguments::new("recompile");
        multi.add("classpath", "b.jar");
        multi.add("classpath", "a.jar");
        multi.add("classpath", Provider::from_fn(|| Ok("c.jar".to_string())));
        assert_eq!(multi.get("classpath").unwrap(), vec!["b.jar", "a.jar", "c.jar"]);
    }

    #[test]
    fn multi_add_extends_the_default() {
        let mut args = RuntimeMultiArguments::new("compile");
        args.set_default("classpath", Provider::of(vec!["base.jar".to_string()]));
        args.add("classpath", "extra.jar");
        assert_eq!(args.get("classpath").unwrap(), vec!["base.jar", "extra.jar"]);
    }

    #[test]
    fn resolve_all_skips_undefined_and_keeps_defaults() {
        let mut args = RuntimeArguments::new("inject");
        args.set_default("outputExtension", "zip");
        args.set_value("mode", "merge");
        let resolved = args.resolve_all().unwrap();
        assert_eq!(resolved.get("outputExtension").unwrap(), "zip");
        assert_eq!(resolved.get("mode").unwrap(), "merge");
        assert!(resolved.get("missing").is_err());
    }

    #[test]
    fn resolve_all_surfaces_provider_failure() {
        let mut multi = RuntimeMultiArguments::new("list_libraries");
        multi.set("libraries",
                  Provider::<Vec<String>>::from_fn(|| Err(CoreError::Internal("resolution failed".into()))));
        assert!(multi.resolve_all().is_err());
    }
}

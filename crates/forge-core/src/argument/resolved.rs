//! Instantáneas resueltas de argumentos.
//!
//! Son lo que ven el fingerprint y el cuerpo de un step: valores ya
//! calculados, inmutables y serializables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArguments {
    #[serde(skip)]
    owner: String,
    #[serde(flatten)]
    values: IndexMap<String, String>,
}

impl ResolvedArguments {
    pub fn new(owner: impl Into<String>, values: IndexMap<String, String>) -> Self {
        Self { owner: owner.into(),
               values }
    }

    pub fn get(&self, key: &str) -> Result<&str, CoreError> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CoreError::MissingArgument { key: key.to_string(),
                                                        step: self.owner.clone() })
    }

    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.values.get(key).map(String::as_str).unwrap_or(fallback)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.values
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMultiArguments {
    #[serde(skip)]
    owner: String,
    #[serde(flatten)]
    values: IndexMap<String, Vec<String>>,
}

impl ResolvedMultiArguments {
    pub fn new(owner: impl Into<String>, values: IndexMap<String, Vec<String>>) -> Self {
        Self { owner: owner.into(),
               values }
    }

    pub fn get(&self, key: &str) -> Result<&[String], CoreError> {
        self.values
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| CoreError::MissingArgument { key: key.to_string(),
                                                        step: self.owner.clone() })
    }

    /// Lista de `key` o vacía si no se definió.
    pub fn get_or_empty(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn as_map(&self) -> &IndexMap<String, Vec<String>> {
        &self.values
    }
}

//! Fingerprint de un step.
//!
//! `StepFingerprintInput` agrupa los insumos (no es el hash final). El
//! fingerprint es blake3 sobre su JSON canónico: las claves de objeto se
//! ordenan, por lo que el orden de inserción de argumentos no importa; el
//! orden de los elementos de un argumento multi-valor y el de los inputs
//! declarados sí.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::argument::{ResolvedArguments, ResolvedMultiArguments};
use crate::hashing::hash_value;

/// Hash de contenido de un input declarado, en orden de declaración.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputHash {
    pub name: String,
    pub hash: String,
}

#[derive(Debug, Serialize)]
pub struct StepFingerprintInput<'a> {
    pub engine_version: &'a str,
    pub step: &'a str,
    pub implementation: &'a str,
    pub kind: &'a str,
    pub arguments: &'a ResolvedArguments,
    pub multi_arguments: &'a ResolvedMultiArguments,
    pub inputs: &'a [InputHash],
}

/// Digest hex (64 caracteres) que identifica un resultado cacheable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(input: &StepFingerprintInput<'_>) -> Self {
        // La serialización de estructuras con claves string no falla.
        let value = serde_json::to_value(input).unwrap_or(serde_json::Value::Null);
        Fingerprint(hash_value(&value))
    }

    /// Envuelve un digest ya calculado (p. ej. leído de un manifiesto).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Fingerprint(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefijo corto para logs.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::{RuntimeArguments, RuntimeMultiArguments};
    use crate::constants::ENGINE_VERSION;

    fn fingerprint(args: &RuntimeArguments, multi: &RuntimeMultiArguments, inputs: &[InputHash]) -> Fingerprint {
        let resolved = args.resolve_all().unwrap();
        let resolved_multi = multi.resolve_all().unwrap();
        Fingerprint::compute(&StepFingerprintInput { engine_version: ENGINE_VERSION,
                                                     step: "recompile",
                                                     implementation: "test/recompile@1",
                                                     kind: "compile",
                                                     arguments: &resolved,
                                                     multi_arguments: &resolved_multi,
                                                     inputs })
    }

    #[test]
    fn argument_insertion_order_is_irrelevant() {
        let mut a = RuntimeArguments::new("recompile");
        a.set_value("release", "21");
        a.set_value("outputExtension", "jar");
        let mut b = RuntimeArguments::new("recompile");
        b.set_value("outputExtension", "jar");
        b.set_value("release", "21");
        let multi = RuntimeMultiArguments::new("recompile");
        assert_eq!(fingerprint(&a, &multi, &[]), fingerprint(&b, &multi, &[]));
    }

    #[test]
    fn multi_value_order_matters() {
        let args = RuntimeArguments::new("recompile");
        let mut ab = RuntimeMultiArguments::new("recompile");
        ab.set_values("classpath", ["a.jar", "b.jar"]);
        let mut ba = RuntimeMultiArguments::new("recompile");
        ba.set_values("classpath", ["b.jar", "a.jar"]);
        assert_ne!(fingerprint(&args, &ab, &[]), fingerprint(&args, &ba, &[]));
    }

    #[test]
    fn input_hash_change_changes_fingerprint() {
        let args = RuntimeArguments::new("recompile");
        let multi = RuntimeMultiArguments::new("recompile");
        let one = [InputHash { name: "sources".into(),
                               hash: "aa".into() }];
        let two = [InputHash { name: "sources".into(),
                               hash: "bb".into() }];
        assert_ne!(fingerprint(&args, &multi, &one), fingerprint(&args, &multi, &two));
    }
}

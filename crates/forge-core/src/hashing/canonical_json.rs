//! JSON canónico mínimo: claves de objeto ordenadas y sin espacios.
//!
//! Los arrays conservan su orden; esto es lo que hace que un argumento
//! multi-valor sea sensible al orden dentro del fingerprint.

use serde_json::Value;
use std::collections::BTreeMap;

pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let tree: BTreeMap<&String, String> = map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let items: Vec<String> = tree.into_iter()
                                         .map(|(k, v)| format!("{}:{}", quote(k), v))
                                         .collect();
            format!("{{{}}}", items.join(","))
        }
    }
}

fn quote(s: &str) -> String {
    // serializar un &str a JSON no puede fallar
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.escape_default()))
}

#[cfg(test)]
mod tests {
    use super::to_canonical_json;
    use serde_json::json;

    #[test]
    fn test_primitives() {
        assert_eq!(to_canonical_json(&json!(null)), "null");
        assert_eq!(to_canonical_json(&json!(true)), "true");
        assert_eq!(to_canonical_json(&json!(123)), "123");
        assert_eq!(to_canonical_json(&json!("client")), "\"client\"");
    }

    #[test]
    fn test_object_sorted_keys() {
        let val = json!({ "side": "joined", "mappings": "official" });
        assert_eq!(to_canonical_json(&val), "{\"mappings\":\"official\",\"side\":\"joined\"}");
    }

    #[test]
    fn test_arrays_keep_order() {
        let a = to_canonical_json(&json!({"classpath": ["a.jar", "b.jar"]}));
        let b = to_canonical_json(&json!({"classpath": ["b.jar", "a.jar"]}));
        assert_ne!(a, b);
    }
}

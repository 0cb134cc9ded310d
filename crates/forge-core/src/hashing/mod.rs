//! Hashing y canonicalización JSON.

pub mod canonical_json;
pub mod content;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use content::hash_path;
pub use hash::{hash_bytes, hash_str, hash_value};

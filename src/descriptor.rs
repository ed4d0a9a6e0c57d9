//! Key/value view over resolved descriptors.
//!
//! Descriptors are typed structs; this module turns them into nested JSON
//! mappings so callers can read a field by name (`"chatConfig.historyCount"`)
//! without knowing the concrete type.

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// Serialize a descriptor into its nested mapping form.
pub fn to_value<T: Serialize + ?Sized>(descriptor: &T) -> Result<Value, AppError> {
    serde_json::to_value(descriptor)
        .map_err(|e| AppError::Config(format!("descriptor not representable: {e}")))
}

/// Follow a dotted key path. Numeric segments index into arrays.
/// An empty path returns the root.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Top-level keys of a mapping, sorted. Non-mappings have none.
pub fn keys(root: &Value) -> Vec<String> {
    match root {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

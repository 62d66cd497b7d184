//! Deep merge used to combine normalized descriptors.

use serde_json::{Map, Value};

/// Merge `source` into `target`.
///
/// Objects merge key by key, arrays append, and any other value from
/// `source` replaces the one in `target`.
pub fn deep_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        match target.get_mut(key) {
            Some(existing) => merge_value(existing, incoming),
            None => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

fn merge_value(existing: &mut Value, incoming: &Value) {
    match (existing, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => deep_merge(existing, incoming),
        (Value::Array(existing), Value::Array(incoming)) => {
            existing.extend(incoming.iter().cloned());
        }
        (existing, incoming) => *existing = incoming.clone(),
    }
}

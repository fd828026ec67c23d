//! Merge policies for folding documents together

use serde_json::{Map, Value};

/// Deep-merge `incoming` into `target`.
///
/// Mappings present on both sides are merged key by key. Every other
/// combination (sequences, scalars, type mismatches, keys missing from
/// `target`) replaces the target value wholesale. Sequences are never
/// merged element-wise.
pub(crate) fn deep_merge(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match value {
            Value::Object(incoming_map) => {
                if let Some(Value::Object(existing)) = target.get_mut(&key) {
                    deep_merge(existing, incoming_map);
                    continue;
                }
                target.insert(key, Value::Object(incoming_map));
            }
            other => {
                target.insert(key, other);
            }
        }
    }
}

/// Shallow merge: every top-level key of `incoming` replaces the key in `target`.
pub(crate) fn shallow_merge(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        target.insert(key, value);
    }
}

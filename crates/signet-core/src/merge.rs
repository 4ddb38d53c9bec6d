//! Deep merge for free-form documentation metadata.

use serde_json::{Map, Value};

/// Merges `more` into `target`.
///
/// Arrays already present are extended (a non-array incoming value is
/// appended as one item), objects merge recursively, and anything else is
/// overwritten.
///
/// ```rust
/// use serde_json::json;
/// use signet_core::merge_docs;
///
/// let mut docs = json!({"tags": ["a"], "x-meta": {"owner": "ops"}, "summary": "old"});
/// let more = json!({"tags": ["b"], "x-meta": {"tier": 1}, "summary": "new"});
///
/// merge_docs(docs.as_object_mut().unwrap(), more.as_object().unwrap().clone());
/// assert_eq!(
///     docs,
///     json!({"tags": ["a", "b"], "x-meta": {"owner": "ops", "tier": 1}, "summary": "new"})
/// );
/// ```
pub fn merge_docs(target: &mut Map<String, Value>, more: Map<String, Value>) {
    for (key, value) in more {
        match (target.get_mut(&key), value) {
            (Some(Value::Array(existing)), Value::Array(items)) => existing.extend(items),
            (Some(Value::Array(existing)), item) => existing.push(item),
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_docs(existing, nested),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merged(base: Value, more: Value) -> Value {
        let mut base = base;
        if let (Some(target), Value::Object(more)) = (base.as_object_mut(), more) {
            merge_docs(target, more);
        }
        base
    }

    #[test]
    fn test_scalar_overwrites() {
        assert_eq!(merged(json!({"a": 1}), json!({"a": 2})), json!({"a": 2}));
    }

    #[test]
    fn test_sequence_appends_scalar() {
        assert_eq!(merged(json!({"tags": ["a"]}), json!({"tags": "b"})), json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn test_mapping_recurses_deeply() {
        let result = merged(
            json!({"x": {"y": {"z": [1]}}}),
            json!({"x": {"y": {"z": [2], "w": true}}}),
        );
        assert_eq!(result, json!({"x": {"y": {"z": [1, 2], "w": true}}}));
    }

    #[test]
    fn test_new_keys_inserted() {
        assert_eq!(merged(json!({}), json!({"tags": ["t"]})), json!({"tags": ["t"]}));
    }
}

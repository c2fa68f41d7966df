//! Deep merge of settings layers.
//!
//! - Objects on both sides: merged key by key (recursive)
//! - Anything else: the override replaces the base value wholesale
//!   (arrays are never concatenated, shapes are never coerced)
//!
//! Neither input is modified. Keys keep the position of their first
//! appearance; keys new in the override are appended.

use serde_json::{Map, Value};

/// Merge `overlay` on top of `base`, returning a new map.
pub fn deep_merge(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
) -> Map<String, Value> {
    let mut result = base.clone();
    for (key, overlay_value) in overlay {
        let merged = match (result.get(key), overlay_value) {
            (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
                Value::Object(deep_merge(base_map, overlay_map))
            }
            _ => overlay_value.clone(),
        };
        // `insert` on an existing key keeps its position
        result.insert(key.clone(), merged);
    }
    result
}

/// Fold layers left to right starting from an empty map.
pub fn merge_all<'a, I>(layers: I) -> Map<String, Value>
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    layers
        .into_iter()
        .fold(Map::new(), |acc, layer| deep_merge(&acc, layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_scalar_override() {
        let base = obj(json!({"editor.fontSize": 14}));
        let overlay = obj(json!({"editor.fontSize": 16}));
        let result = deep_merge(&base, &overlay);
        assert_eq!(result["editor.fontSize"], 16);
    }

    #[test]
    fn test_nested_objects_merge() {
        let base = obj(json!({"[python]": {"editor.tabSize": 4, "editor.rulers": [80]}}));
        let overlay = obj(json!({"[python]": {"editor.tabSize": 2}}));

        let result = deep_merge(&base, &overlay);

        assert_eq!(
            Value::Object(result),
            json!({"[python]": {"editor.tabSize": 2, "editor.rulers": [80]}})
        );
    }

    #[test]
    fn test_arrays_replace() {
        let base = obj(json!({"files.exclude.list": ["a", "b", "c"]}));
        let overlay = obj(json!({"files.exclude.list": ["x"]}));
        let result = deep_merge(&base, &overlay);
        assert_eq!(result["files.exclude.list"], json!(["x"]));
    }

    #[test]
    fn test_object_over_scalar_replaces() {
        let base = obj(json!({"a": 1}));
        let overlay = obj(json!({"a": {"nested": true}}));
        assert_eq!(deep_merge(&base, &overlay)["a"], json!({"nested": true}));

        let base = obj(json!({"a": [1, 2]}));
        assert_eq!(deep_merge(&base, &overlay)["a"], json!({"nested": true}));
    }

    #[test]
    fn test_scalar_over_object_replaces() {
        let base = obj(json!({"a": {"nested": true}}));
        let overlay = obj(json!({"a": null}));
        assert!(deep_merge(&base, &overlay)["a"].is_null());
    }

    #[test]
    fn test_inputs_not_mutated() {
        let base = obj(json!({"a": {"x": 1}}));
        let overlay = obj(json!({"a": {"y": 2}}));
        let base_before = base.clone();
        let overlay_before = overlay.clone();

        let _ = deep_merge(&base, &overlay);

        assert_eq!(base, base_before);
        assert_eq!(overlay, overlay_before);
    }

    #[test]
    fn test_identity_laws() {
        let m = obj(json!({"a": 1, "b": {"c": [1, 2]}}));
        let empty = Map::new();
        assert_eq!(deep_merge(&empty, &m), m);
        assert_eq!(deep_merge(&m, &empty), m);
    }

    #[test]
    fn test_idempotent() {
        let m = obj(json!({"a": 1, "b": {"c": {"d": "e"}}}));
        assert_eq!(deep_merge(&m, &m), m);
    }

    #[test]
    fn test_key_order_stable() {
        let base = obj(json!({"z": 1, "a": 2}));
        let overlay = obj(json!({"a": 3, "m": 4}));
        let keys: Vec<_> = deep_merge(&base, &overlay).keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_merge_all_folds_in_order() {
        let layers = [
            obj(json!({"a": 1, "b": 1})),
            obj(json!({"b": 2})),
            obj(json!({"b": 3, "c": 3})),
        ];
        let result = merge_all(layers.iter());
        assert_eq!(Value::Object(result), json!({"a": 1, "b": 3, "c": 3}));
    }

    #[test]
    fn test_merge_all_empty() {
        assert!(merge_all(std::iter::empty()).is_empty());
    }
}

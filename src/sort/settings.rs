//! Canonical ordering for `settings.json`.
//!
//! Only top-level keys are sorted, by byte order (case-sensitive ASCII
//! order). Nested objects keep their layout.

use serde_json::{Map, Value};

/// Sort the top-level keys of a settings object.
pub fn sort_settings(settings: Map<String, Value>) -> Map<String, Value> {
    let mut entries: Vec<(String, Value)> = settings.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonc;
    use serde_json::json;

    fn keys(map: &Map<String, Value>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_sorted_with_comments_and_duplicates() {
        let input = r#"// User settings
{
    /* block comment */
    "z.last": 1,
    "a.first": false,
    "m.middle": "x",
    "a.first": true // comment
}
"#;
        let parsed = jsonc::parse_object(input).unwrap();
        let sorted = sort_settings(parsed);

        assert_eq!(keys(&sorted), vec!["a.first", "m.middle", "z.last"]);
        assert_eq!(sorted["a.first"], true);
    }

    #[test]
    fn test_case_sensitive_order() {
        let map = match json!({"b": 1, "B": 2, "a": 3, "[python]": 4}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        assert_eq!(keys(&sort_settings(map)), vec!["B", "[python]", "a", "b"]);
    }

    #[test]
    fn test_nested_objects_untouched() {
        let map = match json!({"z": {"b": 1, "a": 2}, "a": 0}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let sorted = sort_settings(map);
        let nested: Vec<_> = sorted["z"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(nested, vec!["b", "a"]);
    }

    #[test]
    fn test_idempotent() {
        let map = match json!({"c": 1, "a": 2, "b": 3}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let once = sort_settings(map);
        assert_eq!(keys(&sort_settings(once.clone())), keys(&once));
    }
}

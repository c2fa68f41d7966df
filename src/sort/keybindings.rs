//! Canonical ordering for `keybindings.json` entries.
//!
//! Entries are ordered by, in turn:
//! 1. `key`, case-insensitive
//! 2. entries without a `when` clause before entries with one
//! 3. number of `&&` / `||` operators in `when`
//! 4. length of `when`
//! 5. `when`, case-insensitive
//! 6. `command`, case-insensitive
//!
//! The sort is stable and keeps duplicates. Entries that are not objects
//! sort as if every field were empty.

use serde_json::Value;

/// Sort tuple for one keybinding entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    key: String,
    has_when: bool,
    operators: usize,
    when_len: usize,
    when: String,
    command: String,
}

/// Number of logical operators (`&&` and `||`) in a when-clause.
pub fn count_operators(when: &str) -> usize {
    when.matches("&&").count() + when.matches("||").count()
}

/// Text of a field, treating absent, null and empty string as missing.
fn field_text(entry: &serde_json::Map<String, Value>, name: &str) -> Option<String> {
    match entry.get(name)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Build the sort tuple for an entry.
pub fn sort_key(entry: &Value) -> SortKey {
    let Value::Object(map) = entry else {
        return SortKey::default();
    };

    let key = field_text(map, "key").unwrap_or_default();
    let when = field_text(map, "when");
    let command = field_text(map, "command").unwrap_or_default();
    let has_when = when.is_some();
    let when = when.unwrap_or_default();

    SortKey {
        key: key.to_lowercase(),
        has_when,
        operators: count_operators(&when),
        when_len: when.chars().count(),
        when: when.to_lowercase(),
        command: command.to_lowercase(),
    }
}

/// Sort keybinding entries into canonical order.
pub fn sort_keybindings(mut entries: Vec<Value>) -> Vec<Value> {
    // sort_by_cached_key is stable
    entries.sort_by_cached_key(sort_key);
    entries
}

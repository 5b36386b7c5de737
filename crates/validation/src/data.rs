//! Input data access.

use serde_json::Value;

/// The full input under validation: top-level attribute name → value.
pub type Dataset = serde_json::Map<String, Value>;

/// Looks up `path` in `data`, following `.`-separated segments into nested
/// objects and (numeric segments) arrays.
pub fn lookup<'a>(data: &'a Dataset, path: &str) -> Option<&'a Value> {
    if let Some(value) = data.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Whether a value counts as "not provided" for non-implicit rules.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// String form of a value as used in message placeholders.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> Dataset {
        match json!({
            "name": "Ada",
            "address": { "city": "London", "lines": ["1 Main St", "Flat 2"] },
            "dotted.key": true,
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn lookup_follows_paths() {
        let data = data();
        assert_eq!(lookup(&data, "name"), Some(&json!("Ada")));
        assert_eq!(lookup(&data, "address.city"), Some(&json!("London")));
        assert_eq!(lookup(&data, "address.lines.1"), Some(&json!("Flat 2")));
        assert_eq!(lookup(&data, "dotted.key"), Some(&json!(true)));
        assert_eq!(lookup(&data, "address.zip"), None);
        assert_eq!(lookup(&data, "name.first"), None);
    }

    #[test]
    fn emptiness() {
        assert!(is_empty(&json!(null)));
        assert!(is_empty(&json!("  ")));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(false)));
    }

    #[test]
    fn display_forms() {
        assert_eq!(display(&json!("x")), "x");
        assert_eq!(display(&json!(3)), "3");
        assert_eq!(display(&json!(["a", 1])), "a, 1");
        assert_eq!(display(&json!(null)), "");
    }
}

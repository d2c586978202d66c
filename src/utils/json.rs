// src/utils/json.rs

//! Tolerant accessors for loosely-typed upstream JSON.
//!
//! None of these panic or fail: a missing key, a `null`, or a value of the
//! wrong type all read as absent.

use serde_json::Value;

/// Object-valued field, if present.
pub fn object<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}

/// First element of an array field, or the field itself when it is a
/// single object. Empty arrays read as absent.
pub fn first<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value.get(key)? {
        Value::Array(items) => items.first().filter(|v| v.is_object()),
        v @ Value::Object(_) => Some(v),
        _ => None,
    }
}

/// String field. Numbers and booleans are stringified; blanks read as absent.
pub fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Field value exactly as given; only a missing key or `null` reads as absent.
pub fn raw(value: &Value, key: &str) -> Option<Value> {
    value.get(key).filter(|v| !v.is_null()).cloned()
}

/// String field or an empty string.
pub fn text_or_empty(value: &Value, key: &str) -> String {
    text(value, key).unwrap_or_default()
}

/// Numeric field, also accepting numeric strings such as `"43.65"`.
pub fn number(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_accepts_array_or_object() {
        let v = json!({"a": [{"x": 1}, {"x": 2}], "b": {"x": 3}, "c": [], "d": "str"});
        assert_eq!(first(&v, "a"), Some(&json!({"x": 1})));
        assert_eq!(first(&v, "b"), Some(&json!({"x": 3})));
        assert_eq!(first(&v, "c"), None);
        assert_eq!(first(&v, "d"), None);
        assert_eq!(first(&v, "missing"), None);
    }

    #[test]
    fn text_skips_blanks_and_nulls() {
        let v = json!({"a": "hi", "b": "  ", "c": null, "d": 416});
        assert_eq!(text(&v, "a").as_deref(), Some("hi"));
        assert_eq!(text(&v, "b"), None);
        assert_eq!(text(&v, "c"), None);
        assert_eq!(text(&v, "d").as_deref(), Some("416"));
    }

    #[test]
    fn raw_keeps_type_and_blanks() {
        let v = json!({"a": " ", "b": 12, "c": null});
        assert_eq!(raw(&v, "a"), Some(json!(" ")));
        assert_eq!(raw(&v, "b"), Some(json!(12)));
        assert_eq!(raw(&v, "c"), None);
        assert_eq!(raw(&v, "missing"), None);
    }

    #[test]
    fn number_parses_strings() {
        let v = json!({"lat": "43.65", "lng": -79.38, "bad": "north"});
        assert_eq!(number(&v, "lat"), Some(43.65));
        assert_eq!(number(&v, "lng"), Some(-79.38));
        assert_eq!(number(&v, "bad"), None);
    }
}

//! Permissive decoding of persisted metafield values.
//!
//! Stored values may arrive as a JSON object, a JSON-encoded string, `null`,
//! or something nobody intended. Every reader funnels through
//! [`parse_or_fallback`] so a corrupted record degrades to an empty object
//! instead of an error.

use serde_json::{Map, Value};
use tracing::debug;

pub type RawObject = Map<String, Value>;

/// Coerces `raw` into a JSON object and hands it to `convert`.
///
/// Non-object input (including unparsable strings) is converted as an empty
/// object, so `convert` decides what the typed default looks like.
pub fn parse_or_fallback<T>(raw: &Value, convert: impl FnOnce(RawObject) -> T) -> T {
    convert(object_or_empty(raw))
}

/// String-input counterpart of [`parse_or_fallback`].
pub fn parse_str_or_fallback<T>(raw: &str, convert: impl FnOnce(RawObject) -> T) -> T {
    convert(parse_object_str(raw))
}

#[must_use]
pub fn object_or_empty(raw: &Value) -> RawObject {
    match raw {
        Value::Object(object) => object.clone(),
        Value::String(text) => parse_object_str(text),
        Value::Null => RawObject::new(),
        other => {
            debug!(kind = value_kind(other), "ignoring non-object persisted value");
            RawObject::new()
        }
    }
}

#[must_use]
pub fn parse_object_str(text: &str) -> RawObject {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return RawObject::new();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            debug!(kind = value_kind(&other), "persisted json is not an object");
            RawObject::new()
        }
        Err(err) => {
            debug!(error = %err, "persisted json failed to parse; using empty object");
            RawObject::new()
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_are_parsed_as_json_objects() {
        let object = object_or_empty(&json!("{\"a\": 1}"));
        assert_eq!(object.get("a"), Some(&json!(1)));
    }

    #[test]
    fn malformed_and_non_object_input_becomes_empty() {
        assert!(object_or_empty(&json!("{not json")).is_empty());
        assert!(object_or_empty(&json!("[1,2]")).is_empty());
        assert!(object_or_empty(&json!(42)).is_empty());
        assert!(object_or_empty(&Value::Null).is_empty());
        assert!(parse_object_str("   ").is_empty());
    }

    #[test]
    fn fallback_converter_sees_the_empty_object() {
        let len = parse_str_or_fallback("nope", |object| object.len());
        assert_eq!(len, 0);
    }
}

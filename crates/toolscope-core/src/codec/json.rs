//! Conversions between wire JSON and native values

use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::value::{NativeMap, NativeValue};

/// Errors from explicit parse calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Text is not well-formed JSON
    #[error("Invalid JSON: {0}")]
    Parse(String),

    /// Well-formed JSON of the wrong shape
    #[error("Expected JSON object, found {0}")]
    Type(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Encode a native value as JSON
///
/// Never fails: a float JSON cannot carry (NaN, infinities) is sent as its
/// string form.
pub fn encode(value: &NativeValue) -> Value {
    match value {
        NativeValue::Null => Value::Null,
        NativeValue::Bool(b) => Value::Bool(*b),
        NativeValue::Int(i) => Value::Number(Number::from(*i)),
        NativeValue::Float(x) => match Number::from_f64(*x) {
            Some(n) => Value::Number(n),
            None => Value::String(x.to_string()),
        },
        NativeValue::Str(s) => Value::String(s.clone()),
        NativeValue::List(items) => Value::Array(items.iter().map(encode).collect()),
        NativeValue::Map(map) => encode_map(map),
    }
}

/// Encode a mapping as a JSON object, keys in insertion order
pub fn encode_map(map: &NativeMap) -> Value {
    let object: Map<String, Value> = map
        .iter()
        .map(|(key, value)| (key.to_string(), encode(value)))
        .collect();
    Value::Object(object)
}

/// Decode JSON into a native value
///
/// Integral numbers that fit in `i64` become `Int`, every other number
/// becomes `Float`.
pub fn decode(value: &Value) -> NativeValue {
    match value {
        Value::Null => NativeValue::Null,
        Value::Bool(b) => NativeValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => NativeValue::Int(i),
            None => NativeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => NativeValue::Str(s.clone()),
        Value::Array(items) => NativeValue::List(items.iter().map(decode).collect()),
        Value::Object(object) => NativeValue::Map(decode_object(object)),
    }
}

fn decode_object(object: &Map<String, Value>) -> NativeMap {
    let mut map = NativeMap::with_capacity(object.len());
    for (key, value) in object {
        map.insert(key.clone(), decode(value));
    }
    map
}

/// Parse JSON text
pub fn parse_text(text: &str) -> CodecResult<Value> {
    serde_json::from_str(text).map_err(|e| CodecError::Parse(e.to_string()))
}

/// Parse JSON text that must hold an object, returning its decoded mapping
pub fn parse_object_text(text: &str) -> CodecResult<NativeMap> {
    match parse_text(text)? {
        Value::Object(object) => Ok(decode_object(&object)),
        other => Err(CodecError::Type(json_kind(&other).to_string())),
    }
}

/// Parse the free-text arguments a user typed for a tool call
///
/// Blank input means "no arguments".
pub fn parse_arguments_text(text: &str) -> CodecResult<NativeMap> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(NativeMap::new());
    }
    parse_object_text(trimmed)
}

/// Human-readable form of a server-reported error value
///
/// A bare string is shown as-is, anything else as compact JSON.
pub fn render_error_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Name of a JSON value's kind, for error messages
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
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

    fn sample() -> NativeValue {
        let mut inner = NativeMap::new();
        inner.insert("depth", 3);
        inner.insert("ratio", 0.25);
        inner.insert("tags", vec!["a", "b"]);

        let mut map = NativeMap::new();
        map.insert("path", "/workspace/src");
        map.insert("recursive", true);
        map.insert("limit", NativeValue::Null);
        map.insert("options", inner);
        map.insert("empty", NativeValue::List(vec![]));
        NativeValue::Map(map)
    }

    #[test]
    fn test_decode_encode_is_identity() {
        let value = sample();
        assert_eq!(decode(&encode(&value)), value);

        for scalar in [
            NativeValue::Null,
            NativeValue::Bool(false),
            NativeValue::Int(i64::MIN),
            NativeValue::Int(42),
            NativeValue::Float(-1.5),
            NativeValue::Str(String::new()),
        ] {
            assert_eq!(decode(&encode(&scalar)), scalar);
        }
    }

    #[test]
    fn test_encode_preserves_key_order() {
        let encoded = encode(&sample());
        let keys: Vec<&String> = encoded.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["path", "recursive", "limit", "options", "empty"]);
    }

    #[test]
    fn test_encode_non_finite_float_falls_back_to_string() {
        assert_eq!(encode(&NativeValue::Float(f64::NAN)), json!("NaN"));
        assert_eq!(encode(&NativeValue::Float(f64::INFINITY)), json!("inf"));
    }

    #[test]
    fn test_decode_number_narrowing() {
        assert_eq!(decode(&json!(7)), NativeValue::Int(7));
        assert_eq!(decode(&json!(-7)), NativeValue::Int(-7));
        assert_eq!(decode(&json!(7.5)), NativeValue::Float(7.5));
        assert_eq!(decode(&json!(1.0)), NativeValue::Float(1.0));
        // Beyond i64 falls back to floating point
        assert_eq!(decode(&json!(u64::MAX)), NativeValue::Float(u64::MAX as f64));
        assert_eq!(decode(&json!(true)), NativeValue::Bool(true));
        assert_eq!(decode(&json!("12")), NativeValue::Str("12".into()));
    }

    #[test]
    fn test_parse_object_text() {
        assert!(parse_object_text("{}").unwrap().is_empty());

        let map = parse_object_text(r#"{"b": 1, "a": [null, "x"]}"#).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(
            map.get("a"),
            Some(&NativeValue::List(vec![NativeValue::Null, NativeValue::Str("x".into())]))
        );
    }

    #[test]
    fn test_parse_large_object_keeps_order() {
        let count = 50_000;
        let fields: Vec<String> = (0..count).rev().map(|i| format!("\"k{}\": {}", i, i)).collect();
        let text = format!("{{{}}}", fields.join(", "));

        let map = parse_object_text(&text).unwrap();
        assert_eq!(map.len(), count);
        let expected: Vec<String> = (0..count).rev().map(|i| format!("k{}", i)).collect();
        assert!(map.keys().eq(expected.iter().map(String::as_str)));
        assert_eq!(map.get("k0"), Some(&NativeValue::Int(0)));
        assert_eq!(map.get("k49999"), Some(&NativeValue::Int(49_999)));

        let wire = encode_map(&map);
        let wire_keys = wire.as_object().unwrap().keys().map(String::as_str);
        assert!(wire_keys.eq(expected.iter().map(String::as_str)));
    }

    #[test]
    fn test_parse_object_text_rejects_non_objects() {
        assert_eq!(parse_object_text("[]"), Err(CodecError::Type("array".into())));
        assert_eq!(parse_object_text("\"s\""), Err(CodecError::Type("string".into())));
        assert!(matches!(parse_object_text("{"), Err(CodecError::Parse(_))));
    }

    #[test]
    fn test_parse_text_errors() {
        assert!(parse_text("null").unwrap().is_null());
        assert!(matches!(parse_text("{'a': 1}"), Err(CodecError::Parse(_))));
        assert!(matches!(parse_text(""), Err(CodecError::Parse(_))));
    }

    #[test]
    fn test_parse_arguments_text() {
        assert!(parse_arguments_text("   \n").unwrap().is_empty());
        let map = parse_arguments_text("  {\"q\": \"rust\"}  ").unwrap();
        assert_eq!(map.get("q"), Some(&NativeValue::Str("rust".into())));
        assert!(parse_arguments_text("[1]").is_err());
    }

    #[test]
    fn test_render_error_value() {
        assert_eq!(render_error_value(&json!("boom")), "boom");
        assert_eq!(
            render_error_value(&json!({"code": -32601, "message": "Method not found"})),
            r#"{"code":-32601,"message":"Method not found"}"#
        );
        assert_eq!(render_error_value(&Value::Null), "null");
    }
}

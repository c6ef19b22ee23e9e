//! Canonical JSON form and content digest of request bodies
//!
//! Object keys are ordered by UTF-16 code units, the order a JavaScript
//! `Array.prototype.sort()` produces, and numbers are written the way
//! `JSON.stringify` writes them (RFC 8785), so a digest computed here matches
//! one computed by a browser or Node.js client for the same body.

use crate::{CreError, Result};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;

/// Maximum nesting depth accepted for a request body
pub const MAX_DEPTH: usize = 128;

/// Floats with an integral value below this magnitude become integers
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Recursively sort object keys, leaving array order intact
pub fn canonicalize(body: &Value) -> Result<Value> {
    canonicalize_at(body, 0)
}

fn canonicalize_at(value: &Value, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(CreError::malformed_input(format!(
            "body nests deeper than {} levels",
            MAX_DEPTH
        )));
    }

    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| compare_utf16(a, b));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, child) in entries {
                sorted.insert(key.clone(), canonicalize_at(child, depth + 1)?);
            }
            Ok(Value::Object(sorted))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| canonicalize_at(item, depth + 1))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Number(number) => Ok(Value::Number(normalize_number(number))),
        scalar => Ok(scalar.clone()),
    }
}

// `1.0` and `1` are the same JSON number; `-0.0` is written as `0`
fn normalize_number(number: &Number) -> Number {
    match number.as_f64() {
        Some(value)
            if number.is_f64() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER =>
        {
            Number::from(value as i64)
        }
        _ => number.clone(),
    }
}

fn compare_utf16(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Minimal (whitespace-free) JSON of the canonical form
pub fn canonical_json(body: &Value) -> Result<String> {
    let canonical = canonicalize(body)?;
    let bytes = serde_json_canonicalizer::to_vec(&canonical)
        .map_err(|e| CreError::malformed_input(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CreError::malformed_input(e.to_string()))
}

/// SHA-256 of the canonical JSON, as `0x`-prefixed lowercase hex
pub fn digest(body: &Value) -> Result<String> {
    let json = canonical_json(body)?;
    let hash = Sha256::digest(json.as_bytes());
    Ok(format!("0x{}", hex::encode(hash)))
}

/// Convert any serializable value into a request body tree
pub fn to_body<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| CreError::malformed_input(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_keys_sorted() {
        let body = json!({"z": {"b": 1, "a": [{"d": 1, "c": 2}]}, "a": null});
        assert_eq!(
            canonical_json(&body).unwrap(),
            r#"{"a":null,"z":{"a":[{"c":2,"d":1}],"b":1}}"#
        );
    }

    #[test]
    fn test_array_order_preserved() {
        let body = json!([3, 1, 2, {"b": true, "a": false}]);
        assert_eq!(
            canonical_json(&body).unwrap(),
            r#"[3,1,2,{"a":false,"b":true}]"#
        );
    }

    #[test]
    fn test_utf16_key_order() {
        // U+FF21 sorts after U+1F600 in UTF-16 (0xFF21 > 0xD83D) but before it by code point
        let body = json!({"\u{1F600}": 1, "\u{FF21}": 2});
        assert_eq!(
            canonical_json(&body).unwrap(),
            "{\"\u{1F600}\":1,\"\u{FF21}\":2}"
        );
    }

    #[test]
    fn test_numbers_written_as_javascript_does() {
        let body = json!({"x": 1.0, "y": 1e21, "z": -0.0, "w": 0.5, "v": 1e-7});
        assert_eq!(
            canonical_json(&body).unwrap(),
            r#"{"v":1e-7,"w":0.5,"x":1,"y":1e+21,"z":0}"#
        );
    }

    #[test]
    fn test_integral_float_digest_matches_integer() {
        assert_eq!(
            digest(&json!({"x": 1.0})).unwrap(),
            digest(&json!({"x": 1})).unwrap()
        );
        assert_eq!(
            digest(&json!({"x": -0.0})).unwrap(),
            digest(&json!({"x": 0})).unwrap()
        );
        assert_eq!(canonicalize(&json!(2.0)).unwrap(), json!(2));
    }

    #[test]
    fn test_excessive_depth_rejected() {
        let mut body = json!(0);
        for _ in 0..=MAX_DEPTH + 1 {
            body = json!([body]);
        }
        assert!(matches!(
            canonicalize(&body),
            Err(CreError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_non_string_map_keys_rejected() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], "value");
        assert!(matches!(to_body(&map), Err(CreError::MalformedInput(_))));
    }
}

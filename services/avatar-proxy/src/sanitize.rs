//! JSON pass-through filtering and log-safe previews.

use serde_json::{Map, Value};

/// Deepest nesting level forwarded upstream or rendered in a preview.
pub const MAX_DEPTH: usize = 6;

/// Strings at or below this length are never abbreviated in previews.
const PREVIEW_INLINE_LIMIT: usize = 64;

/// Whether `value` looks like a bare base64 payload.
pub fn is_base64(value: &str) -> bool {
    !value.trim().is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

/// Approximate decoded size of a base64 string.
pub fn bytes_from_base64(value: &str) -> usize {
    value.len() * 3 / 4
}

/// Copy a client-supplied value for forwarding, dropping anything nested deeper than
/// [`MAX_DEPTH`].
pub fn sanitize_json(value: &Value) -> Option<Value> {
    sanitize_at(value, 0)
}

fn sanitize_at(value: &Value, depth: usize) -> Option<Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| sanitize_at(item, depth + 1))
                .collect(),
        )),
        Value::Object(fields) => Some(Value::Object(
            fields
                .iter()
                .filter_map(|(key, nested)| {
                    sanitize_at(nested, depth + 1).map(|clean| (key.clone(), clean))
                })
                .collect::<Map<_, _>>(),
        )),
        scalar => Some(scalar.clone()),
    }
}

/// Sanitised value, kept only when it is a JSON object.
pub fn sanitize_object(value: Option<&Value>) -> Option<Map<String, Value>> {
    match sanitize_json(value?)? {
        Value::Object(fields) => Some(fields),
        _ => None,
    }
}

/// Copy of `value` fit for logs and error metadata: long data URIs and base64 blobs are
/// replaced by their length.
pub fn preview(value: &Value) -> Value {
    preview_at(value, 0)
}

fn preview_at(value: &Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::String("[…]".to_string());
    }
    match value {
        Value::String(text) if text.len() > PREVIEW_INLINE_LIMIT && text.starts_with("data:") => {
            Value::String(format!("<data-uri:{} chars>", text.len()))
        }
        Value::String(text) if text.len() > PREVIEW_INLINE_LIMIT && is_base64(text) => {
            Value::String(format!("<base64:{} chars>", text.len()))
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| preview_at(item, depth + 1))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, nested)| (key.clone(), preview_at(nested, depth + 1)))
                .collect(),
        ),
        other => other.clone(),
    }
}

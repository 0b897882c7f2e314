//! Key-case conversion between the server and client naming conventions.
//!
//! The platform API speaks snake_case; the administrative front-ends consume
//! camelCase. Conversion is applied to whole JSON trees, rewriting object
//! keys recursively while leaving every value (and the input itself)
//! untouched.
//!
//! The forward rule collapses `_` followed by a lowercase ASCII letter into
//! that letter uppercased; underscores before digits, uppercase letters, or
//! at the end of a key pass through. The inverse expands each uppercase ASCII
//! letter into `_` plus its lowercase form, which makes it an exact left
//! inverse for any key the forward rule can produce.

use serde_json::{Map, Value};

/// Convert a snake_case key to camelCase.
pub fn to_camel_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '_' {
            match chars.peek() {
                Some(&next) if next.is_ascii_lowercase() => {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                }
                _ => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }

    out
}

/// Convert a camelCase key to snake_case.
pub fn to_snake_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);

    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// Rewrite every object key in `value` from snake_case to camelCase.
///
/// Arrays and nested objects are handled recursively; scalars and `null`
/// pass through. Returns a new tree, the input is not mutated.
pub fn snake_to_camel(value: &Value) -> Value {
    convert(value, &to_camel_key)
}

/// Rewrite every object key in `value` from camelCase to snake_case.
pub fn camel_to_snake(value: &Value) -> Value {
    convert(value, &to_snake_key)
}

fn convert(value: &Value, rewrite: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let mut converted = Map::with_capacity(map.len());
            for (key, inner) in map {
                converted.insert(rewrite(key), convert(inner, rewrite));
            }
            Value::Object(converted)
        }
        Value::Array(items) => Value::Array(items.iter().map(|item| convert(item, rewrite)).collect()),
        scalar => scalar.clone(),
    }
}

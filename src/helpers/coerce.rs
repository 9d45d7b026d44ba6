//! Coercion helpers for loosely-typed JSON fields

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a field that may be `null`, falling back to the type's default
///
/// Ghost writes `null` for unset strings (`meta_description`, `mobiledoc`, ...)
/// where the converter only cares about "empty or not".
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Coerce a page flag into a bool
///
/// Accepts JSON booleans, the string spellings understood by Go's
/// `strconv.ParseBool`, and numbers (non-zero is true). Anything else,
/// including `null`, is false.
pub fn parse_bool(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::String(s) => parse_bool_str(s).unwrap_or(false),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

fn parse_bool_str(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

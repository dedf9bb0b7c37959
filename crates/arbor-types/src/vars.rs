//! Persisted encoding of module-variable values
//!
//! Stored values are strings. Historically the literal strings "0" and "1"
//! were written without serialization (boolean settings written row-by-row by
//! upgrade scripts), so the codec must keep treating those two raw forms as
//! plain string values in both directions.

use serde_json::Value;
use tracing::warn;

/// Encodes a variable value into its persisted string form.
///
/// The literal strings "0" and "1" are stored raw; everything else goes
/// through JSON.
pub fn encode_var(value: &Value) -> String {
    if let Value::String(s) = value {
        if s == "0" || s == "1" {
            return s.clone();
        }
    }
    // Value serialization to a string cannot fail for serde_json::Value.
    value.to_string()
}

/// Decodes a persisted string back into a variable value.
///
/// Undecodable text degrades to a raw string value instead of failing the
/// read; the row stays usable and the condition is logged.
pub fn decode_var(module: &str, name: &str, raw: &str) -> Value {
    if raw == "0" || raw == "1" {
        return Value::String(raw.to_owned());
    }
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(module, name, %err, "undecodable module variable, keeping raw text");
            Value::String(raw.to_owned())
        }
    }
}

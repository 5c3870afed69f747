//! Lenient normalization of loosely-typed option values
//!
//! Numeric options that are missing, non-positive, fractional or of the wrong
//! type fall back to their defaults instead of failing the load.

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Positive integer from a JSON/YAML value; integral floats such as `25.0` count.
pub fn positive_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                return (i > 0).then_some(i);
            }
            let f = n.as_f64()?;
            (f.is_finite() && f > 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64)
                .then_some(f as u64)
        }
        _ => None,
    }
}

/// Positive integer from an environment string
pub fn positive_integer_str(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    match trimmed.parse::<u64>() {
        Ok(i) => (i > 0).then_some(i),
        Err(_) => trimmed
            .parse::<f64>()
            .ok()
            .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
            .and_then(|v| positive_integer(&v)),
    }
}

/// `value` as a positive integer, or `default` when absent or invalid
pub fn positive_or_default(field: &str, value: Option<&Value>, default: u64) -> u64 {
    match value {
        None | Some(Value::Null) => default,
        Some(v) => positive_integer(v).unwrap_or_else(|| {
            debug!(field, value = %v, default, "Invalid option, using default");
            default
        }),
    }
}

/// Header map from a JSON/YAML value. Non-maps yield an empty map; scalar
/// values are stringified and anything else is skipped.
pub fn header_map(value: Option<&Value>) -> HashMap<String, String> {
    let Some(Value::Object(map)) = value else {
        if let Some(v) = value.filter(|v| !v.is_null()) {
            debug!(value = %v, "Headers option is not a map, ignoring");
        }
        return HashMap::new();
    };

    map.iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    debug!(header = %name, "Skipping non-scalar header value");
                    return None;
                }
            };
            Some((name.clone(), value))
        })
        .collect()
}

/// Parse `name=value,name=value` header lists used by environment variables
pub fn header_list(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

//! Lenient number handling for form input and stored data.
//!
//! Form fields and older saved data are loosely typed. Anything that does not
//! read as a finite number is treated as zero.

use serde_json::Value;

/// Replaces NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Reads a form field as a number. Blank and non-numeric input yields zero.
pub fn coerce_input(raw: &str) -> f64 {
    parse_finite(raw).unwrap_or(0.0)
}

/// Reads a stored JSON value as a number the way loosely typed data expects:
/// numbers as-is, numeric strings parsed, booleans as 1/0, everything else zero.
pub fn coerce_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map(finite_or_zero).unwrap_or(0.0),
        Value::String(s) => coerce_input(s),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

/// Strict parse used where invalid input must be rejected rather than zeroed.
pub fn parse_finite(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_coercion_zeroes_garbage() {
        assert_eq!(coerce_input(""), 0.0);
        assert_eq!(coerce_input("  "), 0.0);
        assert_eq!(coerce_input("abc"), 0.0);
        assert_eq!(coerce_input("NaN"), 0.0);
        assert_eq!(coerce_input("inf"), 0.0);
        assert_eq!(coerce_input(" 12.5 "), 12.5);
        assert_eq!(coerce_input("-3"), -3.0);
    }

    #[test]
    fn value_coercion_follows_loose_typing() {
        assert_eq!(coerce_value(&json!(4)), 4.0);
        assert_eq!(coerce_value(&json!("7.25")), 7.25);
        assert_eq!(coerce_value(&json!(true)), 1.0);
        assert_eq!(coerce_value(&json!(false)), 0.0);
        assert_eq!(coerce_value(&json!(null)), 0.0);
        assert_eq!(coerce_value(&json!({"a": 1})), 0.0);
    }
}

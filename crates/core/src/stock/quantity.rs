//! Coercion of client-supplied quantities.
//!
//! Clients send quantities as JSON numbers or as strings. `null` and blank
//! strings mean "leave this branch alone". Anything that is not a whole,
//! non-negative number is rejected instead of being stored as garbage.

use serde_json::Value;

use super::StockError;

/// Coerce a single quantity.
///
/// Returns `Ok(None)` when the value means "no change".
///
/// # Errors
///
/// Returns `StockError::NotNumeric`, `StockError::Fractional`,
/// `StockError::Negative` or `StockError::OutOfRange` naming `branch`.
pub fn coerce_quantity(branch: &str, value: &Value) -> Result<Option<u64>, StockError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_text(branch, s.trim()).map(Some),
        Value::Number(n) => {
            if let Some(q) = n.as_u64() {
                return Ok(Some(q));
            }
            if n.as_i64().is_some() {
                return Err(StockError::Negative {
                    branch: branch.to_string(),
                    value: n.to_string(),
                });
            }
            from_float(branch, n.as_f64().unwrap_or(f64::NAN), &n.to_string()).map(Some)
        }
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(StockError::NotNumeric {
            branch: branch.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_text(branch: &str, text: &str) -> Result<u64, StockError> {
    if let Ok(q) = text.parse::<u64>() {
        return Ok(q);
    }
    if let Ok(q) = text.parse::<i64>() {
        return Err(StockError::Negative {
            branch: branch.to_string(),
            value: q.to_string(),
        });
    }
    match text.parse::<f64>() {
        Ok(f) => from_float(branch, f, text),
        Err(_) => Err(StockError::NotNumeric {
            branch: branch.to_string(),
            value: text.to_string(),
        }),
    }
}

/// Largest integer a float carries exactly (2^53 - 1).
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_991.0;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above the cast
fn from_float(branch: &str, f: f64, raw: &str) -> Result<u64, StockError> {
    if !f.is_finite() {
        return Err(StockError::NotNumeric {
            branch: branch.to_string(),
            value: raw.to_string(),
        });
    }
    if f < 0.0 {
        return Err(StockError::Negative {
            branch: branch.to_string(),
            value: raw.to_string(),
        });
    }
    if f.fract() != 0.0 {
        return Err(StockError::Fractional {
            branch: branch.to_string(),
            value: raw.to_string(),
        });
    }
    if f > MAX_EXACT_FLOAT {
        return Err(StockError::OutOfRange {
            branch: branch.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(f as u64)
}

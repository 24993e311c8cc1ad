//! Validators and type adjustments for statistical functions

use super::numeric::parse_numeric_text;
use super::CalcResult;
use crate::compat::CompatibilityMode;
use crate::value::Value;
use sheetcalc_core::ErrorCode;

/// Numbers and numeric text only
pub fn validate_float(value: &Value) -> CalcResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(s) => parse_numeric_text(s).ok_or(ErrorCode::Value),
        Value::Error(e) => Err(*e),
        _ => Err(ErrorCode::Value),
    }
}

/// A probability in `[0, 1]`; outside fails `#NUM!`
pub fn validate_probability(value: &Value) -> CalcResult<f64> {
    let p = validate_float(value)?;
    if !(0.0..=1.0).contains(&p) {
        return Err(ErrorCode::Num);
    }
    Ok(p)
}

/// Adjustment for the `A` aggregates: booleans are 0/1, text is 0
pub fn datatype_adjustment_allow_strings(value: &Value) -> Value {
    match value {
        Value::Boolean(b) => Value::Number(f64::from(u8::from(*b))),
        Value::Text(_) => Value::Number(0.0),
        other => other.clone(),
    }
}

/// Booleans count as 0/1 only in OpenOffice mode
pub fn datatype_adjustment_booleans(value: &Value, mode: CompatibilityMode) -> Value {
    match value {
        Value::Boolean(b) if mode == CompatibilityMode::OpenOffice => {
            Value::Number(f64::from(u8::from(*b)))
        }
        other => other.clone(),
    }
}

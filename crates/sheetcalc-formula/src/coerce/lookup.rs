//! Validators for lookup and reference arguments (INDEX, CHOOSE, ...)

use super::numeric::parse_numeric_text;
use super::CalcResult;
use crate::value::Value;
use sheetcalc_core::ErrorCode;

/// Coerce to an integer, flooring toward negative infinity
///
/// Unlike the numeric validators, blanks and booleans are rejected, and an
/// incoming error value is returned as-is instead of becoming `#VALUE!`.
pub fn validate_int(value: &Value) -> CalcResult<i64> {
    let n = match value {
        Value::Number(n) => *n,
        Value::Text(s) => parse_numeric_text(s).ok_or(ErrorCode::Value)?,
        Value::Error(e) => return Err(*e),
        _ => return Err(ErrorCode::Value),
    };
    Ok(n.floor() as i64)
}

/// Integer that must be `>= 1`, or `>= 0` when `allow_zero` is set
pub fn validate_positive_int(value: &Value, allow_zero: bool) -> CalcResult<i64> {
    let n = validate_int(value)?;
    if n < 0 || (n == 0 && !allow_zero) {
        return Err(ErrorCode::Value);
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_int_keeps_incoming_error() {
        assert_eq!(validate_int(&Value::Error(ErrorCode::Ref)), Err(ErrorCode::Ref));
        assert_eq!(validate_int(&Value::Error(ErrorCode::Na)), Err(ErrorCode::Na));
        assert_eq!(validate_int(&Value::text("x")), Err(ErrorCode::Value));
        assert_eq!(validate_int(&Value::Boolean(true)), Err(ErrorCode::Value));
        assert_eq!(validate_int(&Value::Empty), Err(ErrorCode::Value));
    }

    #[test]
    fn test_validate_int_floors() {
        assert_eq!(validate_int(&Value::Number(2.7)), Ok(2));
        assert_eq!(validate_int(&Value::Number(-0.2)), Ok(-1));
        assert_eq!(validate_int(&Value::text("3")), Ok(3));
    }

    #[test]
    fn test_validate_positive_int() {
        assert_eq!(
            validate_positive_int(&Value::Number(0.0), false),
            Err(ErrorCode::Value)
        );
        assert_eq!(validate_positive_int(&Value::Number(0.0), true), Ok(0));
        assert_eq!(
            validate_positive_int(&Value::Number(-1.0), true),
            Err(ErrorCode::Value)
        );
        assert_eq!(
            validate_positive_int(&Value::Error(ErrorCode::Div0), true),
            Err(ErrorCode::Div0)
        );
    }
}

//! Numeric coercions used by the math, trig and statistical families

use super::CalcResult;
use crate::compat::CompatibilityMode;
use crate::value::Value;
use sheetcalc_core::ErrorCode;

/// Parse text that spells a number
///
/// Accepts surrounding whitespace, a leading sign, a fraction, an exponent
/// and a trailing `%`. Words like "inf" or "nan" are not numbers.
pub fn parse_numeric_text(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let (body, scale) = match trimmed.strip_suffix('%') {
        Some(body) => (body.trim_end(), 0.01),
        None => (trimmed, 1.0),
    };
    let allowed = |b: u8| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-');
    if !body.bytes().all(allowed) || !body.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    body.parse::<f64>()
        .ok()
        .map(|n| n * scale)
        .filter(|n| n.is_finite())
}

/// Coerce to a float
///
/// Numbers and numeric text pass; blank reads as 0; booleans count as 0/1
/// only in OpenOffice mode; an incoming error is passed through unchanged.
pub fn validate_float(value: &Value, mode: CompatibilityMode) -> CalcResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(s) => parse_numeric_text(s).ok_or(ErrorCode::Value),
        Value::Boolean(b) if mode == CompatibilityMode::OpenOffice => Ok(f64::from(u8::from(*b))),
        Value::Boolean(_) | Value::Array(_) => Err(ErrorCode::Value),
        Value::Empty => Ok(0.0),
        Value::Error(e) => Err(*e),
    }
}

/// Coerce to an integer, flooring toward negative infinity
pub fn validate_int(value: &Value, mode: CompatibilityMode) -> CalcResult<i64> {
    validate_float(value, mode).map(|n| n.floor() as i64)
}

/// Coerce to a non-negative integer
///
/// Zero is accepted only with `allow_zero`; anything below fails `#VALUE!`.
pub fn validate_positive_int(
    value: &Value,
    allow_zero: bool,
    mode: CompatibilityMode,
) -> CalcResult<i64> {
    let n = validate_int(value, mode)?;
    if n < 0 || (n == 0 && !allow_zero) {
        return Err(ErrorCode::Value);
    }
    Ok(n)
}

/// Lenient coercion for math and trig arguments and arithmetic operands
///
/// Blank is 0 and booleans are 0/1 in every mode.
pub fn validate_numeric_null_bool(value: &Value) -> CalcResult<f64> {
    match value {
        Value::Boolean(b) => Ok(f64::from(u8::from(*b))),
        other => validate_float(other, CompatibilityMode::Excel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EXCEL: CompatibilityMode = CompatibilityMode::Excel;
    const OPENOFFICE: CompatibilityMode = CompatibilityMode::OpenOffice;

    #[test]
    fn test_parse_numeric_text() {
        assert_eq!(parse_numeric_text(" 12.5 "), Some(12.5));
        assert_eq!(parse_numeric_text("-3e2"), Some(-300.0));
        assert_eq!(parse_numeric_text("50%"), Some(0.5));
        assert_eq!(parse_numeric_text("+.5"), Some(0.5));
        assert_eq!(parse_numeric_text(""), None);
        assert_eq!(parse_numeric_text("inf"), None);
        assert_eq!(parse_numeric_text("1e999"), None);
        assert_eq!(parse_numeric_text("12abc"), None);
    }

    #[test]
    fn test_validate_float_by_mode() {
        assert_eq!(validate_float(&Value::Number(2.5), EXCEL), Ok(2.5));
        assert_eq!(validate_float(&Value::text("4"), EXCEL), Ok(4.0));
        assert_eq!(validate_float(&Value::Empty, EXCEL), Ok(0.0));
        assert_eq!(
            validate_float(&Value::Boolean(true), EXCEL),
            Err(ErrorCode::Value)
        );
        assert_eq!(validate_float(&Value::Boolean(true), OPENOFFICE), Ok(1.0));
        assert_eq!(
            validate_float(&Value::text("abc"), EXCEL),
            Err(ErrorCode::Value)
        );
        assert_eq!(
            validate_float(&Value::Error(ErrorCode::Div0), EXCEL),
            Err(ErrorCode::Div0)
        );
    }

    #[test]
    fn test_validate_int_floors() {
        assert_eq!(validate_int(&Value::Number(2.9), EXCEL), Ok(2));
        assert_eq!(validate_int(&Value::Number(-2.1), EXCEL), Ok(-3));
        assert_eq!(validate_int(&Value::text("-0.5"), EXCEL), Ok(-1));
    }

    #[test]
    fn test_validate_positive_int() {
        let zero = Value::Number(0.0);
        let minus_one = Value::Number(-1.0);
        assert_eq!(
            validate_positive_int(&zero, false, EXCEL),
            Err(ErrorCode::Value)
        );
        assert_eq!(validate_positive_int(&zero, true, EXCEL), Ok(0));
        for allow_zero in [true, false] {
            assert_eq!(
                validate_positive_int(&minus_one, allow_zero, EXCEL),
                Err(ErrorCode::Value)
            );
        }
        assert_eq!(validate_positive_int(&Value::Number(3.7), false, EXCEL), Ok(3));
    }

    #[test]
    fn test_numeric_null_bool() {
        assert_eq!(validate_numeric_null_bool(&Value::Boolean(true)), Ok(1.0));
        assert_eq!(validate_numeric_null_bool(&Value::Empty), Ok(0.0));
        assert_eq!(validate_numeric_null_bool(&Value::text("2")), Ok(2.0));
        assert_eq!(
            validate_numeric_null_bool(&Value::text("two")),
            Err(ErrorCode::Value)
        );
    }

    proptest! {
        #[test]
        fn prop_validate_float_round_trips(x in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            let back = Value::number(validate_float(&Value::Number(x), EXCEL).unwrap());
            prop_assert_eq!(back, Value::Number(x));
        }

        #[test]
        fn prop_validate_float_reads_formatted_text(x in -1e12f64..1e12) {
            let text = Value::text(format!("{x}"));
            prop_assert_eq!(validate_float(&text, EXCEL), Ok(x));
        }
    }
}

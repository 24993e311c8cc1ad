//! Validators for the engineering (base conversion) family

use super::numeric::parse_numeric_text;
use super::CalcResult;
use crate::compat::CompatibilityMode;
use crate::value::{format_number, Value};
use sheetcalc_core::ErrorCode;

/// Widest digit string a base conversion may produce
pub const MAX_DIGITS: usize = 10;

fn numeric(value: &Value) -> CalcResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(s) => parse_numeric_text(s).ok_or(ErrorCode::Value),
        Value::Error(e) => Err(*e),
        _ => Err(ErrorCode::Value),
    }
}

/// Strictly numeric argument: numbers or numeric text only
pub fn validate_float(value: &Value) -> CalcResult<f64> {
    numeric(value)
}

/// Strictly numeric argument floored toward negative infinity
pub fn validate_int(value: &Value) -> CalcResult<i64> {
    numeric(value).map(|n| n.floor() as i64)
}

/// Normalize the number argument of a base conversion to upper-case text
///
/// Booleans are only legal in OpenOffice mode (as "1"/"0"); Gnumeric floors
/// numeric input first.
pub fn validate_value(value: &Value, mode: CompatibilityMode) -> CalcResult<String> {
    let text = match value {
        Value::Boolean(_) if mode != CompatibilityMode::OpenOffice => {
            return Err(ErrorCode::Value)
        }
        Value::Boolean(b) => u8::from(*b).to_string(),
        Value::Number(n) if mode == CompatibilityMode::Gnumeric => format_number(n.floor()),
        Value::Number(n) => format_number(*n),
        Value::Text(s) => match parse_numeric_text(s) {
            Some(n) if mode == CompatibilityMode::Gnumeric => format_number(n.floor()),
            _ => s.clone(),
        },
        Value::Empty => String::new(),
        Value::Error(e) => return Err(*e),
        Value::Array(_) => return Err(ErrorCode::Value),
    };
    Ok(text.to_uppercase())
}

/// Optional output width, 0 through 10
///
/// Omitted or blank means "no padding". Out-of-range numbers fail `#NUM!`,
/// anything non-numeric fails `#VALUE!`.
pub fn validate_places(places: Option<&Value>) -> CalcResult<Option<usize>> {
    let n = match places {
        None | Some(Value::Empty) => return Ok(None),
        Some(value) => numeric(value)?,
    };
    if !(0.0..=MAX_DIGITS as f64).contains(&n) {
        return Err(ErrorCode::Num);
    }
    Ok(Some(n.trunc() as usize))
}

/// Left-pad `digits` with zeros to `places` and keep the last ten characters
///
/// Fails `#NUM!` when `digits` is already wider than `places`. Without
/// `places` only the ten-character window is applied.
pub fn nbr_conversion_format(digits: &str, places: Option<usize>) -> CalcResult<String> {
    let width = digits.chars().count();
    let padded = match places {
        Some(places) if width > places => return Err(ErrorCode::Num),
        Some(places) => format!("{digits:0>places$}"),
        None => digits.to_string(),
    };
    let skip = padded.chars().count().saturating_sub(MAX_DIGITS);
    Ok(padded.chars().skip(skip).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nbr_conversion_format() {
        assert_eq!(nbr_conversion_format("5", Some(3)), Ok("005".into()));
        assert_eq!(nbr_conversion_format("123456", Some(3)), Err(ErrorCode::Num));
        assert_eq!(nbr_conversion_format("101", Some(3)), Ok("101".into()));
        assert_eq!(
            nbr_conversion_format("123456789012", None),
            Ok("3456789012".into())
        );
        assert_eq!(nbr_conversion_format("7", None), Ok("7".into()));
        assert_eq!(nbr_conversion_format("7", Some(0)), Err(ErrorCode::Num));
    }

    #[test]
    fn test_validate_places() {
        assert_eq!(validate_places(None), Ok(None));
        assert_eq!(validate_places(Some(&Value::Empty)), Ok(None));
        assert_eq!(validate_places(Some(&Value::Number(4.9))), Ok(Some(4)));
        assert_eq!(validate_places(Some(&Value::Number(10.0))), Ok(Some(10)));
        assert_eq!(
            validate_places(Some(&Value::Number(11.0))),
            Err(ErrorCode::Num)
        );
        assert_eq!(
            validate_places(Some(&Value::Number(-1.0))),
            Err(ErrorCode::Num)
        );
        assert_eq!(
            validate_places(Some(&Value::text("wide"))),
            Err(ErrorCode::Value)
        );
    }

    #[test]
    fn test_validate_value_by_mode() {
        use CompatibilityMode::*;
        assert_eq!(validate_value(&Value::text("ff"), Excel), Ok("FF".into()));
        assert_eq!(validate_value(&Value::Number(12.0), Excel), Ok("12".into()));
        assert_eq!(
            validate_value(&Value::Boolean(true), Excel),
            Err(ErrorCode::Value)
        );
        assert_eq!(validate_value(&Value::Boolean(true), OpenOffice), Ok("1".into()));
        assert_eq!(validate_value(&Value::Number(12.7), Gnumeric), Ok("12".into()));
        assert_eq!(validate_value(&Value::Number(12.7), Excel), Ok("12.7".into()));
    }

    #[test]
    fn test_validate_int_floors() {
        assert_eq!(validate_int(&Value::Number(-1.5)), Ok(-2));
        assert_eq!(validate_int(&Value::Empty), Err(ErrorCode::Value));
        assert_eq!(validate_float(&Value::text("2.5")), Ok(2.5));
    }
}

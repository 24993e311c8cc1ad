//! Coercions for the text function family

use super::numeric::parse_numeric_text;
use super::CalcResult;
use crate::compat::{CalcSettings, CompatibilityMode};
use crate::value::{format_number, Value};
use sheetcalc_core::ErrorCode;

/// Spell a boolean the way text functions see it
///
/// OpenOffice turns booleans into "1"/"0"; the other modes use the
/// localized TRUE/FALSE tokens.
pub fn convert_boolean_value(b: bool, settings: &CalcSettings) -> String {
    match settings.mode {
        CompatibilityMode::OpenOffice => (if b { "1" } else { "0" }).to_string(),
        _ => settings.boolean_token(b).to_string(),
    }
}

/// The string a text function operates on
pub fn extract_string(value: &Value, settings: &CalcSettings) -> CalcResult<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Number(n) => Ok(format_number(*n)),
        Value::Boolean(b) => Ok(convert_boolean_value(*b, settings)),
        Value::Empty => Ok(String::new()),
        Value::Error(e) => Err(*e),
        Value::Array(_) => Err(ErrorCode::Value),
    }
}

/// Integer position or count argument, truncated toward zero
///
/// A blank argument is 0, except in Gnumeric where it is `gnumeric_null`.
/// Booleans are 0/1 unless the mode is OpenOffice and `oo_bool_ok` is off.
/// Results below `min` fail `#VALUE!`.
pub fn extract_int(
    value: &Value,
    min: i64,
    gnumeric_null: i64,
    oo_bool_ok: bool,
    settings: &CalcSettings,
) -> CalcResult<i64> {
    let n = match value {
        Value::Empty if settings.mode == CompatibilityMode::Gnumeric => gnumeric_null as f64,
        Value::Empty => 0.0,
        Value::Boolean(b) if oo_bool_ok || settings.mode != CompatibilityMode::OpenOffice => {
            f64::from(u8::from(*b))
        }
        Value::Number(n) => *n,
        Value::Text(s) => parse_numeric_text(s).ok_or(ErrorCode::Value)?,
        Value::Error(e) => return Err(*e),
        Value::Boolean(_) | Value::Array(_) => return Err(ErrorCode::Value),
    };
    let n = n.trunc() as i64;
    if n < min {
        return Err(ErrorCode::Value);
    }
    Ok(n)
}

/// Float argument of a text function: blank is 0, booleans are 0/1
pub fn extract_float(value: &Value) -> CalcResult<f64> {
    match value {
        Value::Empty => Ok(0.0),
        Value::Boolean(b) => Ok(f64::from(u8::from(*b))),
        Value::Number(n) => Ok(*n),
        Value::Text(s) => parse_numeric_text(s).ok_or(ErrorCode::Value),
        Value::Error(e) => Err(*e),
        Value::Array(_) => Err(ErrorCode::Value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(mode: CompatibilityMode) -> CalcSettings {
        CalcSettings::new(mode)
    }

    #[test]
    fn test_boolean_spelling_per_mode() {
        let excel = settings(CompatibilityMode::Excel);
        let ods = settings(CompatibilityMode::OpenOffice);
        assert_eq!(convert_boolean_value(true, &excel), "TRUE");
        assert_eq!(convert_boolean_value(true, &ods), "1");
        assert_eq!(convert_boolean_value(false, &ods), "0");

        let german = excel.with_boolean_tokens("WAHR", "FALSCH");
        assert_eq!(convert_boolean_value(false, &german), "FALSCH");
    }

    #[test]
    fn test_extract_string() {
        let excel = settings(CompatibilityMode::Excel);
        assert_eq!(extract_string(&Value::Number(1.5), &excel), Ok("1.5".into()));
        assert_eq!(extract_string(&Value::Empty, &excel), Ok(String::new()));
        assert_eq!(
            extract_string(&Value::Error(ErrorCode::Na), &excel),
            Err(ErrorCode::Na)
        );
    }

    #[test]
    fn test_extract_int_blank_defaults() {
        let excel = settings(CompatibilityMode::Excel);
        let gnumeric = settings(CompatibilityMode::Gnumeric);
        assert_eq!(extract_int(&Value::Empty, 0, 1, false, &excel), Ok(0));
        assert_eq!(extract_int(&Value::Empty, 0, 1, false, &gnumeric), Ok(1));
    }

    #[test]
    fn test_extract_int_booleans() {
        let excel = settings(CompatibilityMode::Excel);
        let ods = settings(CompatibilityMode::OpenOffice);
        assert_eq!(extract_int(&Value::Boolean(true), 0, 0, false, &excel), Ok(1));
        assert_eq!(
            extract_int(&Value::Boolean(true), 0, 0, false, &ods),
            Err(ErrorCode::Value)
        );
        assert_eq!(extract_int(&Value::Boolean(true), 0, 0, true, &ods), Ok(1));
    }

    #[test]
    fn test_extract_int_truncates_and_checks_min() {
        let excel = settings(CompatibilityMode::Excel);
        assert_eq!(extract_int(&Value::Number(3.9), 0, 0, false, &excel), Ok(3));
        assert_eq!(extract_int(&Value::Number(-0.5), 0, 0, false, &excel), Ok(0));
        assert_eq!(
            extract_int(&Value::Number(0.0), 1, 0, false, &excel),
            Err(ErrorCode::Value)
        );
        assert_eq!(
            extract_int(&Value::text("abc"), 0, 0, false, &excel),
            Err(ErrorCode::Value)
        );
    }

    #[test]
    fn test_extract_float() {
        assert_eq!(extract_float(&Value::Boolean(true)), Ok(1.0));
        assert_eq!(extract_float(&Value::Empty), Ok(0.0));
        assert_eq!(extract_float(&Value::text("x")), Err(ErrorCode::Value));
    }
}

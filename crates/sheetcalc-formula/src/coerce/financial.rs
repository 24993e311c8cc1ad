//! Validators for cash-flow and security functions
//!
//! Dates are Excel serial numbers in the 1900 date system, including the
//! phantom 1900-02-29 at serial 60.

use super::numeric::parse_numeric_text;
use super::CalcResult;
use crate::value::Value;
use chrono::{Duration, NaiveDate};
use sheetcalc_core::ErrorCode;

/// Payment due at the end of each period
pub const PAYMENT_END_OF_PERIOD: i64 = 0;
/// Payment due at the beginning of each period
pub const PAYMENT_BEGINNING_OF_PERIOD: i64 = 1;

/// Serial of 9999-12-31, the last representable date
pub const MAX_SERIAL: i64 = 2_958_465;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or(NaiveDate::MIN)
}

/// Serial number of a calendar date
pub fn date_to_serial(date: NaiveDate) -> i64 {
    let days = (date - epoch()).num_days();
    if days >= 60 {
        days + 1
    } else {
        days
    }
}

/// Calendar date of a serial number
///
/// Serial 60 has no real date and maps to 1900-02-28.
pub fn serial_to_date(serial: i64) -> Option<NaiveDate> {
    if !(0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let days = if serial > 60 { serial - 1 } else { serial.min(59) };
    epoch().checked_add_signed(Duration::days(days))
}

fn parse_date_text(s: &str) -> Option<i64> {
    let s = s.trim();
    ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(date_to_serial)
}

/// Numbers and numeric text only
pub fn validate_float(value: &Value) -> CalcResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(s) => parse_numeric_text(s).ok_or(ErrorCode::Value),
        Value::Error(e) => Err(*e),
        _ => Err(ErrorCode::Value),
    }
}

pub fn validate_int(value: &Value) -> CalcResult<i64> {
    validate_float(value).map(|n| n.floor() as i64)
}

/// A date as a whole serial number
///
/// Accepts serials and date text (`2024-01-31`, `01/31/2024`). Negative or
/// out-of-calendar serials fail `#NUM!`.
pub fn validate_date(value: &Value) -> CalcResult<i64> {
    let serial = match value {
        Value::Number(n) => n.floor() as i64,
        Value::Text(s) => match parse_numeric_text(s) {
            Some(n) => n.floor() as i64,
            None => parse_date_text(s).ok_or(ErrorCode::Value)?,
        },
        Value::Empty => 0,
        Value::Error(e) => return Err(*e),
        Value::Boolean(_) | Value::Array(_) => return Err(ErrorCode::Value),
    };
    if !(0..=MAX_SERIAL).contains(&serial) {
        return Err(ErrorCode::Num);
    }
    Ok(serial)
}

pub fn validate_settlement_date(value: &Value) -> CalcResult<i64> {
    validate_date(value)
}

pub fn validate_maturity_date(value: &Value) -> CalcResult<i64> {
    validate_date(value)
}

pub fn validate_issue_date(value: &Value) -> CalcResult<i64> {
    validate_date(value)
}

/// Settlement must fall strictly before maturity
pub fn validate_security_period(settlement: i64, maturity: i64) -> CalcResult<()> {
    if settlement >= maturity {
        return Err(ErrorCode::Num);
    }
    Ok(())
}

pub fn validate_rate(value: &Value) -> CalcResult<f64> {
    validate_float(value)
}

/// 0 (end of period) or 1 (beginning); anything else fails `#NUM!`
pub fn validate_period_type(value: &Value) -> CalcResult<i64> {
    match validate_int(value)? {
        t @ (PAYMENT_END_OF_PERIOD | PAYMENT_BEGINNING_OF_PERIOD) => Ok(t),
        _ => Err(ErrorCode::Num),
    }
}

pub fn validate_present_value(value: &Value) -> CalcResult<f64> {
    validate_float(value)
}

pub fn validate_future_value(value: &Value) -> CalcResult<f64> {
    validate_float(value)
}

fn strictly_positive(value: &Value) -> CalcResult<f64> {
    let n = validate_float(value)?;
    if n <= 0.0 {
        return Err(ErrorCode::Num);
    }
    Ok(n)
}

/// Redemption value per 100 face value, must be positive
pub fn validate_redemption(value: &Value) -> CalcResult<f64> {
    strictly_positive(value)
}

pub fn validate_price(value: &Value) -> CalcResult<f64> {
    strictly_positive(value)
}

pub fn validate_discount(value: &Value) -> CalcResult<f64> {
    strictly_positive(value)
}

/// Day count basis 0..=4
pub fn validate_basis(value: &Value) -> CalcResult<u8> {
    match validate_int(value)? {
        basis @ 0..=4 => Ok(basis as u8),
        _ => Err(ErrorCode::Num),
    }
}

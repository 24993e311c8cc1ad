//! Financial functions
//!
//! Cash-flow functions (PV, FV, PMT, NPER) use the usual sign convention:
//! money paid out is negative. Discounted-security functions measure the
//! time between settlement and maturity with a day count basis.
//!
//! | basis | day count          |
//! |-------|--------------------|
//! | 0     | US (NASD) 30/360   |
//! | 1     | actual/actual      |
//! | 2     | actual/360         |
//! | 3     | actual/365         |
//! | 4     | European 30/360    |

use super::optional_arg;
use crate::broadcast::lift_n;
use crate::coerce::financial::{
    serial_to_date, validate_basis, validate_discount, validate_float, validate_future_value,
    validate_maturity_date, validate_period_type, validate_present_value, validate_price,
    validate_rate, validate_redemption, validate_security_period, validate_settlement_date,
};
use crate::coerce::CalcResult;
use crate::context::EvaluationContext;
use crate::value::Value;
use chrono::{Datelike, NaiveDate};
use sheetcalc_core::ErrorCode;

static ZERO: Value = Value::Number(0.0);

/// The first `count` arguments; missing or blank ones read as zero
fn args_or_zero(args: &[Value], count: usize) -> Vec<&Value> {
    (0..count)
        .map(|i| optional_arg(args, i).unwrap_or(&ZERO))
        .collect()
}

fn number_result(n: f64) -> CalcResult<Value> {
    match Value::number(n) {
        Value::Error(e) => Err(e),
        value => Ok(value),
    }
}

// Cash flows

/// `((1 + r)^n - 1) / r` scaled for payments at the start of a period
fn annuity_factor(rate: f64, periods: f64, period_type: i64) -> f64 {
    (1.0 + rate * period_type as f64) * ((1.0 + rate).powf(periods) - 1.0) / rate
}

/// PV(rate, nper, pmt, [fv], [type])
pub fn fn_pv(args: &[Value], _ctx: &EvaluationContext) -> Value {
    lift_n(&args_or_zero(args, 5), |a| {
        let rate = validate_rate(a[0])?;
        let periods = validate_float(a[1])?;
        let payment = validate_float(a[2])?;
        let future = validate_future_value(a[3])?;
        let period_type = validate_period_type(a[4])?;

        if rate == 0.0 {
            return number_result(-(future + payment * periods));
        }
        let growth = (1.0 + rate).powf(periods);
        number_result((-payment * annuity_factor(rate, periods, period_type) - future) / growth)
    })
}

/// FV(rate, nper, pmt, [pv], [type])
pub fn fn_fv(args: &[Value], _ctx: &EvaluationContext) -> Value {
    lift_n(&args_or_zero(args, 5), |a| {
        let rate = validate_rate(a[0])?;
        let periods = validate_float(a[1])?;
        let payment = validate_float(a[2])?;
        let present = validate_present_value(a[3])?;
        let period_type = validate_period_type(a[4])?;

        if rate == 0.0 {
            return number_result(-(present + payment * periods));
        }
        let growth = (1.0 + rate).powf(periods);
        number_result(-present * growth - payment * annuity_factor(rate, periods, period_type))
    })
}

/// PMT(rate, nper, pv, [fv], [type])
pub fn fn_pmt(args: &[Value], _ctx: &EvaluationContext) -> Value {
    lift_n(&args_or_zero(args, 5), |a| {
        let rate = validate_rate(a[0])?;
        let periods = validate_float(a[1])?;
        let present = validate_present_value(a[2])?;
        let future = validate_future_value(a[3])?;
        let period_type = validate_period_type(a[4])?;

        if periods == 0.0 {
            return Err(ErrorCode::Num);
        }
        if rate == 0.0 {
            return number_result(-(present + future) / periods);
        }
        let growth = (1.0 + rate).powf(periods);
        number_result((-future - present * growth) / annuity_factor(rate, periods, period_type))
    })
}

/// NPER(rate, pmt, pv, [fv], [type])
pub fn fn_nper(args: &[Value], _ctx: &EvaluationContext) -> Value {
    lift_n(&args_or_zero(args, 5), |a| {
        let rate = validate_rate(a[0])?;
        let payment = validate_float(a[1])?;
        let present = validate_present_value(a[2])?;
        let future = validate_future_value(a[3])?;
        let period_type = validate_period_type(a[4])?;

        if rate == 0.0 {
            if payment == 0.0 {
                return Err(ErrorCode::Num);
            }
            return number_result(-(present + future) / payment);
        }
        let adjusted = payment * (1.0 + rate * period_type as f64);
        let ratio = (adjusted - future * rate) / (present * rate + adjusted);
        if ratio <= 0.0 || ratio.is_nan() {
            return Err(ErrorCode::Num);
        }
        number_result(ratio.ln() / (1.0 + rate).ln())
    })
}

// Day counts

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

fn is_last_day_of_february(date: NaiveDate) -> bool {
    date.month() == 2 && date.succ_opt().map_or(false, |next| next.month() == 3)
}

/// Day difference on a 360-day calendar
fn days_360(start: NaiveDate, end: NaiveDate, european: bool) -> i64 {
    let (y1, m1, mut d1) = (start.year() as i64, start.month() as i64, start.day() as i64);
    let (mut y2, mut m2, mut d2) = (end.year() as i64, end.month() as i64, end.day() as i64);

    if d1 == 31 {
        d1 = 30;
    } else if !european && is_last_day_of_february(start) {
        d1 = 30;
    }
    if d2 == 31 {
        if !european && d1 != 30 {
            d2 = 1;
            if m2 == 12 {
                y2 += 1;
                m2 = 1;
            } else {
                m2 += 1;
            }
        } else {
            d2 = 30;
        }
    }
    (y2 - y1) * 360 + (m2 - m1) * 30 + (d2 - d1)
}

/// Average year length for actual/actual between two dates
fn actual_year_length(start: NaiveDate, end: NaiveDate) -> f64 {
    let (y1, y2) = (start.year(), end.year());
    let years = y2 - y1 + 1;
    let start_md = start.month() * 100 + start.day();
    let end_md = end.month() * 100 + end.day();

    if years == 1 {
        return if is_leap_year(y2) { 366.0 } else { 365.0 };
    }
    if years == 2 && start_md >= end_md {
        let crosses_feb_29 = (is_leap_year(y1) && start_md <= 229)
            || (!is_leap_year(y1) && is_leap_year(y2) && end_md >= 229);
        return if crosses_feb_29 { 366.0 } else { 365.0 };
    }
    let total: i32 = (y1..=y2).map(|y| if is_leap_year(y) { 366 } else { 365 }).sum();
    total as f64 / years as f64
}

/// Fraction of a year between two date serials under a day count basis
pub fn year_frac(start: i64, end: i64, basis: u8) -> CalcResult<f64> {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let first = serial_to_date(start).ok_or(ErrorCode::Num)?;
    let last = serial_to_date(end).ok_or(ErrorCode::Num)?;
    let actual_days = (end - start) as f64;

    Ok(match basis {
        0 => days_360(first, last, false) as f64 / 360.0,
        1 => actual_days / actual_year_length(first, last),
        2 => actual_days / 360.0,
        3 => actual_days / 365.0,
        4 => days_360(first, last, true) as f64 / 360.0,
        _ => return Err(ErrorCode::Num),
    })
}

/// Settlement, maturity and basis of a discounted security
struct Security {
    settlement: i64,
    maturity: i64,
    basis: u8,
}

impl Security {
    fn validate(settlement: &Value, maturity: &Value, basis: &Value) -> CalcResult<Self> {
        let settlement = validate_settlement_date(settlement)?;
        let maturity = validate_maturity_date(maturity)?;
        validate_security_period(settlement, maturity)?;
        let basis = validate_basis(basis)?;
        Ok(Self {
            settlement,
            maturity,
            basis,
        })
    }

    fn year_frac(&self) -> CalcResult<f64> {
        year_frac(self.settlement, self.maturity, self.basis)
    }
}

/// Shared driver: `f(security, third, fourth)` element-wise
fn security_function(
    args: &[Value],
    f: impl Fn(&Security, &Value, &Value) -> CalcResult<f64>,
) -> Value {
    lift_n(&args_or_zero(args, 5), |a| {
        let security = Security::validate(a[0], a[1], a[4])?;
        number_result(f(&security, a[2], a[3])?)
    })
}

/// DISC(settlement, maturity, pr, redemption, [basis])
pub fn fn_disc(args: &[Value], _ctx: &EvaluationContext) -> Value {
    security_function(args, |security, price, redemption| {
        let price = validate_price(price)?;
        let redemption = validate_redemption(redemption)?;
        Ok((1.0 - price / redemption) / security.year_frac()?)
    })
}

/// PRICEDISC(settlement, maturity, discount, redemption, [basis])
pub fn fn_pricedisc(args: &[Value], _ctx: &EvaluationContext) -> Value {
    security_function(args, |security, discount, redemption| {
        let discount = validate_discount(discount)?;
        let redemption = validate_redemption(redemption)?;
        Ok(redemption * (1.0 - discount * security.year_frac()?))
    })
}

/// RECEIVED(settlement, maturity, investment, discount, [basis])
pub fn fn_received(args: &[Value], _ctx: &EvaluationContext) -> Value {
    security_function(args, |security, investment, discount| {
        let investment = validate_price(investment)?;
        let discount = validate_discount(discount)?;
        let denominator = 1.0 - discount * security.year_frac()?;
        if denominator <= 0.0 {
            return Err(ErrorCode::Num);
        }
        Ok(investment / denominator)
    })
}

/// INTRATE(settlement, maturity, investment, redemption, [basis])
pub fn fn_intrate(args: &[Value], _ctx: &EvaluationContext) -> Value {
    security_function(args, |security, investment, redemption| {
        let investment = validate_price(investment)?;
        let redemption = validate_redemption(redemption)?;
        Ok((redemption - investment) / investment / security.year_frac()?)
    })
}

/// YIELDDISC(settlement, maturity, pr, redemption, [basis])
pub fn fn_yielddisc(args: &[Value], _ctx: &EvaluationContext) -> Value {
    security_function(args, |security, price, redemption| {
        let price = validate_price(price)?;
        let redemption = validate_redemption(redemption)?;
        Ok((redemption / price - 1.0) / security.year_frac()?)
    })
}

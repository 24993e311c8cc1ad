//! Math functions

use super::arg;
use super::statistical::{self, collect_numbers, ArrayValues};
use crate::broadcast::{lift1, lift2};
use crate::coerce::numeric::validate_numeric_null_bool;
use crate::coerce::CalcResult;
use crate::context::EvaluationContext;
use crate::value::Value;
use sheetcalc_core::ErrorCode;

/// Apply a numeric function to one argument, element-wise over arrays
fn unary(args: &[Value], f: fn(f64) -> CalcResult<f64>) -> Value {
    lift1(arg(args, 0), |v| {
        let x = validate_numeric_null_bool(v)?;
        Ok(Value::number(f(x)?))
    })
}

fn binary(args: &[Value], f: fn(f64, f64) -> CalcResult<f64>) -> Value {
    lift2(arg(args, 0), arg(args, 1), |a, b| {
        let a = validate_numeric_null_bool(a)?;
        let b = validate_numeric_null_bool(b)?;
        Ok(Value::number(f(a, b)?))
    })
}

pub fn fn_abs(args: &[Value], _ctx: &EvaluationContext) -> Value {
    unary(args, |x| Ok(x.abs()))
}

pub fn fn_exp(args: &[Value], _ctx: &EvaluationContext) -> Value {
    unary(args, |x| Ok(x.exp()))
}

/// LN(x); x must be positive
pub fn fn_ln(args: &[Value], _ctx: &EvaluationContext) -> Value {
    unary(args, |x| {
        if x <= 0.0 {
            return Err(ErrorCode::Num);
        }
        Ok(x.ln())
    })
}

pub fn fn_sqrt(args: &[Value], _ctx: &EvaluationContext) -> Value {
    unary(args, |x| {
        if x < 0.0 {
            return Err(ErrorCode::Num);
        }
        Ok(x.sqrt())
    })
}

/// INT(x): round down to the nearest integer
pub fn fn_int(args: &[Value], _ctx: &EvaluationContext) -> Value {
    unary(args, |x| Ok(x.floor()))
}

pub fn fn_sign(args: &[Value], _ctx: &EvaluationContext) -> Value {
    unary(args, |x| {
        Ok(if x > 0.0 {
            1.0
        } else if x < 0.0 {
            -1.0
        } else {
            0.0
        })
    })
}

/// MOD(n, d): the result has the sign of the divisor
pub fn fn_mod(args: &[Value], _ctx: &EvaluationContext) -> Value {
    binary(args, |n, d| {
        if d == 0.0 {
            return Err(ErrorCode::Div0);
        }
        Ok(n - d * (n / d).floor())
    })
}

/// POWER(base, exponent), with the same rules as the `^` operator
pub fn fn_power(args: &[Value], _ctx: &EvaluationContext) -> Value {
    binary(args, |base, exponent| {
        if base == 0.0 && exponent == 0.0 {
            return Err(ErrorCode::Num);
        }
        if base == 0.0 && exponent < 0.0 {
            return Err(ErrorCode::Div0);
        }
        Ok(base.powf(exponent))
    })
}

/// Drop binary noise past the 15th significant digit (`100.49999999999999` -> `100.5`)
fn to_significant_digits(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    format!("{x:.14e}").parse().unwrap_or(x)
}

/// ROUND(x, digits): halves round away from zero
pub fn fn_round(args: &[Value], _ctx: &EvaluationContext) -> Value {
    binary(args, |x, digits| {
        let digits = digits.trunc().clamp(-308.0, 308.0) as i32;
        let factor = 10f64.powi(digits.abs());
        if digits >= 0 {
            let scaled = x * factor;
            Ok(if scaled.is_finite() {
                to_significant_digits(scaled).round() / factor
            } else {
                x
            })
        } else {
            Ok(to_significant_digits(x / factor).round() * factor)
        }
    })
}

pub fn fn_pi(_args: &[Value], _ctx: &EvaluationContext) -> Value {
    Value::Number(std::f64::consts::PI)
}

/// SUM; text and booleans inside ranges are ignored
pub fn fn_sum(args: &[Value], ctx: &EvaluationContext) -> Value {
    match collect_numbers(args, ctx, ArrayValues::Numbers).and_then(|n| statistical::sum(&n)) {
        Ok(total) => Value::number(total),
        Err(e) => Value::Error(e),
    }
}

/// PRODUCT; 0 when there are no numbers
pub fn fn_product(args: &[Value], ctx: &EvaluationContext) -> Value {
    match collect_numbers(args, ctx, ArrayValues::Numbers).and_then(|n| statistical::product(&n)) {
        Ok(total) => Value::number(total),
        Err(e) => Value::Error(e),
    }
}

/// RAND(): uniform in `[0, 1)`
pub fn fn_rand(_args: &[Value], _ctx: &EvaluationContext) -> Value {
    Value::Number(rand::random::<f64>())
}

/// RANDBETWEEN(bottom, top), both bounds inclusive
pub fn fn_randbetween(args: &[Value], _ctx: &EvaluationContext) -> Value {
    use rand::Rng;

    binary(args, |bottom, top| {
        let (low, high) = (bottom.ceil(), top.floor());
        if low > high {
            return Err(ErrorCode::Num);
        }
        let mut rng = rand::thread_rng();
        Ok(rng.gen_range(low as i64..=high as i64) as f64)
    })
}

//! Trigonometric functions
//!
//! Every function is array-enabled: an array argument returns an array of
//! the same shape, one independent result per element.

use super::arg;
use crate::broadcast::lift1;
use crate::coerce::numeric::validate_numeric_null_bool;
use crate::coerce::CalcResult;
use crate::context::EvaluationContext;
use crate::value::Value;
use sheetcalc_core::ErrorCode;

const SMALL_DENOMINATOR: f64 = 1.0e-12;

/// `num / den`, failing `#DIV/0!` when the denominator is practically zero
pub fn very_small_denominator(num: f64, den: f64) -> CalcResult<f64> {
    if den.abs() < SMALL_DENOMINATOR {
        return Err(ErrorCode::Div0);
    }
    Ok(num / den)
}

fn angle_function(args: &[Value], f: fn(f64) -> CalcResult<f64>) -> Value {
    lift1(arg(args, 0), |v| {
        let angle = validate_numeric_null_bool(v)?;
        Ok(Value::number(f(angle)?))
    })
}

pub fn fn_sin(args: &[Value], _ctx: &EvaluationContext) -> Value {
    angle_function(args, |x| Ok(x.sin()))
}

pub fn fn_cos(args: &[Value], _ctx: &EvaluationContext) -> Value {
    angle_function(args, |x| Ok(x.cos()))
}

pub fn fn_tan(args: &[Value], _ctx: &EvaluationContext) -> Value {
    angle_function(args, |x| very_small_denominator(x.sin(), x.cos()))
}

/// CSC(angle) = 1 / sin(angle)
pub fn fn_csc(args: &[Value], _ctx: &EvaluationContext) -> Value {
    angle_function(args, |x| very_small_denominator(1.0, x.sin()))
}

/// CSCH(angle) = 1 / sinh(angle)
pub fn fn_csch(args: &[Value], _ctx: &EvaluationContext) -> Value {
    angle_function(args, |x| very_small_denominator(1.0, x.sinh()))
}

pub fn fn_sec(args: &[Value], _ctx: &EvaluationContext) -> Value {
    angle_function(args, |x| very_small_denominator(1.0, x.cos()))
}

pub fn fn_sech(args: &[Value], _ctx: &EvaluationContext) -> Value {
    angle_function(args, |x| very_small_denominator(1.0, x.cosh()))
}

pub fn fn_cot(args: &[Value], _ctx: &EvaluationContext) -> Value {
    angle_function(args, |x| very_small_denominator(x.cos(), x.sin()))
}

pub fn fn_coth(args: &[Value], _ctx: &EvaluationContext) -> Value {
    angle_function(args, |x| very_small_denominator(x.cosh(), x.sinh()))
}

//! Statistical functions
//!
//! Aggregates read their arguments two ways. A value typed directly into the
//! call is coerced: booleans count as 0/1, numeric text is parsed and other
//! text fails `#VALUE!`. Values that arrive inside an array (a range or an
//! array constant) only count when they are numbers; text and booleans are
//! skipped, except that the `A` variants read them as 0/1 and OpenOffice
//! counts booleans everywhere.

use super::arg;
use crate::broadcast::{lift1, lift3};
use crate::coerce::numeric::parse_numeric_text;
use crate::coerce::statistical::{
    datatype_adjustment_allow_strings, datatype_adjustment_booleans, validate_float,
    validate_probability,
};
use crate::coerce::CalcResult;
use crate::context::EvaluationContext;
use crate::value::Value;
use sheetcalc_core::ErrorCode;
use std::f64::consts::{PI, SQRT_2};

/// How array elements are read by an aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArrayValues {
    /// Numbers only (booleans too in OpenOffice mode)
    Numbers,
    /// Booleans as 0/1 and text as 0
    AllowStrings,
}

/// Gather the numbers an aggregate works on; the first error wins
pub(crate) fn collect_numbers(
    args: &[Value],
    ctx: &EvaluationContext,
    policy: ArrayValues,
) -> CalcResult<Vec<f64>> {
    let mut numbers = Vec::new();
    for value in args {
        match value {
            Value::Array(array) => {
                for element in array.values() {
                    let adjusted = match policy {
                        ArrayValues::Numbers => datatype_adjustment_booleans(element, ctx.mode()),
                        ArrayValues::AllowStrings => datatype_adjustment_allow_strings(element),
                    };
                    match adjusted {
                        Value::Number(n) => numbers.push(n),
                        Value::Error(e) => return Err(e),
                        _ => {}
                    }
                }
            }
            Value::Number(n) => numbers.push(*n),
            Value::Boolean(b) => numbers.push(f64::from(u8::from(*b))),
            Value::Text(s) => numbers.push(parse_numeric_text(s).ok_or(ErrorCode::Value)?),
            Value::Error(e) => return Err(*e),
            Value::Empty => {}
        }
    }
    Ok(numbers)
}

fn aggregate(
    args: &[Value],
    ctx: &EvaluationContext,
    policy: ArrayValues,
    f: fn(&[f64]) -> CalcResult<f64>,
) -> Value {
    match collect_numbers(args, ctx, policy).and_then(|numbers| f(&numbers)) {
        Ok(n) => Value::number(n),
        Err(e) => Value::Error(e),
    }
}

pub(crate) fn sum(numbers: &[f64]) -> CalcResult<f64> {
    Ok(numbers.iter().fold(0.0, |total, n| total + n))
}

pub(crate) fn product(numbers: &[f64]) -> CalcResult<f64> {
    if numbers.is_empty() {
        return Ok(0.0);
    }
    Ok(numbers.iter().product())
}

fn mean(numbers: &[f64]) -> CalcResult<f64> {
    if numbers.is_empty() {
        return Err(ErrorCode::Div0);
    }
    Ok(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

fn maximum(numbers: &[f64]) -> CalcResult<f64> {
    Ok(numbers.iter().copied().reduce(f64::max).unwrap_or(0.0))
}

fn minimum(numbers: &[f64]) -> CalcResult<f64> {
    Ok(numbers.iter().copied().reduce(f64::min).unwrap_or(0.0))
}

/// Sum of squared deviations divided by `n - ddof`
fn variance(numbers: &[f64], ddof: usize) -> CalcResult<f64> {
    if numbers.len() <= ddof {
        return Err(ErrorCode::Div0);
    }
    let m = mean(numbers)?;
    let squares: f64 = numbers.iter().map(|x| (x - m).powi(2)).sum();
    Ok(squares / (numbers.len() - ddof) as f64)
}

fn sample_variance(numbers: &[f64]) -> CalcResult<f64> {
    variance(numbers, 1)
}

fn population_variance(numbers: &[f64]) -> CalcResult<f64> {
    variance(numbers, 0)
}

fn sample_stdev(numbers: &[f64]) -> CalcResult<f64> {
    sample_variance(numbers).map(f64::sqrt)
}

fn population_stdev(numbers: &[f64]) -> CalcResult<f64> {
    population_variance(numbers).map(f64::sqrt)
}

pub fn fn_average(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::Numbers, mean)
}

pub fn fn_averagea(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::AllowStrings, mean)
}

/// MAX; 0 when there is nothing to compare
pub fn fn_max(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::Numbers, maximum)
}

pub fn fn_maxa(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::AllowStrings, maximum)
}

/// MIN; 0 when there is nothing to compare
pub fn fn_min(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::Numbers, minimum)
}

pub fn fn_mina(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::AllowStrings, minimum)
}

/// STDEV (sample); fewer than two values is `#DIV/0!`
pub fn fn_stdev(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::Numbers, sample_stdev)
}

pub fn fn_stdeva(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::AllowStrings, sample_stdev)
}

/// STDEVP (population)
pub fn fn_stdevp(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::Numbers, population_stdev)
}

pub fn fn_stdevpa(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::AllowStrings, population_stdev)
}

pub fn fn_var(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::Numbers, sample_variance)
}

pub fn fn_vara(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::AllowStrings, sample_variance)
}

pub fn fn_varp(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::Numbers, population_variance)
}

pub fn fn_varpa(args: &[Value], ctx: &EvaluationContext) -> Value {
    aggregate(args, ctx, ArrayValues::AllowStrings, population_variance)
}

/// COUNT: numbers anywhere, plus booleans and numeric text typed directly
///
/// Errors are counted as nothing rather than propagated.
pub fn fn_count(args: &[Value], _ctx: &EvaluationContext) -> Value {
    let count = args
        .iter()
        .map(|value| match value {
            Value::Array(array) => array
                .values()
                .iter()
                .filter(|v| matches!(v, Value::Number(_)))
                .count(),
            Value::Number(_) | Value::Boolean(_) => 1,
            Value::Text(s) => usize::from(parse_numeric_text(s).is_some()),
            Value::Error(_) | Value::Empty => 0,
        })
        .sum::<usize>();
    Value::Number(count as f64)
}

/// COUNTA: every non-blank value, errors included
pub fn fn_counta(args: &[Value], _ctx: &EvaluationContext) -> Value {
    let count = args
        .iter()
        .flat_map(Value::scalars)
        .filter(|v| !v.is_empty())
        .count();
    Value::Number(count as f64)
}

/// COUNTBLANK: blank cells and empty text
pub fn fn_countblank(args: &[Value], _ctx: &EvaluationContext) -> Value {
    let count = args
        .iter()
        .flat_map(Value::scalars)
        .filter(|v| match v {
            Value::Empty => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        })
        .count();
    Value::Number(count as f64)
}

/// STANDARDIZE(x, mean, standard_dev)
pub fn fn_standardize(args: &[Value], _ctx: &EvaluationContext) -> Value {
    lift3(arg(args, 0), arg(args, 1), arg(args, 2), |x, m, sd| {
        let x = validate_float(x)?;
        let m = validate_float(m)?;
        let sd = validate_float(sd)?;
        if sd <= 0.0 {
            return Err(ErrorCode::Num);
        }
        Ok(Value::number((x - m) / sd))
    })
}

const ACKLAM_A: [f64; 6] = [
    -3.969683028665376e+01,
    2.209460984245205e+02,
    -2.759285104469687e+02,
    1.383577518672690e+02,
    -3.066479806614716e+01,
    2.506628277459239e+00,
];
const ACKLAM_B: [f64; 5] = [
    -5.447609879822406e+01,
    1.615858368580409e+02,
    -1.556989798598866e+02,
    6.680131188771972e+01,
    -1.328068155288572e+01,
];
const ACKLAM_C: [f64; 6] = [
    -7.784894002430293e-03,
    -3.223964580411365e-01,
    -2.400758277161838e+00,
    -2.549732539343734e+00,
    4.374664141464968e+00,
    2.938163982698783e+00,
];
const ACKLAM_D: [f64; 4] = [
    7.784695709041462e-03,
    3.224671290700398e-01,
    2.445134137142996e+00,
    3.754408661907416e+00,
];
const P_LOW: f64 = 0.02425;

fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, c| acc * x + c)
}

const FRAC_1_SQRT_PI: f64 = 0.564_189_583_547_756_3;

// Cody's rational approximations for erf/erfc, highest degree first
const ERF_NUM: [f64; 5] = [
    1.85777706184603153e-01,
    3.16112374387056560e+00,
    1.13864154151050156e+02,
    3.77485237685302021e+02,
    3.20937758913846947e+03,
];
const ERF_DEN: [f64; 5] = [
    1.0,
    2.36012909523441209e+01,
    2.44024637934444173e+02,
    1.28261652607737228e+03,
    2.84423683343917062e+03,
];
const ERFC_MID_NUM: [f64; 9] = [
    2.15311535474403846e-08,
    5.64188496988670089e-01,
    8.88314979438837594e+00,
    6.61191906371416295e+01,
    2.98635138197400131e+02,
    8.81952221241769090e+02,
    1.71204761263407058e+03,
    2.05107837782607147e+03,
    1.23033935479799725e+03,
];
const ERFC_MID_DEN: [f64; 9] = [
    1.0,
    1.57449261107098347e+01,
    1.17693950891312499e+02,
    5.37181101862009858e+02,
    1.62138957456669019e+03,
    3.29079923573345963e+03,
    4.36261909014324716e+03,
    3.43936767414372164e+03,
    1.23033935480374942e+03,
];
const ERFC_TAIL_NUM: [f64; 6] = [
    1.63153871373020978e-02,
    3.05326634961232344e-01,
    3.60344899949804439e-01,
    1.25781726111229246e-01,
    1.60837851487422766e-02,
    6.58749161529837803e-04,
];
const ERFC_TAIL_DEN: [f64; 6] = [
    1.0,
    2.56852019228982242e+00,
    1.87295284992346047e+00,
    5.27905102951428412e-01,
    6.05183413124413191e-02,
    2.33520497626869185e-03,
];

/// `exp(-x^2)` with the square split to keep precision for large `x`
fn exp_neg_square(x: f64) -> f64 {
    let head = (x * 16.0).trunc() / 16.0;
    (-head * head).exp() * (-(x - head) * (x + head)).exp()
}

/// Complementary error function
fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }
    if x < 0.5 {
        let z = x * x;
        return 1.0 - x * horner(&ERF_NUM, z) / horner(&ERF_DEN, z);
    }
    if x < 4.0 {
        return exp_neg_square(x) * horner(&ERFC_MID_NUM, x) / horner(&ERFC_MID_DEN, x);
    }
    let z = 1.0 / (x * x);
    let tail = z * horner(&ERFC_TAIL_NUM, z) / horner(&ERFC_TAIL_DEN, z);
    exp_neg_square(x) * (FRAC_1_SQRT_PI - tail) / x
}

fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Inverse of the standard normal CDF
///
/// Acklam's rational approximation followed by one Halley step.
/// `p` must lie strictly between 0 and 1.
fn inverse_standard_normal(p: f64) -> f64 {
    let tail = |q: f64| horner(&ACKLAM_C, q) / (horner(&ACKLAM_D, q) * q + 1.0);
    let x = if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        horner(&ACKLAM_A, r) * q / (horner(&ACKLAM_B, r) * r + 1.0)
    };

    let e = standard_normal_cdf(x) - p;
    let u = e * (2.0 * PI).sqrt() * (x * x / 2.0).exp();
    let refined = x - u / (1.0 + x * u / 2.0);
    if refined.is_finite() {
        refined
    } else {
        x
    }
}

fn open_probability(value: &Value) -> CalcResult<f64> {
    let p = validate_probability(value)?;
    if p == 0.0 || p == 1.0 {
        return Err(ErrorCode::Num);
    }
    Ok(p)
}

/// NORM.S.INV(probability)
pub fn fn_norm_s_inv(args: &[Value], _ctx: &EvaluationContext) -> Value {
    lift1(arg(args, 0), |p| {
        Ok(Value::number(inverse_standard_normal(open_probability(p)?)))
    })
}

/// NORM.INV(probability, mean, standard_dev)
pub fn fn_norm_inv(args: &[Value], _ctx: &EvaluationContext) -> Value {
    lift3(arg(args, 0), arg(args, 1), arg(args, 2), |p, m, sd| {
        let p = open_probability(p)?;
        let m = validate_float(m)?;
        let sd = validate_float(sd)?;
        if sd <= 0.0 {
            return Err(ErrorCode::Num);
        }
        Ok(Value::number(m + sd * inverse_standard_normal(p)))
    })
}

//! Element-wise application of scalar functions over array arguments
//!
//! Any function written against scalars can accept arrays by routing its
//! arguments through [`lift1`] or [`lift_n`]. The result takes the bounding
//! shape of all array arguments:
//!
//! - scalars and 1x1 arrays are reused for every element
//! - a single row is repeated down, a single column is repeated across
//! - any other coordinate outside an argument's bounds reads as `#N/A`
//!
//! Each element is computed independently, so an error in one cell never
//! leaks into its neighbours.

use crate::coerce::CalcResult;
use crate::value::{Array, Value};
use sheetcalc_core::ErrorCode;

static NOT_AVAILABLE: Value = Value::Error(ErrorCode::Na);

/// Bounding `(rows, cols)` of all array arguments, or `None` if none is an array
pub fn result_shape(args: &[&Value]) -> Option<(usize, usize)> {
    args.iter()
        .filter_map(|value| match value {
            Value::Array(array) => Some((array.rows(), array.cols())),
            _ => None,
        })
        .reduce(|(r1, c1), (r2, c2)| (r1.max(r2), c1.max(c2)))
}

/// The element of `value` paired with result coordinate `(row, col)`
pub fn element_at(value: &Value, row: usize, col: usize) -> &Value {
    let Value::Array(array) = value else {
        return value;
    };
    let found = if array.is_1x1() {
        Some(array.top_left())
    } else if array.rows() == 1 {
        array.get(0, col)
    } else if array.cols() == 1 {
        array.get(row, 0)
    } else {
        array.get(row, col)
    };
    found.unwrap_or(&NOT_AVAILABLE)
}

/// Apply `f` to a single argument, element-wise if it is an array
pub fn lift1(value: &Value, f: impl Fn(&Value) -> CalcResult<Value>) -> Value {
    lift_n(&[value], |args| f(args[0]))
}

/// Apply `f` to two arguments with broadcasting
pub fn lift2(a: &Value, b: &Value, f: impl Fn(&Value, &Value) -> CalcResult<Value>) -> Value {
    lift_n(&[a, b], |args| f(args[0], args[1]))
}

/// Apply `f` to three arguments with broadcasting
pub fn lift3(
    a: &Value,
    b: &Value,
    c: &Value,
    f: impl Fn(&Value, &Value, &Value) -> CalcResult<Value>,
) -> Value {
    lift_n(&[a, b, c], |args| f(args[0], args[1], args[2]))
}

/// Apply `f` to any number of arguments with broadcasting
///
/// `f` always receives scalars when at least one argument is an array.
/// With no array arguments it is called once with the arguments as given.
pub fn lift_n(args: &[&Value], f: impl Fn(&[&Value]) -> CalcResult<Value>) -> Value {
    let Some((rows, cols)) = result_shape(args) else {
        return f(args).unwrap_or_else(Value::Error);
    };

    let mut out = Vec::with_capacity(rows * cols);
    let mut scalars: Vec<&Value> = Vec::with_capacity(args.len());
    for row in 0..rows {
        for col in 0..cols {
            scalars.clear();
            scalars.extend(args.iter().map(|arg| element_at(arg, row, col)));
            out.push(f(&scalars).unwrap_or_else(Value::Error));
        }
    }
    Value::Array(Array::new(rows, cols, out))
}

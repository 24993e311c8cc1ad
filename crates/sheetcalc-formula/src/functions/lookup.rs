//! Lookup and reference functions

use super::{arg, optional_arg};
use crate::ast::Expr;
use crate::broadcast::lift1;
use crate::coerce::lookup::validate_positive_int;
use crate::coerce::CalcResult;
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::evaluator::{evaluate, resolve_reference};
use crate::value::{Array, Value};
use sheetcalc_core::ErrorCode;

fn as_array(value: &Value) -> Array {
    match value {
        Value::Array(array) => array.clone(),
        scalar => Array::new(1, 1, vec![scalar.clone()]),
    }
}

fn pick_index(array: &Array, row: usize, col: usize) -> CalcResult<Value> {
    let (rows, cols) = (array.rows(), array.cols());
    if row > rows || col > cols {
        return Err(ErrorCode::Ref);
    }
    match (row, col) {
        (0, 0) => Ok(Value::Array(array.clone())),
        (0, col) => {
            let column = (0..rows)
                .filter_map(|r| array.get(r, col - 1).cloned())
                .collect();
            Ok(Value::Array(Array::new(rows, 1, column)))
        }
        (row, 0) if cols == 1 => array.get(row - 1, 0).cloned().ok_or(ErrorCode::Ref),
        (row, 0) => {
            let line = array.iter_rows().nth(row - 1).ok_or(ErrorCode::Ref)?.to_vec();
            Ok(Value::Array(Array::new(1, cols, line)))
        }
        (row, col) => array.get(row - 1, col - 1).cloned().ok_or(ErrorCode::Ref),
    }
}

/// INDEX(array, row_num, [column_num])
///
/// A zero row or column selects the whole column or row. With a single-row
/// array and no column, `row_num` picks the column.
pub fn fn_index(args: &[Value], _ctx: &EvaluationContext) -> Value {
    index(args).unwrap_or_else(Value::Error)
}

fn index(args: &[Value]) -> CalcResult<Value> {
    let array = as_array(arg(args, 0));
    let row = validate_positive_int(arg(args, 1), true)? as usize;
    let (row, col) = match optional_arg(args, 2) {
        Some(col) => (row, validate_positive_int(col, true)? as usize),
        None if array.rows() == 1 && array.cols() > 1 => (1, row),
        None => (row, 0),
    };
    pick_index(&array, row, col)
}

/// CHOOSE(index_num, value1, [value2], ...)
pub fn fn_choose(args: &[Value], _ctx: &EvaluationContext) -> Value {
    let choices = &args[1.min(args.len())..];
    let pick = |index: &Value| -> CalcResult<Value> {
        let i = validate_positive_int(index, false)? as usize;
        choices.get(i - 1).cloned().ok_or(ErrorCode::Value)
    };
    match arg(args, 0) {
        index @ Value::Array(_) => lift1(index, pick),
        index => pick(index).unwrap_or_else(Value::Error),
    }
}

/// `(rows, cols)` of a reference or of an evaluated value
fn dimensions(expr: &Expr, ctx: &EvaluationContext) -> FormulaResult<CalcResult<(usize, usize)>> {
    let range = match expr {
        Expr::Reference(range_ref) => match resolve_reference(range_ref, ctx) {
            Ok(reference) => reference.range,
            Err(err) => return Ok(Err(err.error_code())),
        },
        Expr::Name(name) => match ctx.resolver.resolve_name(name) {
            Some(reference) => reference.range,
            None => return Ok(Err(ErrorCode::Name)),
        },
        _ => {
            return Ok(match evaluate(expr, ctx)? {
                Value::Array(array) => Ok((array.rows(), array.cols())),
                Value::Error(e) => Err(e),
                _ => Ok((1, 1)),
            })
        }
    };
    Ok(Ok((range.row_count() as usize, range.col_count() as usize)))
}

/// ROWS(array): counted from the reference, cells are never read
pub fn fn_rows(args: &[Expr], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(match dimensions(&args[0], ctx)? {
        Ok((rows, _)) => Value::Number(rows as f64),
        Err(e) => Value::Error(e),
    })
}

pub fn fn_columns(args: &[Expr], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(match dimensions(&args[0], ctx)? {
        Ok((_, cols)) => Value::Number(cols as f64),
        Err(e) => Value::Error(e),
    })
}

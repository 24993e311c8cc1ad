//! SUBTOTAL
//!
//! `SUBTOTAL(code, ref1, ...)` aggregates its references with one of eleven
//! functions. Codes 1-11 use every cell; codes 101-111 also skip rows that
//! are hidden. Cells whose own formula calls SUBTOTAL or AGGREGATE are
//! always skipped so nested subtotals are not counted twice.

use super::{math, statistical, EagerFn};
use crate::ast::Expr;
use crate::coerce::numeric::validate_numeric_null_bool;
use crate::context::{EvaluationContext, Reference};
use crate::error::FormulaResult;
use crate::evaluator::{evaluate, resolve_reference};
use crate::value::{Array, Value};
use lazy_regex::regex_is_match;
use sheetcalc_core::ErrorCode;

/// The aggregate a SUBTOTAL code selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateCode {
    Average = 1,
    Count,
    CountA,
    Max,
    Min,
    Product,
    StDev,
    StDevP,
    Sum,
    Var,
    VarP,
}

/// Implementations indexed by `code - 1`
static AGGREGATES: [EagerFn; 11] = [
    statistical::fn_average,
    statistical::fn_count,
    statistical::fn_counta,
    statistical::fn_max,
    statistical::fn_min,
    math::fn_product,
    statistical::fn_stdev,
    statistical::fn_stdevp,
    math::fn_sum,
    statistical::fn_var,
    statistical::fn_varp,
];

impl AggregateCode {
    pub const ALL: [AggregateCode; 11] = [
        AggregateCode::Average,
        AggregateCode::Count,
        AggregateCode::CountA,
        AggregateCode::Max,
        AggregateCode::Min,
        AggregateCode::Product,
        AggregateCode::StDev,
        AggregateCode::StDevP,
        AggregateCode::Sum,
        AggregateCode::Var,
        AggregateCode::VarP,
    ];

    /// Map 1..=11 to an aggregate
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|code| code.checked_sub(1))
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn implementation(self) -> EagerFn {
        AGGREGATES[self as usize - 1]
    }
}

/// A formula that itself computes a subtotal
fn is_nested_subtotal(formula: &str) -> bool {
    regex_is_match!(r"^=.*\b(SUBTOTAL|AGGREGATE)\s*\("i, formula)
}

/// Read the cells of a reference that survive filtering
///
/// Returns `None` when every cell was filtered out.
fn visible_values(reference: &Reference, skip_hidden: bool, ctx: &EvaluationContext) -> Option<Value> {
    let resolver = ctx.resolver;
    let sheet = reference.sheet;
    let mut hidden = 0usize;
    let mut nested = 0usize;
    let mut values = Vec::new();

    for addr in reference.range.cells() {
        if skip_hidden && resolver.is_row_hidden(sheet, addr.row) {
            hidden += 1;
            continue;
        }
        if resolver
            .cell_formula(sheet, addr.row, addr.col)
            .map_or(false, is_nested_subtotal)
        {
            nested += 1;
            continue;
        }
        values.push(resolver.cell_value(sheet, addr.row, addr.col));
    }

    tracing::debug!(
        "SUBTOTAL over {}: {} cells kept, {} hidden, {} nested subtotals",
        reference.range,
        values.len(),
        hidden,
        nested
    );

    if values.is_empty() {
        return None;
    }
    let count = values.len();
    Some(Value::Array(Array::new(1, count, values)))
}

/// SUBTOTAL(function_code, ref1, [ref2], ...)
pub fn fn_subtotal(args: &[Expr], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let code = evaluate(&args[0], ctx)?;
    let code = match code.as_scalar() {
        Value::Array(_) => return Ok(Value::Error(ErrorCode::Value)),
        scalar => match validate_numeric_null_bool(scalar) {
            Ok(code) => code.trunc() as i64,
            Err(e) => return Ok(Value::Error(e)),
        },
    };

    let skip_hidden = code > 100;
    let Some(aggregate) = AggregateCode::from_code(if skip_hidden { code - 100 } else { code }) else {
        return Ok(Value::Error(ErrorCode::Value));
    };

    let mut operands = Vec::with_capacity(args.len() - 1);
    for arg in &args[1..] {
        let reference = match arg {
            Expr::Reference(range_ref) => match resolve_reference(range_ref, ctx) {
                Ok(reference) => Some(reference),
                Err(err) => return Ok(Value::Error(err.error_code())),
            },
            Expr::Name(name) => match ctx.resolver.resolve_name(name) {
                Some(reference) => Some(reference),
                None => return Ok(Value::Error(ErrorCode::Name)),
            },
            _ => None,
        };
        match reference {
            Some(reference) => operands.extend(visible_values(&reference, skip_hidden, ctx)),
            None => operands.push(evaluate(arg, ctx)?),
        }
    }

    Ok(aggregate.implementation()(&operands, ctx))
}

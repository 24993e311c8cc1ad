//! Formula evaluator
//!
//! Walks an [`Expr`] tree and produces a [`Value`]. Spreadsheet errors travel
//! as values; only structural problems (unknown functions, wrong argument
//! counts) come back as [`FormulaError`].

use crate::ast::{BinaryOperator, Expr, RangeRef, UnaryOperator};
use crate::broadcast::{lift1, lift2};
use crate::coerce::numeric::validate_numeric_null_bool;
use crate::coerce::CalcResult;
use crate::context::{EvaluationContext, Reference};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{builtin_functions, FunctionDef, FunctionKind};
use crate::parser::parse_formula;
use crate::value::{format_number, Array, Value};
use sheetcalc_core::ErrorCode;
use std::cmp::Ordering;

/// Evaluate a formula expression
pub fn evaluate(expr: &Expr, ctx: &EvaluationContext) -> FormulaResult<Value> {
    match expr {
        // === Literals ===
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Error(e) => Ok(Value::Error(*e)),
        Expr::Missing => Ok(Value::Empty),

        // === References ===
        Expr::Reference(range_ref) => match resolve_reference(range_ref, ctx) {
            Ok(reference) => Ok(ctx.reference_values(&reference)),
            Err(err) => {
                tracing::debug!("{err}");
                Ok(Value::Error(err.error_code()))
            }
        },
        Expr::Name(name) => Ok(match ctx.resolver.resolve_name(name) {
            Some(reference) => ctx.reference_values(&reference),
            None => {
                tracing::debug!("undefined name {name}");
                Value::Error(ErrorCode::Name)
            }
        }),

        // === Operators ===
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, ctx)?;
            Ok(evaluate_unary_op(*op, &value))
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            Ok(evaluate_binary_op(*op, &left, &right, ctx))
        }

        // === Functions ===
        Expr::Function { name, args } => evaluate_function(name, args, ctx),

        // === Arrays ===
        Expr::Array(rows) => {
            let mut values = Vec::with_capacity(rows.len());
            for row in rows {
                let mut items = Vec::with_capacity(row.len());
                for item in row {
                    items.push(evaluate(item, ctx)?.into_scalar());
                }
                values.push(items);
            }
            Ok(Value::Array(Array::from_rows(values)))
        }
    }
}

/// Map a parsed reference onto a sheet index
///
/// Fails with [`FormulaError::InvalidReference`] when the sheet is unknown.
pub fn resolve_reference(range_ref: &RangeRef, ctx: &EvaluationContext) -> FormulaResult<Reference> {
    ctx.resolve_sheet(range_ref.sheet.as_deref())
        .map(|sheet| Reference {
            sheet,
            range: range_ref.range,
        })
        .ok_or_else(|| FormulaError::InvalidReference(range_ref.to_string()))
}

/// Parse and evaluate formula text for a cell
///
/// Never fails: structural problems become the error value the cell shows.
pub fn evaluate_cell_formula(formula: &str, ctx: &EvaluationContext) -> Value {
    match parse_formula(formula).and_then(|expr| evaluate(&expr, ctx)) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!("formula {formula:?} failed: {err}");
            Value::Error(err.error_code())
        }
    }
}

/// Call a built-in function with already evaluated arguments
///
/// Functions that normally see their arguments unevaluated receive them as
/// constants, so reference-only behaviour (hidden-row filtering) does not
/// apply here.
pub fn call_function(name: &str, args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let def = lookup_function(name, args.len())?;
    tracing::trace!("call {}({} args)", def.name, args.len());
    match def.kind {
        FunctionKind::Eager(f) => Ok(f(args, ctx)),
        FunctionKind::Lazy(f) => {
            let exprs: Vec<Expr> = args.iter().map(value_to_expr).collect();
            f(&exprs, ctx)
        }
    }
}

fn lookup_function(name: &str, arg_count: usize) -> FormulaResult<&'static FunctionDef> {
    let def = builtin_functions().get(name).ok_or_else(|| {
        tracing::debug!("unknown function {name}");
        FormulaError::UnknownFunction(name.to_uppercase())
    })?;

    let too_few = arg_count < def.min_args;
    let too_many = def.max_args.map_or(false, |max| arg_count > max);
    if too_few || too_many {
        tracing::debug!(
            "{} called with {} arguments, expected {}",
            def.name,
            arg_count,
            def.arity()
        );
        return Err(FormulaError::ArgumentCount {
            function: def.name.to_string(),
            expected: def.arity(),
            actual: arg_count,
        });
    }
    Ok(def)
}

fn value_to_expr(value: &Value) -> Expr {
    match value {
        Value::Number(n) => Expr::Number(*n),
        Value::Text(s) => Expr::Text(s.clone()),
        Value::Boolean(b) => Expr::Boolean(*b),
        Value::Error(e) => Expr::Error(*e),
        Value::Empty => Expr::Missing,
        Value::Array(array) => Expr::Array(
            array
                .iter_rows()
                .map(|row| row.iter().map(value_to_expr).collect())
                .collect(),
        ),
    }
}

fn evaluate_function(name: &str, args: &[Expr], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let def = lookup_function(name, args.len())?;
    tracing::trace!("call {}({} args)", def.name, args.len());

    match def.kind {
        FunctionKind::Lazy(f) => f(args, ctx),
        FunctionKind::Eager(f) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, ctx)?);
            }
            Ok(f(&values, ctx))
        }
    }
}

fn evaluate_unary_op(op: UnaryOperator, value: &Value) -> Value {
    match op {
        UnaryOperator::Plus => value.clone(),
        UnaryOperator::Negate => lift1(value, |v| Ok(Value::number(-validate_numeric_null_bool(v)?))),
        UnaryOperator::Percent => {
            lift1(value, |v| Ok(Value::number(validate_numeric_null_bool(v)? / 100.0)))
        }
    }
}

/// Apply a binary operator element-wise; the left operand's error wins
pub fn evaluate_binary_op(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    ctx: &EvaluationContext,
) -> Value {
    lift2(left, right, |l, r| {
        if let Some(e) = l.error().or_else(|| r.error()) {
            return Err(e);
        }
        if op.is_comparison() {
            let ordering = compare_values(l, r);
            let result = match op {
                BinaryOperator::Equal => ordering == Ordering::Equal,
                BinaryOperator::NotEqual => ordering != Ordering::Equal,
                BinaryOperator::LessThan => ordering == Ordering::Less,
                BinaryOperator::LessEqual => ordering != Ordering::Greater,
                BinaryOperator::GreaterThan => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            return Ok(Value::Boolean(result));
        }
        if op == BinaryOperator::Concat {
            return Ok(Value::Text(concat_text(l, ctx) + &concat_text(r, ctx)));
        }
        arithmetic(op, validate_numeric_null_bool(l)?, validate_numeric_null_bool(r)?)
    })
}

fn arithmetic(op: BinaryOperator, l: f64, r: f64) -> CalcResult<Value> {
    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide if r == 0.0 => return Err(ErrorCode::Div0),
        BinaryOperator::Divide => l / r,
        BinaryOperator::Power if l == 0.0 && r == 0.0 => return Err(ErrorCode::Num),
        BinaryOperator::Power if l == 0.0 && r < 0.0 => return Err(ErrorCode::Div0),
        BinaryOperator::Power => l.powf(r),
        _ => return Err(ErrorCode::Value),
    };
    Ok(Value::number(result))
}

fn concat_text(value: &Value, ctx: &EvaluationContext) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        Value::Text(s) => s.clone(),
        Value::Boolean(b) => ctx.settings.boolean_token(*b).to_string(),
        _ => String::new(),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) | Value::Empty => 0,
        Value::Text(_) => 1,
        Value::Boolean(_) => 2,
        Value::Error(_) | Value::Array(_) => 3,
    }
}

/// Order two scalars the way spreadsheet comparisons do
///
/// Numbers sort before text, text before booleans. Text compares
/// case-insensitively. A blank takes the zero value of the other side's
/// type (0, "" or FALSE).
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    let blank_like = |other: &Value| match other {
        Value::Text(_) => Value::Text(String::new()),
        Value::Boolean(_) => Value::Boolean(false),
        _ => Value::Number(0.0),
    };
    let left_owned;
    let right_owned;
    let (left, right) = match (left, right) {
        (Value::Empty, Value::Empty) => return Ordering::Equal,
        (Value::Empty, other) => {
            left_owned = blank_like(other);
            (&left_owned, other)
        }
        (other, Value::Empty) => {
            right_owned = blank_like(other);
            (other, &right_owned)
        }
        pair => pair,
    };

    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.partial_cmp(r).unwrap_or(Ordering::Equal),
        (Value::Text(l), Value::Text(r)) => l.to_lowercase().cmp(&r.to_lowercase()),
        (Value::Boolean(l), Value::Boolean(r)) => l.cmp(r),
        (l, r) => type_rank(l).cmp(&type_rank(r)),
    }
}

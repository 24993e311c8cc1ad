//! Logical functions

use super::arg;
use crate::ast::Expr;
use crate::broadcast::{lift1, lift3};
use crate::coerce::CalcResult;
use crate::compat::CalcSettings;
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::evaluator::evaluate;
use crate::value::Value;
use sheetcalc_core::ErrorCode;

/// Truth value of one flattened argument; `None` for blanks
fn truth_value(value: &Value, settings: &CalcSettings) -> CalcResult<Option<bool>> {
    match value {
        Value::Empty => Ok(None),
        Value::Boolean(b) => Ok(Some(*b)),
        Value::Number(n) => Ok(Some(*n != 0.0)),
        Value::Text(s) => settings.parse_boolean(s).map(Some).ok_or(ErrorCode::Value),
        Value::Error(e) => Err(*e),
        Value::Array(_) => Err(ErrorCode::Value),
    }
}

/// Count `(true, total)` over every scalar of every argument, skipping blanks
fn count_true_values(args: &[Value], settings: &CalcSettings) -> CalcResult<(usize, usize)> {
    let mut true_count = 0;
    let mut total = 0;
    for value in args.iter().flat_map(Value::scalars) {
        if let Some(b) = truth_value(value, settings)? {
            total += 1;
            true_count += usize::from(b);
        }
    }
    Ok((true_count, total))
}

fn logical_result(args: &[Value], ctx: &EvaluationContext, rule: fn(usize, usize) -> bool) -> Value {
    match count_true_values(args, ctx.settings) {
        Ok((true_count, total)) => Value::Boolean(rule(true_count, total)),
        Err(e) => Value::Error(e),
    }
}

/// AND: true when every non-blank argument is true
pub fn fn_and(args: &[Value], ctx: &EvaluationContext) -> Value {
    logical_result(args, ctx, |t, total| t > 0 && t == total)
}

/// OR: true when at least one argument is true
pub fn fn_or(args: &[Value], ctx: &EvaluationContext) -> Value {
    logical_result(args, ctx, |t, _| t > 0)
}

/// XOR: true when an odd number of arguments are true
pub fn fn_xor(args: &[Value], ctx: &EvaluationContext) -> Value {
    logical_result(args, ctx, |t, _| t % 2 == 1)
}

/// NOT, element-wise over arrays
pub fn fn_not(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift1(arg(args, 0), |value| {
        let b = truth_value(value, ctx.settings)?.unwrap_or(false);
        Ok(Value::Boolean(!b))
    })
}

pub fn fn_true(_args: &[Value], _ctx: &EvaluationContext) -> Value {
    Value::Boolean(true)
}

pub fn fn_false(_args: &[Value], _ctx: &EvaluationContext) -> Value {
    Value::Boolean(false)
}

/// A skipped branch (`IF(A1,,1)`) yields 0
fn evaluate_branch(expr: Option<&Expr>, default: Value, ctx: &EvaluationContext) -> FormulaResult<Value> {
    match expr {
        None => Ok(default),
        Some(Expr::Missing) => Ok(Value::Number(0.0)),
        Some(expr) => evaluate(expr, ctx),
    }
}

/// IF: only the branch that is taken gets evaluated
///
/// An array condition evaluates both branches and picks per element.
pub fn fn_if(args: &[Expr], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let condition = evaluate(&args[0], ctx)?;

    if condition.is_array() {
        let when_true = evaluate_branch(args.get(1), Value::Boolean(true), ctx)?;
        let when_false = evaluate_branch(args.get(2), Value::Boolean(false), ctx)?;
        return Ok(lift3(&condition, &when_true, &when_false, |c, t, f| {
            let take = truth_value(c, ctx.settings)?.unwrap_or(false);
            Ok(if take { t.clone() } else { f.clone() })
        }));
    }

    match truth_value(&condition, ctx.settings) {
        Ok(Some(true)) => evaluate_branch(args.get(1), Value::Boolean(true), ctx),
        Ok(_) => evaluate_branch(args.get(2), Value::Boolean(false), ctx),
        Err(e) => Ok(Value::Error(e)),
    }
}

fn replace_errors(
    args: &[Expr],
    ctx: &EvaluationContext,
    matches: fn(ErrorCode) -> bool,
) -> FormulaResult<Value> {
    let value = evaluate(&args[0], ctx)?;
    let caught = |v: &Value| v.error().map_or(false, matches);

    if !value.scalars().any(caught) {
        return Ok(value);
    }
    let fallback = evaluate_branch(args.get(1), Value::Number(0.0), ctx)?.into_scalar();
    Ok(match value {
        Value::Array(array) => Value::Array(array.map(|v| {
            if caught(v) {
                fallback.clone()
            } else {
                v.clone()
            }
        })),
        _ => fallback,
    })
}

/// IFERROR: the fallback is evaluated only if an error shows up
pub fn fn_iferror(args: &[Expr], ctx: &EvaluationContext) -> FormulaResult<Value> {
    replace_errors(args, ctx, |_| true)
}

/// IFNA: like IFERROR but only for `#N/A`
pub fn fn_ifna(args: &[Expr], ctx: &EvaluationContext) -> FormulaResult<Value> {
    replace_errors(args, ctx, |e| e.is_na())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::CompatibilityMode;
    use crate::evaluator::evaluate_cell_formula;
    use crate::value::Array;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn eval(formula: &str) -> Value {
        evaluate_cell_formula(formula, &EvaluationContext::simple())
    }

    fn ctx() -> EvaluationContext<'static> {
        EvaluationContext::simple()
    }

    #[test]
    fn test_and() {
        assert_eq!(eval("=AND(TRUE,TRUE)"), Value::Boolean(true));
        assert_eq!(eval("=AND(TRUE,FALSE)"), Value::Boolean(false));
        assert_eq!(eval("=AND(1,2,\"true\")"), Value::Boolean(true));
        assert_eq!(eval("=AND({1,1,0})"), Value::Boolean(false));
        assert_eq!(eval("=AND(TRUE,\"maybe\")"), Value::Error(ErrorCode::Value));
    }

    #[test]
    fn test_blank_only_arguments_are_false() {
        assert_eq!(fn_and(&[Value::Empty], &ctx()), Value::Boolean(false));
        assert_eq!(fn_or(&[Value::Empty], &ctx()), Value::Boolean(false));
        assert_eq!(fn_xor(&[Value::Empty, Value::Empty], &ctx()), Value::Boolean(false));
        assert_eq!(fn_and(&[Value::Empty, Value::Boolean(true)], &ctx()), Value::Boolean(true));
        assert_eq!(eval("=AND()"), Value::Error(ErrorCode::Value));
    }

    #[test]
    fn test_or_and_xor() {
        assert_eq!(eval("=OR(FALSE,0,1)"), Value::Boolean(true));
        assert_eq!(eval("=OR(FALSE,0)"), Value::Boolean(false));
        assert_eq!(eval("=XOR(TRUE,TRUE)"), Value::Boolean(false));
        assert_eq!(eval("=XOR(TRUE,TRUE,TRUE)"), Value::Boolean(true));
    }

    #[test]
    fn test_errors_propagate() {
        assert_eq!(eval("=OR(TRUE,#N/A)"), Value::Error(ErrorCode::Na));
        assert_eq!(eval("=NOT(#DIV/0!)"), Value::Error(ErrorCode::Div0));
    }

    #[test]
    fn test_not_text() {
        assert_eq!(eval("=NOT(\"TRUE\")"), Value::Boolean(false));
        assert_eq!(eval("=NOT(\"false\")"), Value::Boolean(true));
        assert_eq!(eval("=NOT(\"anything else\")"), Value::Error(ErrorCode::Value));
        assert_eq!(fn_not(&[Value::Empty], &ctx()), Value::Boolean(true));
        assert_eq!(eval("=NOT(0)"), Value::Boolean(true));
    }

    #[test]
    fn test_localized_tokens() {
        let settings = CalcSettings::new(CompatibilityMode::Excel).with_boolean_tokens("WAHR", "FALSCH");
        let ctx = EvaluationContext::with_settings(&settings);
        assert_eq!(evaluate_cell_formula("=NOT(\"wahr\")", &ctx), Value::Boolean(false));
        assert_eq!(evaluate_cell_formula("=AND(\"WAHR\",\"TRUE\")", &ctx), Value::Boolean(true));
        assert_eq!(
            evaluate_cell_formula("=OR(\"FALSCH\")", &ctx),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_not_broadcasts() {
        assert_eq!(
            eval("=NOT({TRUE,0;\"x\",1})"),
            Value::Array(Array::new(
                2,
                2,
                vec![
                    Value::Boolean(false),
                    Value::Boolean(true),
                    Value::Error(ErrorCode::Value),
                    Value::Boolean(false),
                ]
            ))
        );
    }

    #[test]
    fn test_if_short_circuits() {
        // the untaken branch would fail structurally if it were evaluated
        assert_eq!(eval("=IF(TRUE,1,NOSUCH())"), Value::Number(1.0));
        assert_eq!(eval("=IF(0,NOSUCH(),2)"), Value::Number(2.0));
        assert_eq!(eval("=IF(FALSE,1)"), Value::Boolean(false));
        assert_eq!(eval("=IF(TRUE,,1)"), Value::Number(0.0));
        assert_eq!(eval("=IF(\"x\",1,2)"), Value::Error(ErrorCode::Value));
        assert_eq!(eval("=IF(#REF!,1,2)"), Value::Error(ErrorCode::Ref));
    }

    #[test]
    fn test_if_needs_a_branch() {
        assert_eq!(eval("=IF(TRUE)"), Value::Error(ErrorCode::Value));
    }

    #[test]
    fn test_if_array_condition() {
        assert_eq!(
            eval("=IF({TRUE,FALSE},\"y\",\"n\")"),
            Value::Array(Array::new(1, 2, vec![Value::text("y"), Value::text("n")]))
        );
    }

    #[test]
    fn test_iferror_and_ifna() {
        assert_eq!(eval("=IFERROR(1/0,\"bad\")"), Value::text("bad"));
        assert_eq!(eval("=IFERROR(5,NOSUCH())"), Value::Number(5.0));
        assert_eq!(eval("=IFNA(#N/A,7)"), Value::Number(7.0));
        assert_eq!(eval("=IFNA(1/0,7)"), Value::Error(ErrorCode::Div0));
        assert_eq!(
            eval("=IFERROR({1,#NUM!},0)"),
            Value::Array(Array::new(1, 2, vec![Value::Number(1.0), Value::Number(0.0)]))
        );
    }

    #[test]
    fn test_true_false_functions() {
        assert_eq!(eval("=TRUE()"), Value::Boolean(true));
        assert_eq!(eval("=FALSE()"), Value::Boolean(false));
    }

    proptest! {
        #[test]
        fn prop_xor_is_parity_of_true_count(flags in proptest::collection::vec(any::<bool>(), 1..12)) {
            let args: Vec<Value> = flags.iter().copied().map(Value::Boolean).collect();
            let trues = flags.iter().filter(|b| **b).count();
            prop_assert_eq!(fn_xor(&args, &ctx()), Value::Boolean(trues % 2 == 1));
            prop_assert_eq!(fn_and(&args, &ctx()), Value::Boolean(trues == flags.len()));
            prop_assert_eq!(fn_or(&args, &ctx()), Value::Boolean(trues > 0));
        }
    }
}

//! Information functions

use super::arg;
use crate::broadcast::lift1;
use crate::context::EvaluationContext;
use crate::value::Value;
use sheetcalc_core::ErrorCode;

fn test_each(args: &[Value], predicate: fn(&Value) -> bool) -> Value {
    lift1(arg(args, 0), |value| Ok(Value::Boolean(predicate(value))))
}

/// ISERROR(value): any error code
pub fn fn_iserror(args: &[Value], _ctx: &EvaluationContext) -> Value {
    test_each(args, Value::is_error)
}

/// ISERR(value): any error except `#N/A`
pub fn fn_iserr(args: &[Value], _ctx: &EvaluationContext) -> Value {
    test_each(args, |v| v.error().map_or(false, |e| e.is_err()))
}

/// ISNA(value)
pub fn fn_isna(args: &[Value], _ctx: &EvaluationContext) -> Value {
    test_each(args, |v| v.error().map_or(false, |e| e.is_na()))
}

pub fn fn_isnumber(args: &[Value], _ctx: &EvaluationContext) -> Value {
    test_each(args, |v| matches!(v, Value::Number(_)))
}

pub fn fn_istext(args: &[Value], _ctx: &EvaluationContext) -> Value {
    test_each(args, |v| matches!(v, Value::Text(_)))
}

pub fn fn_islogical(args: &[Value], _ctx: &EvaluationContext) -> Value {
    test_each(args, |v| matches!(v, Value::Boolean(_)))
}

/// ISBLANK(value): true only for an empty cell, not for ""
pub fn fn_isblank(args: &[Value], _ctx: &EvaluationContext) -> Value {
    test_each(args, Value::is_empty)
}

/// NA()
pub fn fn_na(_args: &[Value], _ctx: &EvaluationContext) -> Value {
    Value::Error(ErrorCode::Na)
}

/// ERROR.TYPE(value): 1 for `#NULL!` through 14; `#N/A` for non-errors
pub fn fn_error_type(args: &[Value], _ctx: &EvaluationContext) -> Value {
    lift1(arg(args, 0), |value| match value {
        Value::Error(e) => Ok(Value::Number(f64::from(e.type_number()))),
        _ => Err(ErrorCode::Na),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate_cell_formula;
    use crate::value::Array;
    use pretty_assertions::assert_eq;

    fn eval(formula: &str) -> Value {
        evaluate_cell_formula(formula, &EvaluationContext::simple())
    }

    #[test]
    fn test_error_predicates() {
        assert_eq!(eval("=ISERROR(#N/A)"), Value::Boolean(true));
        assert_eq!(eval("=ISERROR(1)"), Value::Boolean(false));
        assert_eq!(eval("=ISERR(#N/A)"), Value::Boolean(false));
        assert_eq!(eval("=ISERR(1/0)"), Value::Boolean(true));
        assert_eq!(eval("=ISNA(#N/A)"), Value::Boolean(true));
        assert_eq!(eval("=ISNA(#VALUE!)"), Value::Boolean(false));
    }

    #[test]
    fn test_error_predicates_keep_shape() {
        assert_eq!(
            eval("=ISERR({1,#N/A;#REF!,\"x\"})"),
            Value::Array(Array::new(
                2,
                2,
                vec![
                    Value::Boolean(false),
                    Value::Boolean(false),
                    Value::Boolean(true),
                    Value::Boolean(false),
                ]
            ))
        );
    }

    #[test]
    fn test_type_predicates() {
        assert_eq!(eval("=ISNUMBER(1.5)"), Value::Boolean(true));
        assert_eq!(eval("=ISNUMBER(\"1.5\")"), Value::Boolean(false));
        assert_eq!(eval("=ISTEXT(\"\")"), Value::Boolean(true));
        assert_eq!(eval("=ISLOGICAL(FALSE)"), Value::Boolean(true));
        assert_eq!(eval("=ISBLANK(A1)"), Value::Boolean(true));
        assert_eq!(eval("=ISBLANK(\"\")"), Value::Boolean(false));
    }

    #[test]
    fn test_na_and_error_type() {
        assert_eq!(eval("=NA()"), Value::Error(ErrorCode::Na));
        assert_eq!(eval("=ERROR.TYPE(1/0)"), Value::Number(2.0));
        assert_eq!(eval("=ERROR.TYPE(NA())"), Value::Number(7.0));
        assert_eq!(eval("=ERROR.TYPE(5)"), Value::Error(ErrorCode::Na));
    }
}

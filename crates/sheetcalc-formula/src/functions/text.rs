//! Text functions

use super::arg;
use crate::broadcast::{lift1, lift2, lift3, lift_n};
use crate::coerce::text::{extract_int, extract_string};
use crate::coerce::CalcResult;
use crate::context::EvaluationContext;
use crate::value::Value;
use sheetcalc_core::ErrorCode;

/// Longest string a cell may hold
pub const MAX_TEXT_LENGTH: usize = 32767;

fn checked_text(s: String) -> CalcResult<Value> {
    if s.chars().count() > MAX_TEXT_LENGTH {
        return Err(ErrorCode::Value);
    }
    Ok(Value::Text(s))
}

/// Count argument of LEFT and RIGHT; omitted means one character
fn char_count(args: &[Value]) -> &Value {
    static ONE: Value = Value::Number(1.0);
    args.get(1).unwrap_or(&ONE)
}

/// LEN(text): length in characters
pub fn fn_len(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift1(arg(args, 0), |v| {
        let s = extract_string(v, ctx.settings)?;
        Ok(Value::Number(s.chars().count() as f64))
    })
}

/// LEFT(text, [num_chars])
pub fn fn_left(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift2(arg(args, 0), char_count(args), |v, n| {
        let s = extract_string(v, ctx.settings)?;
        let n = extract_int(n, 0, 1, false, ctx.settings)? as usize;
        Ok(Value::Text(s.chars().take(n).collect()))
    })
}

/// RIGHT(text, [num_chars])
pub fn fn_right(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift2(arg(args, 0), char_count(args), |v, n| {
        let s = extract_string(v, ctx.settings)?;
        let n = extract_int(n, 0, 1, false, ctx.settings)? as usize;
        let skip = s.chars().count().saturating_sub(n);
        Ok(Value::Text(s.chars().skip(skip).collect()))
    })
}

/// MID(text, start_num, num_chars); `start_num` is 1-based
pub fn fn_mid(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift3(arg(args, 0), arg(args, 1), arg(args, 2), |v, start, len| {
        let s = extract_string(v, ctx.settings)?;
        let start = extract_int(start, 1, 0, false, ctx.settings)? as usize;
        let len = extract_int(len, 0, 0, false, ctx.settings)? as usize;
        Ok(Value::Text(s.chars().skip(start - 1).take(len).collect()))
    })
}

/// REPT(text, number_times)
pub fn fn_rept(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift2(arg(args, 0), arg(args, 1), |v, times| {
        let s = extract_string(v, ctx.settings)?;
        let times = extract_int(times, 0, 0, false, ctx.settings)? as usize;
        if s.chars().count().saturating_mul(times) > MAX_TEXT_LENGTH {
            return Err(ErrorCode::Value);
        }
        Ok(Value::Text(s.repeat(times)))
    })
}

pub fn fn_upper(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift1(arg(args, 0), |v| Ok(Value::Text(extract_string(v, ctx.settings)?.to_uppercase())))
}

pub fn fn_lower(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift1(arg(args, 0), |v| Ok(Value::Text(extract_string(v, ctx.settings)?.to_lowercase())))
}

/// TRIM(text): drop leading and trailing spaces, collapse inner runs to one
pub fn fn_trim(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift1(arg(args, 0), |v| {
        let s = extract_string(v, ctx.settings)?;
        let words: Vec<&str> = s.split(' ').filter(|w| !w.is_empty()).collect();
        Ok(Value::Text(words.join(" ")))
    })
}

/// EXACT(text1, text2): case-sensitive comparison
pub fn fn_exact(args: &[Value], ctx: &EvaluationContext) -> Value {
    lift2(arg(args, 0), arg(args, 1), |a, b| {
        let a = extract_string(a, ctx.settings)?;
        let b = extract_string(b, ctx.settings)?;
        Ok(Value::Boolean(a == b))
    })
}

/// CONCATENATE(text1, ...), element-wise over array arguments
pub fn fn_concatenate(args: &[Value], ctx: &EvaluationContext) -> Value {
    let refs: Vec<&Value> = args.iter().collect();
    lift_n(&refs, |parts| {
        let mut joined = String::new();
        for part in parts {
            joined.push_str(&extract_string(part, ctx.settings)?);
        }
        checked_text(joined)
    })
}

/// CONCAT(text1, ...): joins every element of every argument into one string
pub fn fn_concat(args: &[Value], ctx: &EvaluationContext) -> Value {
    let mut joined = String::new();
    for value in args.iter().flat_map(Value::scalars) {
        match extract_string(value, ctx.settings) {
            Ok(s) => joined.push_str(&s),
            Err(e) => return Value::Error(e),
        }
    }
    checked_text(joined).unwrap_or_else(Value::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::{CalcSettings, CompatibilityMode};
    use crate::evaluator::evaluate_cell_formula;
    use crate::value::Array;
    use pretty_assertions::assert_eq;

    fn eval(formula: &str) -> Value {
        evaluate_cell_formula(formula, &EvaluationContext::simple())
    }

    fn eval_mode(mode: CompatibilityMode, formula: &str) -> Value {
        let settings = CalcSettings::new(mode);
        evaluate_cell_formula(formula, &EvaluationContext::with_settings(&settings))
    }

    #[test]
    fn test_len_counts_characters() {
        assert_eq!(eval("=LEN(\"héllo\")"), Value::Number(5.0));
        assert_eq!(eval("=LEN(12.5)"), Value::Number(4.0));
        assert_eq!(eval("=LEN(TRUE)"), Value::Number(4.0));
        assert_eq!(eval_mode(CompatibilityMode::OpenOffice, "=LEN(TRUE)"), Value::Number(1.0));
    }

    #[test]
    fn test_left_right_mid() {
        assert_eq!(eval("=LEFT(\"spreadsheet\",6)"), Value::text("spread"));
        assert_eq!(eval("=LEFT(\"abc\")"), Value::text("a"));
        assert_eq!(eval("=RIGHT(\"abc\",2)"), Value::text("bc"));
        assert_eq!(eval("=RIGHT(\"abc\",10)"), Value::text("abc"));
        assert_eq!(eval("=MID(\"spreadsheet\",7,5)"), Value::text("sheet"));
        assert_eq!(eval("=MID(\"abc\",5,1)"), Value::text(""));
        assert_eq!(eval("=MID(\"abc\",0,1)"), Value::Error(ErrorCode::Value));
        assert_eq!(eval("=LEFT(\"abc\",-1)"), Value::Error(ErrorCode::Value));
    }

    #[test]
    fn test_blank_count_depends_on_mode() {
        assert_eq!(eval("=LEFT(\"abc\",)"), Value::text(""));
        assert_eq!(
            eval_mode(CompatibilityMode::Gnumeric, "=LEFT(\"abc\",)"),
            Value::text("a")
        );
    }

    #[test]
    fn test_boolean_count_rejected_in_openoffice() {
        assert_eq!(eval("=LEFT(\"abc\",TRUE)"), Value::text("a"));
        assert_eq!(
            eval_mode(CompatibilityMode::OpenOffice, "=LEFT(\"abc\",TRUE)"),
            Value::Error(ErrorCode::Value)
        );
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(eval("=UPPER(\"MiXeD\")"), Value::text("MIXED"));
        assert_eq!(eval("=LOWER(\"MiXeD\")"), Value::text("mixed"));
        assert_eq!(eval("=TRIM(\"  a   b  \")"), Value::text("a b"));
        assert_eq!(eval("=EXACT(\"a\",\"A\")"), Value::Boolean(false));
        assert_eq!(eval("=EXACT(1,\"1\")"), Value::Boolean(true));
    }

    #[test]
    fn test_rept() {
        assert_eq!(eval("=REPT(\"ab\",3)"), Value::text("ababab"));
        assert_eq!(eval("=REPT(\"ab\",0)"), Value::text(""));
        assert_eq!(eval("=REPT(\"ab\",20000)"), Value::Error(ErrorCode::Value));
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(eval("=CONCATENATE(\"a\",1,TRUE)"), Value::text("a1TRUE"));
        assert_eq!(
            eval("=CONCATENATE({\"a\",\"b\"},\"!\")"),
            Value::Array(Array::new(1, 2, vec![Value::text("a!"), Value::text("b!")]))
        );
        assert_eq!(eval("=CONCAT({\"a\",\"b\";\"c\",\"d\"},1)"), Value::text("abcd1"));
        assert_eq!(eval("=CONCAT(\"a\",#N/A)"), Value::Error(ErrorCode::Na));
    }

    #[test]
    fn test_errors_pass_through() {
        assert_eq!(eval("=UPPER(1/0)"), Value::Error(ErrorCode::Div0));
        assert_eq!(
            eval("=LEN({\"ab\",#REF!})"),
            Value::Array(Array::new(
                1,
                2,
                vec![Value::Number(2.0), Value::Error(ErrorCode::Ref)]
            ))
        );
    }
}

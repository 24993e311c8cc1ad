//! Tests for formula evaluation against a workbook

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sheetcalc::prelude::*;
use sheetcalc::{call_function, evaluate, evaluate_cell_formula, parse_formula, Array};
use sheetcalc_formula::coerce::{engineering, lookup, statistical};

fn eval(formula: &str) -> Value {
    evaluate_cell_formula(formula, &EvaluationContext::simple())
}

fn eval_in(wb: &Workbook, formula: &str) -> Value {
    wb.evaluate_at(0, "Z100", formula, &CalcSettings::default())
        .unwrap()
}

fn n(x: f64) -> Value {
    Value::Number(x)
}

fn err(code: ErrorCode) -> Value {
    Value::Error(code)
}

/// Test basic formula evaluation without cell references
#[test]
fn test_evaluate_simple_formulas() {
    let ctx = EvaluationContext::simple();

    let ast = parse_formula("=1+2*3").unwrap();
    assert_eq!(evaluate(&ast, &ctx).unwrap(), n(7.0));

    let ast = parse_formula("=\"Hello \"&\"World\"").unwrap();
    assert_eq!(evaluate(&ast, &ctx).unwrap(), Value::text("Hello World"));

    let ast = parse_formula("=5>3").unwrap();
    assert_eq!(evaluate(&ast, &ctx).unwrap(), Value::Boolean(true));
}

#[test]
fn test_call_function_entry_point() {
    let ctx = EvaluationContext::simple();
    assert_eq!(
        call_function("sum", &[n(1.0), n(2.0)], &ctx).unwrap(),
        n(3.0)
    );
    assert!(call_function("NOSUCH", &[], &ctx).is_err());
}

/// Test formula evaluation with cell and range references
#[test]
fn test_evaluate_with_references() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 10.0).unwrap();
    sheet.set_cell_value("A2", 20.0).unwrap();
    sheet.set_cell_value("A3", 30.0).unwrap();
    sheet.set_cell_value("B1", "label").unwrap();

    assert_eq!(eval_in(&wb, "=A1+A2"), n(30.0));
    assert_eq!(eval_in(&wb, "=SUM(A1:A3)"), n(60.0));
    assert_eq!(eval_in(&wb, "=AVERAGE(A1:B3)"), n(20.0));
    assert_eq!(eval_in(&wb, "=COUNTA(A1:B3)"), n(4.0));
    assert_eq!(eval_in(&wb, "=ROWS(A1:B3)"), n(3.0));
    assert_eq!(eval_in(&wb, "=INDEX(A1:A3,2)"), n(20.0));
    assert_eq!(eval_in(&wb, "=UPPER(B1)"), Value::text("LABEL"));
}

#[test]
fn test_cross_sheet_references() {
    let mut wb = Workbook::new();
    let data = wb.add_worksheet_with_name("Data").unwrap();
    wb.worksheet_mut(data)
        .unwrap()
        .set_cell_value("C3", 5.0)
        .unwrap();

    assert_eq!(eval_in(&wb, "=Data!C3*2"), n(10.0));
    assert_eq!(eval_in(&wb, "=Missing!C3"), err(ErrorCode::Ref));
}

#[test]
fn test_defined_names() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 1.0).unwrap();
    sheet.set_cell_value("A2", 2.0).unwrap();
    wb.define_name("Values", 0, CellRange::parse("A1:A2").unwrap())
        .unwrap();

    assert_eq!(eval_in(&wb, "=SUM(Values)"), n(3.0));
    assert_eq!(eval_in(&wb, "=SUM(Unknown)"), err(ErrorCode::Name));
}

#[test]
fn test_standardize_rejects_non_positive_deviation() {
    assert_eq!(eval("=STANDARDIZE(0.5,0.2,0)"), err(ErrorCode::Num));
    assert_eq!(eval("=STANDARDIZE(0.5,0.2,-1)"), err(ErrorCode::Num));
}

#[test]
fn test_logical_functions() {
    assert_eq!(eval("=AND(TRUE,TRUE,1)"), Value::Boolean(true));
    assert_eq!(eval("=AND(TRUE,FALSE)"), Value::Boolean(false));
    assert_eq!(eval("=XOR(TRUE,TRUE,TRUE)"), Value::Boolean(true));
    assert_eq!(eval("=XOR(TRUE,TRUE)"), Value::Boolean(false));

    // nothing but blanks to test
    let wb = Workbook::new();
    assert_eq!(eval_in(&wb, "=AND(A1:A3)"), Value::Boolean(false));
    assert_eq!(eval_in(&wb, "=OR(A1)"), Value::Boolean(false));
    assert_eq!(eval_in(&wb, "=XOR(A1,B1)"), Value::Boolean(false));
    assert_eq!(eval_in(&wb, "=IF(TRUE)"), err(ErrorCode::Value));
}

#[test]
fn test_not_of_boolean_text() {
    assert_eq!(eval("=NOT(\"TRUE\")"), Value::Boolean(false));
    assert_eq!(eval("=NOT(\"FALSE\")"), Value::Boolean(true));
    assert_eq!(eval("=NOT(\"maybe\")"), err(ErrorCode::Value));
}

#[test]
fn test_base_conversion_padding() {
    assert_eq!(
        engineering::nbr_conversion_format("5", Some(3)),
        Ok("005".to_string())
    );
    assert_eq!(
        engineering::nbr_conversion_format("123456", Some(3)),
        Err(ErrorCode::Num)
    );
    assert_eq!(
        engineering::nbr_conversion_format("ABCDEFGHIJKL", None),
        Ok("CDEFGHIJKL".to_string())
    );
}

#[test]
fn test_validate_positive_int() {
    assert_eq!(
        lookup::validate_positive_int(&n(0.0), false),
        Err(ErrorCode::Value)
    );
    assert_eq!(lookup::validate_positive_int(&n(0.0), true), Ok(0));
    assert_eq!(
        lookup::validate_positive_int(&n(-1.0), true),
        Err(ErrorCode::Value)
    );
    assert_eq!(
        lookup::validate_positive_int(&n(-1.0), false),
        Err(ErrorCode::Value)
    );
}

#[test]
fn test_csc_broadcasts_with_independent_errors() {
    assert_eq!(
        eval("=CSC({1,0;\"x\",2})"),
        Value::Array(Array::new(
            2,
            2,
            vec![
                n(1.0 / 1f64.sin()),
                err(ErrorCode::Div0),
                err(ErrorCode::Value),
                n(1.0 / 2f64.sin()),
            ]
        ))
    );
}

/// A1:A5 = 1, 2 (hidden row), 4, =SUBTOTAL(9,A1:A3), 8
fn subtotal_workbook() -> Workbook {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 1.0).unwrap();
    sheet.set_cell_value("A2", 2.0).unwrap();
    sheet.set_cell_value("A3", 4.0).unwrap();
    sheet.set_cell_formula("A4", "=SUBTOTAL(9,A1:A3)").unwrap();
    sheet.set_cell_value("A5", 8.0).unwrap();
    sheet.set_row_hidden(1, true);
    wb.store_formula_result(0, "A4", &CalcSettings::default())
        .unwrap();
    wb
}

#[test]
fn test_subtotal_excludes_hidden_rows_and_nested_subtotals() {
    let wb = subtotal_workbook();
    assert_eq!(eval_in(&wb, "=A4"), n(7.0));
    assert_eq!(eval_in(&wb, "=SUBTOTAL(109,A1:A5)"), n(13.0));
    assert_eq!(eval_in(&wb, "=SUBTOTAL(9,A1:A5)"), n(15.0));
    assert_eq!(eval_in(&wb, "=SUM(A1:A5)"), n(22.0));
}

#[test]
fn test_compatibility_modes() {
    let wb = Workbook::new();
    let excel = CalcSettings::new(CompatibilityMode::Excel);
    let openoffice = CalcSettings::new(CompatibilityMode::OpenOffice);

    assert_eq!(
        wb.evaluate_at(0, "A1", "=DEC2BIN(TRUE)", &excel).unwrap(),
        err(ErrorCode::Value)
    );
    assert_eq!(
        wb.evaluate_at(0, "A1", "=DEC2BIN(TRUE)", &openoffice)
            .unwrap(),
        Value::text("1")
    );
    assert_eq!(
        wb.evaluate_at(0, "A1", "=LEN(TRUE)", &openoffice).unwrap(),
        n(1.0)
    );
}

#[test]
fn test_localized_boolean_tokens() {
    let wb = Workbook::new();
    let settings = CalcSettings::new(CompatibilityMode::Excel).with_boolean_tokens("WAHR", "FALSCH");
    assert_eq!(
        wb.evaluate_at(0, "A1", "=NOT(\"WAHR\")", &settings).unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(
        wb.evaluate_at(0, "A1", "=NOT(\"falsch\")", &settings).unwrap(),
        Value::Boolean(true)
    );
}

#[test]
fn test_structural_failures_become_cell_errors() {
    assert_eq!(eval("=SUM(1,"), err(ErrorCode::Name));
    assert_eq!(eval("=NOSUCHFUNCTION()"), err(ErrorCode::Name));
    assert_eq!(eval("=ABS()"), err(ErrorCode::Value));
}

proptest! {
    #[test]
    fn prop_standardize_matches_formula(
        p in 0.0f64..=1.0,
        mean in -100.0f64..100.0,
        sd in 0.001f64..100.0,
    ) {
        let ctx = EvaluationContext::simple();
        let result = call_function("STANDARDIZE", &[n(p), n(mean), n(sd)], &ctx).unwrap();
        prop_assert_eq!(result, n((p - mean) / sd));
    }

    #[test]
    fn prop_validate_float_round_trips(x in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let value = n(x);
        let coerced = statistical::validate_float(&value).unwrap();
        prop_assert_eq!(n(coerced), value);
    }

    #[test]
    fn prop_xor_is_parity_of_true_arguments(flags in proptest::collection::vec(any::<bool>(), 1..12)) {
        let ctx = EvaluationContext::simple();
        let args: Vec<Value> = flags.iter().map(|b| Value::Boolean(*b)).collect();
        let odd = flags.iter().filter(|b| **b).count() % 2 == 1;
        prop_assert_eq!(call_function("XOR", &args, &ctx).unwrap(), Value::Boolean(odd));
    }
}

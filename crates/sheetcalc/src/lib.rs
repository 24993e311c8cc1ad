//! # sheetcalc
//!
//! Spreadsheet formula calculation.
//!
//! Sheetcalc evaluates spreadsheet formulas against a [`Workbook`] and
//! reproduces the argument coercion rules of Excel, OpenOffice or Gnumeric.
//!
//! ## Features
//!
//! - Formula parsing and evaluation
//! - Logical, math, trigonometric, statistical, lookup, text, engineering
//!   and financial functions
//! - Element-wise evaluation over array arguments
//! - SUBTOTAL aware of hidden rows and nested subtotals
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 10.0).unwrap();
//! sheet.set_cell_value("A2", 32.0).unwrap();
//!
//! let settings = CalcSettings::default();
//! let value = workbook.evaluate_at(0, "B1", "=SUM(A1:A2)", &settings).unwrap();
//! assert_eq!(value, Value::Number(42.0));
//! ```

pub mod evaluation;
pub mod prelude;

pub use evaluation::WorkbookFormulaExt;

// Re-export core types
pub use sheetcalc_core::{
    CellAddress, CellRange, CellValue, DefinedName, Error, ErrorCode, Result, Workbook, Worksheet,
    MAX_COLS, MAX_ROWS, MAX_SHEET_NAME_LEN,
};

// Re-export formula types
pub use sheetcalc_formula::{
    builtin_functions, call_function, evaluate, evaluate_cell_formula, parse_formula, Array,
    CalcResult, CalcSettings, CellResolver, CompatibilityMode, EmptyResolver, EvaluationContext,
    Expr, FormulaError, FormulaResult, FunctionRegistry, Value,
};

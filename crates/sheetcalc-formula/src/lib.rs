//! # sheetcalc-formula
//!
//! Formula parser, value model and function library for sheetcalc.
//!
//! This crate provides:
//! - Formula parsing (text → [`Expr`])
//! - Argument coercion that follows Excel, Gnumeric or OpenOffice rules
//! - Element-wise broadcasting of scalar functions over array arguments
//! - Built-in functions grouped by family (logical, math, statistical, ...)
//! - Evaluation against any [`CellResolver`]
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc_formula::{evaluate_cell_formula, EvaluationContext, Value};
//!
//! let ctx = EvaluationContext::simple();
//! assert_eq!(evaluate_cell_formula("=SUM(1,2,3)", &ctx), Value::Number(6.0));
//! ```

pub mod ast;
pub mod broadcast;
pub mod coerce;
pub mod compat;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod functions;
mod lexer;
pub mod parser;
pub mod value;

pub use ast::{BinaryOperator, Expr, RangeRef, UnaryOperator};
pub use coerce::CalcResult;
pub use compat::{CalcSettings, CompatibilityMode};
pub use context::{CellResolver, EmptyResolver, EvaluationContext, Reference};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{call_function, evaluate, evaluate_cell_formula};
pub use functions::{builtin_functions, FunctionRegistry};
pub use parser::parse_formula;
pub use value::{Array, Value};

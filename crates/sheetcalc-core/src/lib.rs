//! # sheetcalc-core
//!
//! Worksheet model consumed by the sheetcalc formula engine.
//!
//! This crate provides the data the engine reads while evaluating:
//! - [`CellValue`] - Values stored in cells (numbers, text, booleans, errors, formulas)
//! - [`ErrorCode`] - The fixed catalog of spreadsheet error tokens
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Workbook`], [`Worksheet`] - Sheets with row visibility metadata
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc_core::{Workbook, CellValue};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", 42.0).unwrap();
//! sheet.set_cell_formula("A2", "=A1*2").unwrap();
//! sheet.set_row_hidden(1, true);
//!
//! assert_eq!(sheet.get_value("A1").unwrap(), CellValue::Number(42.0));
//! assert!(sheet.is_row_hidden(1));
//! ```

pub mod cell;
pub mod error;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellRange, CellRangeIterator, CellValue, ErrorCode};
pub use error::{Error, Result};
pub use workbook::{DefinedName, Workbook};
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

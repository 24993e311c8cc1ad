//! Prelude module - common imports for sheetcalc users
//!
//! ```rust
//! use sheetcalc::prelude::*;
//! ```

pub use crate::{
    // Settings
    CalcSettings,
    // Cell types
    CellAddress,
    CellRange,
    CellValue,
    CompatibilityMode,
    // Error types
    Error,
    ErrorCode,
    EvaluationContext,
    Result,
    Value,
    // Main types
    Workbook,
    // Extension traits
    WorkbookFormulaExt,
    Worksheet,
};

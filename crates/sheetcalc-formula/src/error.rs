//! Formula error types
//!
//! Spreadsheet errors such as `#NUM!` are ordinary [`Value`](crate::Value)s and
//! never show up here. [`FormulaError`] covers the structural failures that
//! stop a formula from being evaluated at all.

use sheetcalc_core::ErrorCode;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Reference to a sheet or cell that does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Unrecognized compatibility mode name
    #[error("Unknown compatibility mode: {0}")]
    UnknownMode(String),
}

impl FormulaError {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        FormulaError::Parse {
            offset,
            message: message.into(),
        }
    }

    /// The error token a cell displays when its formula fails this way
    pub fn error_code(&self) -> ErrorCode {
        match self {
            FormulaError::Parse { .. } | FormulaError::UnknownFunction(_) => ErrorCode::Name,
            FormulaError::ArgumentCount { .. } | FormulaError::UnknownMode(_) => ErrorCode::Value,
            FormulaError::InvalidReference(_) => ErrorCode::Ref,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FormulaError::parse(3, "bad").error_code(), ErrorCode::Name);
        assert_eq!(
            FormulaError::UnknownFunction("FOO".into()).error_code(),
            ErrorCode::Name
        );
        assert_eq!(
            FormulaError::ArgumentCount {
                function: "NOT".into(),
                expected: "exactly 1".into(),
                actual: 2,
            }
            .error_code(),
            ErrorCode::Value
        );
        assert_eq!(
            FormulaError::InvalidReference("Nope!A1".into()).error_code(),
            ErrorCode::Ref
        );
    }

    #[test]
    fn test_display() {
        let err = FormulaError::parse(4, "Expected ')'");
        assert_eq!(err.to_string(), "Parse error at offset 4: Expected ')'");
    }
}

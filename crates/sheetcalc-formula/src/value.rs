//! Values produced and consumed during formula evaluation

use sheetcalc_core::{CellValue, ErrorCode};
use std::fmt;

/// A rectangular, row-major grid of scalar values
///
/// Arrays are never empty and never contain other arrays: a nested array
/// element collapses to its own top-left value when the grid is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    rows: usize,
    cols: usize,
    values: Vec<Value>,
}

impl Array {
    /// Build an array from row-major values
    ///
    /// Missing trailing cells are filled with `#N/A`; extra values are dropped.
    pub fn new(rows: usize, cols: usize, values: Vec<Value>) -> Self {
        let (rows, cols) = (rows.max(1), cols.max(1));
        let mut values: Vec<Value> = values.into_iter().map(Value::into_scalar).collect();
        values.resize(rows * cols, Value::Error(ErrorCode::Na));
        Self { rows, cols, values }
    }

    /// Build an array from rows of possibly different lengths
    ///
    /// Short rows are padded with `#N/A` up to the widest row.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let row_count = rows.len();
        let mut values = Vec::with_capacity(row_count * cols);
        for mut row in rows {
            row.resize(cols, Value::Error(ErrorCode::Na));
            values.extend(row);
        }
        Self::new(row_count, cols, values)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at a 0-based coordinate
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        if row < self.rows && col < self.cols {
            self.values.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn top_left(&self) -> &Value {
        &self.values[0]
    }

    pub fn is_1x1(&self) -> bool {
        self.rows == 1 && self.cols == 1
    }

    /// All elements in row-major order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Iterate over rows as slices
    pub fn iter_rows(&self) -> std::slice::Chunks<'_, Value> {
        self.values.chunks(self.cols)
    }

    /// Apply `f` to every element, keeping the shape
    pub fn map(&self, f: impl FnMut(&Value) -> Value) -> Array {
        Array::new(self.rows, self.cols, self.values.iter().map(f).collect())
    }
}

/// A formula value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(ErrorCode),
    Array(Array),
    /// Blank cell or omitted argument
    #[default]
    Empty,
}

impl Value {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Wrap a computed number, turning NaN and infinities into `#NUM!`
    pub fn number(n: f64) -> Self {
        if n.is_finite() {
            Value::Number(n)
        } else {
            Value::Error(ErrorCode::Num)
        }
    }

    /// Check if this is an error scalar
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Get the error if this is one
    pub fn error(&self) -> Option<ErrorCode> {
        match self {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Collapse an array to its top-left element; scalars are returned as-is
    pub fn into_scalar(self) -> Value {
        match self {
            Value::Array(array) => array
                .into_values()
                .into_iter()
                .next()
                .unwrap_or(Value::Error(ErrorCode::Na)),
            other => other,
        }
    }

    /// Borrowing form of [`Value::into_scalar`]
    pub fn as_scalar(&self) -> &Value {
        match self {
            Value::Array(array) => array.top_left(),
            other => other,
        }
    }

    /// Iterate over the scalar elements (one element for a scalar)
    pub fn scalars(&self) -> std::slice::Iter<'_, Value> {
        match self {
            Value::Array(array) => array.values().iter(),
            other => std::slice::from_ref(other).iter(),
        }
    }

    /// Text shown in a cell holding this value
    pub fn as_display_string(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Boolean(true) => "TRUE".to_string(),
            Value::Boolean(false) => "FALSE".to_string(),
            Value::Error(e) => e.to_string(),
            Value::Array(array) => array.top_left().as_display_string(),
            Value::Empty => String::new(),
        }
    }

    /// Get the type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Error(_) => "error",
            Value::Array(_) => "array",
            Value::Empty => "empty",
        }
    }
}

/// Format a number the way a General-formatted cell shows it
///
/// Up to 15 significant digits, no trailing zeros, scientific notation
/// outside `1e-10..1e15`.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return ErrorCode::Num.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }

    let magnitude = n.abs().log10().floor() as i32;
    if !(-10..15).contains(&magnitude) {
        let formatted = format!("{:.14E}", n);
        if let Some((mantissa, exponent)) = formatted.split_once('E') {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            return format!("{}E{}{:02}", trim_fraction(mantissa), sign, exponent.abs());
        }
        return formatted;
    }

    let decimals = (14 - magnitude).clamp(0, 24) as usize;
    trim_fraction(&format!("{:.*}", decimals, n)).to_string()
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_display_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<ErrorCode> for Value {
    fn from(e: ErrorCode) -> Self {
        Value::Error(e)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<&CellValue> for Value {
    fn from(cell: &CellValue) -> Self {
        match cell.effective_value() {
            CellValue::Empty | CellValue::Formula { .. } => Value::Empty,
            CellValue::Boolean(b) => Value::Boolean(*b),
            CellValue::Number(n) => Value::number(*n),
            CellValue::Text(s) => Value::Text(s.clone()),
            CellValue::Error(e) => Value::Error(*e),
        }
    }
}

impl From<CellValue> for Value {
    fn from(cell: CellValue) -> Self {
        Value::from(&cell)
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value.into_scalar() {
            Value::Number(n) => CellValue::Number(n),
            Value::Text(s) => CellValue::Text(s),
            Value::Boolean(b) => CellValue::Boolean(b),
            Value::Error(e) => CellValue::Error(e),
            Value::Array(_) | Value::Empty => CellValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n(x: f64) -> Value {
        Value::Number(x)
    }

    #[test]
    fn test_nested_arrays_collapse() {
        let inner = Array::new(2, 1, vec![n(7.0), n(8.0)]);
        let outer = Array::new(1, 2, vec![Value::Array(inner), n(2.0)]);
        assert_eq!(outer.values(), &[n(7.0), n(2.0)]);
    }

    #[test]
    fn test_ragged_rows_padded() {
        let array = Array::from_rows(vec![vec![n(1.0), n(2.0), n(3.0)], vec![n(4.0)]]);
        assert_eq!((array.rows(), array.cols()), (2, 3));
        assert_eq!(array.get(1, 0), Some(&n(4.0)));
        assert_eq!(array.get(1, 2), Some(&Value::Error(ErrorCode::Na)));
        assert_eq!(array.get(2, 0), None);
    }

    #[test]
    fn test_array_never_empty() {
        let array = Array::new(0, 0, Vec::new());
        assert!(array.is_1x1());
        assert_eq!(array.top_left(), &Value::Error(ErrorCode::Na));
    }

    #[test]
    fn test_number_rejects_non_finite() {
        assert_eq!(Value::number(f64::INFINITY), Value::Error(ErrorCode::Num));
        assert_eq!(Value::number(f64::NAN), Value::Error(ErrorCode::Num));
        assert_eq!(Value::from(1.5), n(1.5));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-3.5), "-3.5");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(1.0 / 3.0), "0.333333333333333");
        assert_eq!(format_number(1e20), "1E+20");
        assert_eq!(format_number(1.5e-12), "1.5E-12");
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(Value::Boolean(true).to_string(), "TRUE");
        assert_eq!(Value::Error(ErrorCode::Num).to_string(), "#NUM!");
        assert_eq!(Value::Empty.to_string(), "");
        let array = Array::new(1, 2, vec![n(5.0), n(6.0)]);
        assert_eq!(Value::Array(array).to_string(), "5");
    }

    #[test]
    fn test_scalars_iteration() {
        let array = Value::Array(Array::new(2, 2, vec![n(1.0), n(2.0), n(3.0), n(4.0)]));
        assert_eq!(array.scalars().count(), 4);
        assert_eq!(n(9.0).scalars().collect::<Vec<_>>(), vec![&n(9.0)]);
    }

    #[test]
    fn test_cell_value_conversions() {
        let cached = CellValue::Formula {
            text: "=1/0".into(),
            cached_value: Some(Box::new(CellValue::Error(ErrorCode::Div0))),
        };
        assert_eq!(Value::from(&cached), Value::Error(ErrorCode::Div0));
        assert_eq!(Value::from(CellValue::formula("=A1")), Value::Empty);
        assert_eq!(Value::from(CellValue::text("x")), Value::text("x"));

        let array = Value::Array(Array::new(1, 2, vec![n(3.0), n(4.0)]));
        assert_eq!(CellValue::from(array), CellValue::Number(3.0));
        assert_eq!(CellValue::from(Value::Empty), CellValue::Empty);
    }
}

//! Worksheet type

use std::collections::{BTreeMap, BTreeSet};

use crate::cell::{CellAddress, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A single sheet: sparse cell storage plus row visibility
///
/// Cells are keyed by `(row, col)` so iteration is row-major, which is the
/// order range reads and SUBTOTAL filtering expect.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u16), CellValue>,
    hidden_rows: BTreeSet<u32>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get cell value by address string (e.g., "A1")
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices (blank cells read as [`CellValue::Empty`])
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells.get(&(row, col)).cloned().unwrap_or_default()
    }

    /// Borrow a stored cell, if any
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Get the formula text at a cell position (if it's a formula)
    pub fn cell_formula_at(&self, row: u32, col: u16) -> Option<&str> {
        self.cells.get(&(row, col)).and_then(CellValue::formula_text)
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    ///
    /// Writing [`CellValue::Empty`] clears the cell.
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        validate_cell_position(row, col)?;
        match value.into() {
            CellValue::Empty => {
                self.cells.remove(&(row, col));
            }
            value => {
                self.cells.insert((row, col), value);
            }
        }
        Ok(())
    }

    /// Set a cell formula by address string
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula)
    }

    /// Set a cell formula by indices; the text must start with '='
    pub fn set_cell_formula_at(&mut self, row: u32, col: u16, formula: &str) -> Result<()> {
        if !formula.trim_start().starts_with('=') {
            return Err(Error::NotAFormula(formula.to_string()));
        }
        self.set_cell_value_at(row, col, CellValue::formula(formula.trim_start()))
    }

    /// Store the computed result of a formula cell
    pub fn set_formula_result(&mut self, row: u32, col: u16, value: CellValue) -> Result<()> {
        match self.cells.get_mut(&(row, col)) {
            Some(CellValue::Formula { cached_value, .. }) => {
                *cached_value = Some(Box::new(value));
                Ok(())
            }
            _ => Err(Error::NotAFormula(
                CellAddress::new(row, col).to_string(),
            )),
        }
    }

    /// Clear a cell by indices
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.cells.remove(&(row, col));
    }

    // === Row visibility ===

    /// Check if row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.hidden_rows.contains(&row)
    }

    /// Set row hidden state
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        if hidden {
            self.hidden_rows.insert(row);
        } else {
            self.hidden_rows.remove(&row);
        }
    }

    /// Indices of all hidden rows, ascending
    pub fn hidden_rows(&self) -> impl Iterator<Item = u32> + '_ {
        self.hidden_rows.iter().copied()
    }

    // === Range Operations ===

    /// Get the used range (bounds of all non-empty cells)
    pub fn used_range(&self) -> Option<CellRange> {
        let mut keys = self.cells.keys();
        let &(first_row, first_col) = keys.next()?;
        let (mut min_col, mut max_row, mut max_col) = (first_col, first_row, first_col);
        for &(row, col) in keys {
            min_col = min_col.min(col);
            max_col = max_col.max(col);
            max_row = max_row.max(row);
        }
        Some(CellRange::from_indices(first_row, min_col, max_row, max_col))
    }

    /// Number of stored (non-empty) cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the worksheet has no stored cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellValue)> {
        self.cells.iter().map(|(&(row, col), value)| (row, col, value))
    }

    /// Iterate over all formula cells: (row, col, formula_text)
    pub fn formula_cells(&self) -> impl Iterator<Item = (u32, u16, &str)> {
        self.iter_cells()
            .filter_map(|(row, col, value)| value.formula_text().map(|text| (row, col, text)))
    }
}

fn validate_cell_position(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get_values() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_cell_value("B2", 10.0).unwrap();
        sheet.set_cell_value("C3", "text").unwrap();

        assert_eq!(sheet.get_value("B2").unwrap(), CellValue::Number(10.0));
        assert_eq!(sheet.get_value_at(2, 2), CellValue::Text("text".into()));
        assert_eq!(sheet.get_value("Z99").unwrap(), CellValue::Empty);
        assert_eq!(sheet.cell_count(), 2);
    }

    #[test]
    fn test_writing_empty_clears() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_cell_value("A1", 1).unwrap();
        sheet.set_cell_value("A1", CellValue::Empty).unwrap();
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_formula_cells() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_cell_formula("A3", "=SUBTOTAL(9,A1:A2)").unwrap();
        assert_eq!(sheet.cell_formula_at(2, 0), Some("=SUBTOTAL(9,A1:A2)"));
        assert!(sheet.set_cell_formula("A4", "SUM(A1)").is_err());

        sheet.set_formula_result(2, 0, CellValue::Number(3.0)).unwrap();
        assert_eq!(
            sheet.get_value_at(2, 0).effective_value(),
            &CellValue::Number(3.0)
        );
        assert!(sheet.set_formula_result(0, 0, CellValue::Empty).is_err());
        assert_eq!(sheet.formula_cells().count(), 1);
    }

    #[test]
    fn test_hidden_rows() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_row_hidden(4, true);
        sheet.set_row_hidden(2, true);
        assert!(sheet.is_row_hidden(4));
        assert_eq!(sheet.hidden_rows().collect::<Vec<_>>(), vec![2, 4]);

        sheet.set_row_hidden(4, false);
        assert!(!sheet.is_row_hidden(4));
    }

    #[test]
    fn test_used_range() {
        let mut sheet = Worksheet::new("Data");
        assert_eq!(sheet.used_range(), None);

        sheet.set_cell_value("C2", 1).unwrap();
        sheet.set_cell_value("A5", 2).unwrap();
        assert_eq!(sheet.used_range(), Some(CellRange::parse("A2:C5").unwrap()));
    }

    #[test]
    fn test_position_bounds() {
        let mut sheet = Worksheet::new("Data");
        assert!(sheet.set_cell_value_at(MAX_ROWS, 0, 1).is_err());
        assert!(sheet.set_cell_value_at(0, MAX_COLS, 1).is_err());
    }
}

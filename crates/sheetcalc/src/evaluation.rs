//! Formula evaluation inside a workbook
//!
//! # Example
//!
//! ```rust
//! use sheetcalc::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 4.0).unwrap();
//! sheet.set_cell_formula("A2", "=SQRT(A1)").unwrap();
//!
//! let settings = CalcSettings::default();
//! let value = workbook.store_formula_result(0, "A2", &settings).unwrap();
//! assert_eq!(value, Value::Number(2.0));
//! ```

use crate::{CalcSettings, CellAddress, CellValue, Error, EvaluationContext, Result, Value, Workbook};
use sheetcalc_formula::evaluate_cell_formula;

/// Extension trait for Workbook to evaluate formulas against its cells
pub trait WorkbookFormulaExt {
    /// Evaluate `formula` as if it were entered at `address` on sheet `sheet`
    ///
    /// Spreadsheet errors come back as [`Value::Error`]; only a bad address
    /// or sheet index fails.
    fn evaluate_at(
        &self,
        sheet: usize,
        address: &str,
        formula: &str,
        settings: &CalcSettings,
    ) -> Result<Value>;

    /// Evaluate the formula stored at `address`
    fn evaluate_cell(&self, sheet: usize, address: &str, settings: &CalcSettings) -> Result<Value>;

    /// Evaluate the formula stored at `address` and cache the result in the cell
    fn store_formula_result(
        &mut self,
        sheet: usize,
        address: &str,
        settings: &CalcSettings,
    ) -> Result<Value>;
}

impl WorkbookFormulaExt for Workbook {
    fn evaluate_at(
        &self,
        sheet: usize,
        address: &str,
        formula: &str,
        settings: &CalcSettings,
    ) -> Result<Value> {
        let addr = CellAddress::parse(address)?;
        if sheet >= self.sheet_count() {
            return Err(Error::SheetOutOfBounds(sheet, self.sheet_count()));
        }

        let ctx = EvaluationContext::new(settings, self, sheet, addr.row, addr.col);
        let value = evaluate_cell_formula(formula, &ctx);
        tracing::trace!(sheet, cell = %addr, formula, mode = %settings.mode, "evaluated formula");
        Ok(value)
    }

    fn evaluate_cell(&self, sheet: usize, address: &str, settings: &CalcSettings) -> Result<Value> {
        let addr = CellAddress::parse(address)?;
        let worksheet = self
            .worksheet(sheet)
            .ok_or(Error::SheetOutOfBounds(sheet, self.sheet_count()))?;
        let formula = worksheet
            .cell_formula_at(addr.row, addr.col)
            .ok_or_else(|| Error::NotAFormula(addr.to_string()))?;
        self.evaluate_at(sheet, address, formula, settings)
    }

    fn store_formula_result(
        &mut self,
        sheet: usize,
        address: &str,
        settings: &CalcSettings,
    ) -> Result<Value> {
        let value = self.evaluate_cell(sheet, address, settings)?;
        let addr = CellAddress::parse(address)?;
        let sheet_count = self.sheet_count();
        self.worksheet_mut(sheet)
            .ok_or(Error::SheetOutOfBounds(sheet, sheet_count))?
            .set_formula_result(addr.row, addr.col, CellValue::from(value.clone()))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bad_address_and_sheet() {
        let wb = Workbook::new();
        let settings = CalcSettings::default();
        assert!(matches!(
            wb.evaluate_at(0, "1A", "=1", &settings),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            wb.evaluate_at(3, "A1", "=1", &settings),
            Err(Error::SheetOutOfBounds(3, 1))
        ));
    }

    #[test]
    fn test_evaluate_cell_requires_formula() {
        let mut wb = Workbook::new();
        wb.worksheet_mut(0).unwrap().set_cell_value("A1", 1.0).unwrap();
        let settings = CalcSettings::default();
        assert!(matches!(
            wb.evaluate_cell(0, "A1", &settings),
            Err(Error::NotAFormula(_))
        ));
    }

    #[test]
    fn test_store_formula_result_caches_value() {
        let mut wb = Workbook::new();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_cell_value("A1", 6.0).unwrap();
        sheet.set_cell_formula("A2", "=A1*7").unwrap();
        let settings = CalcSettings::default();

        let value = wb.store_formula_result(0, "A2", &settings).unwrap();
        assert_eq!(value, Value::Number(42.0));
        let ctx = EvaluationContext::new(&settings, &wb, 0, 5, 5);
        assert_eq!(evaluate_cell_formula("=A2+0", &ctx), Value::Number(42.0));
    }

    #[test]
    fn test_spreadsheet_errors_are_values() {
        let wb = Workbook::new();
        let settings = CalcSettings::default();
        assert_eq!(
            wb.evaluate_at(0, "A1", "=1/0", &settings).unwrap(),
            Value::Error(ErrorCode::Div0)
        );
        assert_eq!(
            wb.evaluate_at(0, "A1", "=NOSUCHFUNCTION(1)", &settings).unwrap(),
            Value::Error(ErrorCode::Name)
        );
    }
}

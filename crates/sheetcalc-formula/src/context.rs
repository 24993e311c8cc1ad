//! Evaluation context and the cell resolver seam
//!
//! The engine never owns cell data. Everything it reads comes through a
//! [`CellResolver`]: values, row visibility and formula text (the last two
//! only matter to SUBTOTAL).

use crate::compat::{CalcSettings, CompatibilityMode};
use crate::value::{Array, Value};
use once_cell::sync::Lazy;
use sheetcalc_core::{CellRange, ErrorCode, Workbook};

/// A block of cells on a specific sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Sheet index
    pub sheet: usize,
    pub range: CellRange,
}

/// Read access to the cells a formula refers to
///
/// Sheets are addressed by index; [`CellResolver::sheet_index`] maps the
/// names written in formulas to indices.
pub trait CellResolver: Send + Sync {
    /// Value of one cell; blank cells are [`Value::Empty`], unknown sheets `#REF!`
    fn cell_value(&self, sheet: usize, row: u32, col: u16) -> Value;

    /// Values of a block of cells as a row-major array
    fn range_values(&self, sheet: usize, range: &CellRange) -> Value {
        let rows = range.row_count() as usize;
        let cols = range.col_count() as usize;
        let values = range
            .cells()
            .map(|addr| self.cell_value(sheet, addr.row, addr.col))
            .collect();
        Value::Array(Array::new(rows, cols, values))
    }

    fn is_row_hidden(&self, _sheet: usize, _row: u32) -> bool {
        false
    }

    /// Formula text (with leading '=') if the cell holds a formula
    fn cell_formula(&self, _sheet: usize, _row: u32, _col: u16) -> Option<&str> {
        None
    }

    fn sheet_index(&self, _name: &str) -> Option<usize> {
        None
    }

    /// Resolve a defined name; `None` makes the name evaluate to `#NAME?`
    fn resolve_name(&self, _name: &str) -> Option<Reference> {
        None
    }
}

/// A resolver with no cells: every reference reads as blank
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyResolver;

impl CellResolver for EmptyResolver {
    fn cell_value(&self, _sheet: usize, _row: u32, _col: u16) -> Value {
        Value::Empty
    }
}

impl CellResolver for Workbook {
    fn cell_value(&self, sheet: usize, row: u32, col: u16) -> Value {
        match self.worksheet(sheet) {
            Some(ws) => ws.cell_at(row, col).map_or(Value::Empty, Value::from),
            None => Value::Error(ErrorCode::Ref),
        }
    }

    fn range_values(&self, sheet: usize, range: &CellRange) -> Value {
        let Some(ws) = self.worksheet(sheet) else {
            return Value::Error(ErrorCode::Ref);
        };
        let values = range
            .cells()
            .map(|addr| ws.cell_at(addr.row, addr.col).map_or(Value::Empty, Value::from))
            .collect();
        Value::Array(Array::new(
            range.row_count() as usize,
            range.col_count() as usize,
            values,
        ))
    }

    fn is_row_hidden(&self, sheet: usize, row: u32) -> bool {
        self.worksheet(sheet)
            .map_or(false, |ws| ws.is_row_hidden(row))
    }

    fn cell_formula(&self, sheet: usize, row: u32, col: u16) -> Option<&str> {
        self.worksheet(sheet)?.cell_formula_at(row, col)
    }

    fn sheet_index(&self, name: &str) -> Option<usize> {
        Workbook::sheet_index(self, name)
    }

    fn resolve_name(&self, name: &str) -> Option<Reference> {
        self.defined_name(name).map(|defined| Reference {
            sheet: defined.sheet,
            range: defined.range,
        })
    }
}

static DEFAULT_SETTINGS: Lazy<CalcSettings> = Lazy::new(CalcSettings::default);
static EMPTY_RESOLVER: EmptyResolver = EmptyResolver;

/// Everything a formula can see while it is being evaluated
///
/// The context is immutable, so the compatibility mode cannot change
/// part-way through one expression tree.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub settings: &'a CalcSettings,
    pub resolver: &'a dyn CellResolver,
    /// Current worksheet index
    pub current_sheet: usize,
    /// Row of the cell being calculated
    pub current_row: u32,
    /// Column of the cell being calculated
    pub current_col: u16,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(
        settings: &'a CalcSettings,
        resolver: &'a dyn CellResolver,
        sheet: usize,
        row: u32,
        col: u16,
    ) -> Self {
        Self {
            settings,
            resolver,
            current_sheet: sheet,
            current_row: row,
            current_col: col,
        }
    }

    /// Excel mode with no cells (for testing and standalone formulas)
    pub fn simple() -> EvaluationContext<'static> {
        EvaluationContext::new(&DEFAULT_SETTINGS, &EMPTY_RESOLVER, 0, 0, 0)
    }

    /// Given settings with no cells
    pub fn with_settings(settings: &'a CalcSettings) -> Self {
        Self::new(settings, &EMPTY_RESOLVER, 0, 0, 0)
    }

    pub fn mode(&self) -> CompatibilityMode {
        self.settings.mode
    }

    /// Sheet index for an optional sheet name; no name means the current sheet
    pub fn resolve_sheet(&self, name: Option<&str>) -> Option<usize> {
        match name {
            Some(name) => self.resolver.sheet_index(name),
            None => Some(self.current_sheet),
        }
    }

    /// Read every cell of a reference
    pub fn reference_values(&self, reference: &Reference) -> Value {
        let range = &reference.range;
        if range.cell_count() == 1 {
            self.resolver
                .cell_value(reference.sheet, range.start.row, range.start.col)
        } else {
            self.resolver.range_values(reference.sheet, range)
        }
    }
}

//! Workbook type - the sheet collection formulas are evaluated against

use std::collections::BTreeMap;

use crate::cell::CellRange;
use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A defined name pointing at a block of cells on one sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinedName {
    /// Index of the sheet the range lives on
    pub sheet: usize,
    /// The referenced cells
    pub range: CellRange,
}

/// A workbook: ordered worksheets plus workbook-scoped defined names
#[derive(Debug, Clone)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    /// Keyed by upper-cased name
    names: BTreeMap<String, DefinedName>,
}

impl Workbook {
    /// Create a new workbook with one worksheet named "Sheet1"
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new("Sheet1")],
            names: BTreeMap::new(),
        }
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            names: BTreeMap::new(),
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by name (case-insensitive)
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheet_index(name).and_then(|i| self.worksheets.get(i))
    }

    /// Get a mutable worksheet by name (case-insensitive)
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        let index = self.sheet_index(name)?;
        self.worksheets.get_mut(index)
    }

    /// Get the index of a worksheet by name (case-insensitive)
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets
            .iter()
            .position(|ws| ws.name().eq_ignore_ascii_case(name))
    }

    /// Iterate over all worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Add a new worksheet named "SheetN" with the first free N
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = (self.worksheets.len() + 1..)
            .map(|n| format!("Sheet{n}"))
            .find(|name| self.sheet_index(name).is_none())
            .unwrap_or_default();
        self.add_worksheet_with_name(&name)
    }

    /// Add a new worksheet with specified name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name, None)?;
        self.worksheets.push(Worksheet::new(name));
        Ok(self.worksheets.len() - 1)
    }

    /// Rename a worksheet
    pub fn rename_worksheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        self.validate_sheet_name(new_name, Some(index))?;
        self.worksheets[index].set_name(new_name);
        Ok(())
    }

    // === Defined names ===

    /// Define (or redefine) a workbook-scoped name for a range
    pub fn define_name(&mut self, name: &str, sheet: usize, range: CellRange) -> Result<()> {
        if sheet >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(sheet, self.worksheets.len()));
        }
        self.names
            .insert(name.to_ascii_uppercase(), DefinedName { sheet, range });
        Ok(())
    }

    /// Look up a defined name (case-insensitive)
    pub fn defined_name(&self, name: &str) -> Option<&DefinedName> {
        self.names.get(&name.to_ascii_uppercase())
    }

    fn validate_sheet_name(&self, name: &str, exclude_index: Option<usize>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {MAX_SHEET_NAME_LEN} characters)"
            )));
        }
        if let Some(c) = name.chars().find(|c| [':', '\\', '/', '?', '*', '[', ']'].contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{c}'"
            )));
        }
        match self.sheet_index(name) {
            Some(i) if Some(i) != exclude_index => Err(Error::DuplicateSheetName(name.into())),
            _ => Ok(()),
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

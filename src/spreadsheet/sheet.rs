use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::control::FormControl;
use crate::spreadsheet::reference::CellRange;
use crate::spreadsheet::reference::CellReference;
use crate::spreadsheet::reference::ReferenceError;
use serde::Serialize;
use std::collections::HashMap;

/// A merged block of cells; its value is the value of the top-left cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergedRange {
    pub start: CellReference,
    pub end: CellReference,
    pub value: String,
}

impl MergedRange {
    /// Address-prefix test between `address` and the range's start address.
    ///
    /// This is a string comparison, not geometric containment: `B1` matches a range
    /// starting at `B12`, and cells inside a multi-row range other than the start row
    /// only match when their address happens to share the prefix.
    pub fn covers_by_prefix(&self, address: &str) -> bool {
        let start = self.start.to_string();
        start.starts_with(address) || address.starts_with(&start)
    }
}

/// In-memory representation of one worksheet: cells, merged ranges and form controls.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    cells: HashMap<(usize, usize), Cell>,
    merged_ranges: Vec<MergedRange>,
    form_controls: Vec<FormControl>,
    /// Actual data range (determined from cell data)
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Sheet {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell, replacing any earlier cell at the same position.
    pub fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.insert((cell.row, cell.col), cell);
    }

    /// Adds a text cell at an address such as `B12`.
    pub fn push_text(&mut self, reference: &str, value: &str) -> Result<(), ReferenceError> {
        let reference: CellReference = reference.parse()?;
        self.push(Cell::text(reference.row, reference.col.0, value));
        Ok(())
    }

    /// Records a merged range such as `B12:D12`, taking its value from the start cell.
    /// Cells must be pushed before the ranges that cover them.
    pub fn merge(&mut self, range: &str) -> Result<(), ReferenceError> {
        let range: CellRange = range.parse()?;
        let value = self.value(&range.start_cell);
        self.merged_ranges.push(MergedRange {
            start: range.start_cell,
            end: range.end_cell,
            value,
        });
        Ok(())
    }

    pub fn push_control(&mut self, control: FormControl) {
        self.form_controls.push(control);
    }

    /// Updates the actual data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_upper_bound.map(|upper| upper < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    pub fn cell(&self, reference: &CellReference) -> Option<&Cell> {
        self.cells.get(&(reference.row, reference.col.0))
    }

    /// Formatted value at `reference`, empty when the cell is absent.
    pub fn value(&self, reference: &CellReference) -> String {
        self.cell(reference)
            .map(Cell::formatted)
            .unwrap_or_default()
    }

    pub fn merged_ranges(&self) -> &[MergedRange] {
        &self.merged_ranges
    }

    pub fn form_controls(&self) -> &[FormControl] {
        &self.form_controls
    }

    /// Values of one zero-based row, from column `A` to the row's last non-empty cell.
    pub fn row(&self, row: usize) -> Vec<String> {
        let last = self.cells
            .iter()
            .filter(|((cell_row, _), cell)| *cell_row == row && !cell.formatted().is_empty())
            .map(|((_, col), _)| *col)
            .max();
        match last {
            Some(last) => (0..=last).map(|col| self.value(&CellReference::new(row, col))).collect(),
            None => Vec::new(),
        }
    }

    /// Column-major view of the sheet: one vector per column from `A` to the last
    /// used column, each running from row 1 to the column's last non-empty cell.
    pub fn columns(&self) -> Vec<Vec<String>> {
        let (Some(row_upper), Some(col_upper)) = (self.row_upper_bound, self.col_upper_bound) else {
            return Vec::new();
        };
        (0..=col_upper)
            .map(|col| {
                let mut values: Vec<String> = (0..=row_upper)
                    .map(|row| self.value(&CellReference::new(row, col)))
                    .collect();
                while values.last().map(String::is_empty).unwrap_or(false) {
                    values.pop();
                }
                values
            })
            .collect()
    }
}

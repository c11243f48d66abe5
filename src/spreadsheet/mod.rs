//! # Spreadsheet Access
//!
//! Read-only access to workbook contents needed by form extraction: sheet names,
//! formatted cell values, merged ranges, row and column-major values and embedded form controls.
//! Every accessor materializes a sheet into an in-memory [`Sheet`] on first use.
pub mod cell;
pub mod control;
mod excel;
pub mod memory;
pub mod reference;
pub mod sheet;
mod vml;
pub mod xlsx;

use crate::error::RustyFormError;
use crate::spreadsheet::control::FormControl;
use crate::spreadsheet::reference::CellReference;
use crate::spreadsheet::sheet::MergedRange;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::path::Path;
use thiserror::Error;

/// Errors raised while opening or reading a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing part '{0}' in workbook")]
    FileError(String),

    #[error("Spreadsheet '{0}' contains no sheets")]
    SpreadsheetEmptyError(String),

    #[error("Spreadsheet '{0}' is password protected")]
    SpreadsheetPasswordProtectedError(String),

    #[error("Unsupported file format '{0}', expect xlsx, xlsm, xltx or xltm")]
    InvalidFileFormatError(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFoundError(String),

    #[error("Spreadsheet '{0}' is already closed")]
    SpreadsheetClosedError(String),
}

/// Accessor contract shared by every workbook source.
///
/// Accessors take `&mut self` for reads because sheets are parsed lazily and cached.
pub trait Spreadsheet {
    /// Name of the underlying file or in-memory source.
    fn name(&self) -> String;

    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Result<Vec<String>, RustyFormError>;

    /// The named sheet, loaded on first access.
    fn sheet(&mut self, name: &str) -> Result<&Sheet, RustyFormError>;

    /// Releases the underlying resources; later reads fail with `SpreadsheetClosedError`.
    fn close(&mut self);

    /// Formatted value of one cell, empty when the cell is absent.
    fn cell_value(&mut self, sheet: &str, cell: &CellReference) -> Result<String, RustyFormError> {
        Ok(self.sheet(sheet)?.value(cell))
    }

    fn merged_ranges(&mut self, sheet: &str) -> Result<Vec<MergedRange>, RustyFormError> {
        Ok(self.sheet(sheet)?.merged_ranges().to_vec())
    }

    /// Values of one zero-based row up to its last non-empty cell.
    fn row(&mut self, sheet: &str, row: usize) -> Result<Vec<String>, RustyFormError> {
        Ok(self.sheet(sheet)?.row(row))
    }

    fn columns(&mut self, sheet: &str) -> Result<Vec<Vec<String>>, RustyFormError> {
        Ok(self.sheet(sheet)?.columns())
    }

    fn form_controls(&mut self, sheet: &str) -> Result<Vec<FormControl>, RustyFormError> {
        Ok(self.sheet(sheet)?.form_controls().to_vec())
    }
}

/// Opens a workbook, dispatching on the file extension.
pub fn open_spreadsheet<P: AsRef<Path>>(path: P) -> Result<XlsxSpreadsheet, RustyFormError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xlsm" | "xltx" | "xltm" => XlsxSpreadsheet::open(path),
        _ => Err(SpreadsheetError::InvalidFileFormatError(path.display().to_string()))?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extensions_are_rejected() {
        for name in ["form.xls", "form.ods", "form.xlsb", "form"] {
            let error = open_spreadsheet(name).err().unwrap();
            assert!(
                matches!(error, RustyFormError::SpreadsheetError(SpreadsheetError::InvalidFileFormatError(_))),
                "{name}: {error}"
            );
        }
    }

    #[test]
    fn missing_workbook_is_an_io_error() {
        let error = open_spreadsheet("does-not-exist.xlsx").err().unwrap();
        assert!(matches!(error, RustyFormError::IoError(_)));
    }
}

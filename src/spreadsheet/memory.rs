use crate::error::RustyFormError;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;

/// A workbook whose sheets are already in memory.
///
/// Useful for callers that assemble cell data themselves and as a test fixture.
#[derive(Clone, Debug, Default)]
pub struct MemorySpreadsheet {
    name: String,
    sheets: Vec<Sheet>,
    closed: bool,
}

impl MemorySpreadsheet {
    pub fn new(name: &str) -> Self {
        MemorySpreadsheet {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Appends a sheet, keeping workbook order.
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Spreadsheet for MemorySpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Result<Vec<String>, RustyFormError> {
        if self.closed {
            Err(SpreadsheetError::SpreadsheetClosedError(self.name.to_owned()))?
        }
        Ok(self.sheets.iter().map(|sheet| sheet.name.to_owned()).collect())
    }

    fn sheet(&mut self, name: &str) -> Result<&Sheet, RustyFormError> {
        if self.closed {
            Err(SpreadsheetError::SpreadsheetClosedError(self.name.to_owned()))?
        }
        let sheet = self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(name.to_owned()))?;
        Ok(sheet)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

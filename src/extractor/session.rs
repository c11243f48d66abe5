use crate::error::RustyFormError;
use crate::extractor::fields::extract_record;
use crate::extractor::sheets::find_sheet;
use crate::extractor::table::read_table;
use crate::extractor::ExtractError;
use crate::seccf::schema::FormSchema;
use crate::seccf::BuyerDetails;
use crate::seccf::ControlledContentRow;
use crate::seccf::Extraction;
use crate::seccf::ProductDetails;
use crate::spreadsheet::open_spreadsheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use crate::spreadsheet::Spreadsheet;
use std::path::Path;
use tracing::info;
use tracing::warn;

/// One extraction run over one workbook.
///
/// The session owns the workbook for its whole life and releases it on `close` or drop.
/// Failures of every section run are kept in [`FormExtractor::diagnostics`].
pub struct FormExtractor<S: Spreadsheet> {
    spreadsheet: S,
    schema: FormSchema,
    diagnostics: Vec<ExtractError>,
}

impl FormExtractor<XlsxSpreadsheet> {
    pub fn open<P: AsRef<Path>>(path: P, schema: FormSchema) -> Result<Self, RustyFormError> {
        let spreadsheet = open_spreadsheet(path)?;
        info!(file = %spreadsheet.name(), "opened workbook");
        Ok(FormExtractor::new(spreadsheet, schema))
    }
}

impl<S: Spreadsheet> FormExtractor<S> {
    pub fn new(spreadsheet: S, schema: FormSchema) -> Self {
        FormExtractor {
            spreadsheet,
            schema,
            diagnostics: Vec::new(),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Runs every section. Sections whose sheet is missing are left empty, and a read
    /// failure in one section keeps what that section read so far without stopping the others.
    pub fn extract(&mut self) -> Result<Extraction, RustyFormError> {
        let buyer_details = self.extract_buyer_details()?;
        let product_details = self.extract_product_details()?;
        let controlled_content = self.extract_controlled_content()?;
        Ok(Extraction {
            buyer_details,
            product_details,
            controlled_content,
        })
    }

    pub fn extract_buyer_details(&mut self) -> Result<Option<BuyerDetails>, RustyFormError> {
        let search_word = self.schema.sheets.buyer_details.to_owned();
        let Some(sheet) = self.resolve_sheet(&search_word)? else {
            return Ok(None);
        };
        info!(sheet = %sheet, "extracting buyer details");
        let (record, diagnostics) = extract_record(&mut self.spreadsheet, &sheet, &self.schema.buyer_fields)?;
        self.diagnostics.extend(diagnostics);
        Ok(Some(record))
    }

    pub fn extract_product_details(&mut self) -> Result<Option<ProductDetails>, RustyFormError> {
        let search_word = self.schema.sheets.product_details.to_owned();
        let Some(sheet) = self.resolve_sheet(&search_word)? else {
            return Ok(None);
        };
        info!(sheet = %sheet, "extracting product details");
        let (record, diagnostics) = extract_record(&mut self.spreadsheet, &sheet, &self.schema.product_fields)?;
        self.diagnostics.extend(diagnostics);
        Ok(Some(record))
    }

    /// Rows of the controlled-content table, up to the first read failure if any.
    pub fn extract_controlled_content(&mut self) -> Result<Vec<ControlledContentRow>, RustyFormError> {
        let search_word = self.schema.sheets.controlled_content.to_owned();
        let Some(sheet) = self.resolve_sheet(&search_word)? else {
            return Ok(Vec::new());
        };
        info!(sheet = %sheet, "extracting controlled content");
        let (rows, diagnostics) = match read_table(&mut self.spreadsheet, &sheet, &self.schema.controlled_content) {
            Ok(table) => table,
            Err(error) => {
                push_failure(&mut self.diagnostics, ExtractError::recover(error)?);
                return Ok(Vec::new());
            }
        };
        self.diagnostics.extend(diagnostics);

        let mut records = Vec::new();
        for row in rows {
            match row {
                Ok(record) => records.push(record),
                Err(failure) => {
                    push_failure(&mut self.diagnostics, failure);
                    break;
                }
            }
        }
        info!(sheet = %sheet, rows = records.len(), "read controlled content");
        Ok(records)
    }

    /// Failures gathered by every run so far, in order: soft failures plus the read
    /// failures that ended a record or table early.
    pub fn diagnostics(&self) -> &[ExtractError] {
        &self.diagnostics
    }

    pub fn close(&mut self) {
        self.spreadsheet.close();
    }

    fn resolve_sheet(&mut self, search_word: &str) -> Result<Option<String>, RustyFormError> {
        let sheet_names = self.spreadsheet.sheet_names()?;
        match find_sheet(&sheet_names, search_word) {
            Ok(sheet) => Ok(Some(sheet)),
            Err(diagnostic) => {
                warn!("{diagnostic}");
                self.diagnostics.push(diagnostic);
                Ok(None)
            }
        }
    }
}

fn push_failure(diagnostics: &mut Vec<ExtractError>, failure: ExtractError) {
    warn!("{failure}");
    diagnostics.push(failure);
}

impl<S: Spreadsheet> Drop for FormExtractor<S> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::control::FormControl;
    use crate::spreadsheet::memory::MemorySpreadsheet;
    use crate::spreadsheet::reference::CellReference;
    use crate::spreadsheet::sheet::Sheet;
    use crate::spreadsheet::SpreadsheetError;

    fn schema() -> FormSchema {
        FormSchema::seccf(&["Amazon".to_owned()]).unwrap()
    }

    fn buyer_sheet() -> Sheet {
        let mut sheet = Sheet::new("1. Buyer Details");
        sheet.push_text("B12", "Part Number").unwrap();
        sheet.push_text("E12", "ABC-123").unwrap();
        sheet.push_text("B13", "Part  Description").unwrap();
        sheet.push_text("E13", "Bracket").unwrap();
        sheet.push_text("B15", "AMAZON classification of item").unwrap();
        sheet.push_control(FormControl::checkbox("E15".parse().unwrap(), "Dual", true));
        sheet.push_control(FormControl::checkbox("F15".parse().unwrap(), "Military", false));
        sheet.push_text("B21", "Build To Print").unwrap();
        sheet.push_control(FormControl::checkbox("G21".parse().unwrap(), "YES", true));
        sheet.push_text("B25", "Modified").unwrap();
        sheet.push_control(FormControl::checkbox("G25".parse().unwrap(), "YES", false));
        sheet
    }

    fn controlled_content_sheet() -> Sheet {
        let mut sheet = Sheet::new("3. Controlled Content");
        for (reference, text) in [("A11", "Item"), ("B11", "Part Number"), ("C11", "Part description"), ("D11", "ECCN N°")] {
            sheet.push_text(reference, text).unwrap();
        }
        for row in 12..=14 {
            sheet.push_text(&format!("A{row}"), &(row - 11).to_string()).unwrap();
            sheet.push_text(&format!("B{row}"), &format!("P-{row}")).unwrap();
            sheet.push_text(&format!("D{row}"), "EAR99").unwrap();
        }
        sheet.push_text("B16", "after the sentinel").unwrap();
        sheet
    }

    /// Fails cell reads on sheets containing `sheet`, from row `from_row` (one-based) down.
    struct FailingReads {
        inner: MemorySpreadsheet,
        sheet: &'static str,
        from_row: usize,
    }

    impl Spreadsheet for FailingReads {
        fn name(&self) -> String {
            self.inner.name()
        }

        fn sheet_names(&self) -> Result<Vec<String>, RustyFormError> {
            self.inner.sheet_names()
        }

        fn sheet(&mut self, name: &str) -> Result<&Sheet, RustyFormError> {
            self.inner.sheet(name)
        }

        fn close(&mut self) {
            self.inner.close()
        }

        fn cell_value(&mut self, sheet: &str, cell: &CellReference) -> Result<String, RustyFormError> {
            if sheet.contains(self.sheet) && cell.row + 1 >= self.from_row {
                Err(SpreadsheetError::FileError("io".to_owned()))?
            }
            self.inner.cell_value(sheet, cell)
        }
    }

    fn workbook() -> MemorySpreadsheet {
        MemorySpreadsheet::new("form.xlsx")
            .with_sheet(buyer_sheet())
            .with_sheet(controlled_content_sheet())
    }

    #[test]
    fn extracts_every_section() -> Result<(), RustyFormError> {
        let spreadsheet = MemorySpreadsheet::new("form.xlsx")
            .with_sheet(Sheet::new("Cover"))
            .with_sheet(buyer_sheet())
            .with_sheet(controlled_content_sheet());
        let mut extractor = FormExtractor::new(spreadsheet, schema());
        let extraction = extractor.extract()?;

        let buyer = extraction.buyer_details.unwrap();
        assert_eq!(buyer.sheet_name, "1. Buyer Details");
        assert_eq!(buyer.part_number, "ABC-123");
        assert_eq!(buyer.part_description, "Bracket");
        assert_eq!(buyer.classification_of_item, "DUAL");
        assert!(buyer.build_to_print);
        assert!(!buyer.modified);

        assert!(extraction.product_details.is_none());

        let rows = extraction.controlled_content;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].item_num, "1");
        assert_eq!(rows[2].part_number, "P-14");
        assert_eq!(rows[1].eccn_n, "EAR99");
        assert_eq!(rows[1].part_description, "");
        assert!(rows.iter().all(|row| row.sheet_name == "3. Controlled Content"));

        let diagnostics = extractor.diagnostics();
        assert!(diagnostics.iter().all(ExtractError::is_soft));
        assert!(diagnostics
            .iter()
            .any(|diagnostic| matches!(diagnostic, ExtractError::SheetNotFound(word) if word == "product details")));
        assert!(diagnostics.iter().any(|diagnostic| matches!(
            diagnostic,
            ExtractError::FieldNotFound { field, .. } if field == "rfq"
        )));
        Ok(())
    }

    #[test]
    fn closed_session_fails() {
        let spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(buyer_sheet());
        let mut extractor = FormExtractor::new(spreadsheet, schema());
        extractor.close();
        assert!(matches!(
            extractor.extract_buyer_details(),
            Err(RustyFormError::SpreadsheetError(_))
        ));
    }

    #[test]
    fn read_failure_in_one_section_keeps_the_others() -> Result<(), RustyFormError> {
        let spreadsheet = FailingReads { inner: workbook(), sheet: "Buyer", from_row: 13 };
        let mut extractor = FormExtractor::new(spreadsheet, schema());
        let extraction = extractor.extract()?;

        let buyer = extraction.buyer_details.unwrap();
        assert_eq!(buyer.sheet_name, "1. Buyer Details");
        assert_eq!(buyer.part_number, "ABC-123");
        assert_eq!(buyer.part_description, "");
        assert_eq!(extraction.controlled_content.len(), 3);

        let failures: Vec<&ExtractError> = extractor.diagnostics().iter().filter(|error| !error.is_soft()).collect();
        assert!(matches!(
            &failures[..],
            [ExtractError::CellReadFailure { sheet, reference, .. }] if sheet == "1. Buyer Details" && reference == "B13:D13"
        ));
        Ok(())
    }

    #[test]
    fn table_read_failure_keeps_earlier_rows() -> Result<(), RustyFormError> {
        let spreadsheet = FailingReads { inner: workbook(), sheet: "Controlled", from_row: 13 };
        let mut extractor = FormExtractor::new(spreadsheet, schema());
        let extraction = extractor.extract()?;

        assert_eq!(extraction.buyer_details.unwrap().part_number, "ABC-123");
        let rows = extraction.controlled_content;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].part_number, "P-12");
        assert!(matches!(
            extractor.diagnostics().last(),
            Some(ExtractError::CellReadFailure { reference, .. }) if reference == "A13"
        ));
        Ok(())
    }

    #[test]
    fn table_header_read_failure_leaves_table_empty() -> Result<(), RustyFormError> {
        let spreadsheet = FailingReads { inner: workbook(), sheet: "Controlled", from_row: 1 };
        let mut extractor = FormExtractor::new(spreadsheet, schema());
        assert!(extractor.extract_controlled_content()?.is_empty());
        assert!(matches!(
            extractor.diagnostics().last(),
            Some(ExtractError::CellReadFailure { reference, .. }) if reference == "A10"
        ));
        Ok(())
    }
}

//! Tables whose header row and columns are located by text search.
use crate::error::RustyFormError;
use crate::extractor::criteria::ColumnMapping;
use crate::extractor::record::Record;
use crate::extractor::ExtractError;
use crate::helpers::string::label_contains;
use crate::spreadsheet::reference::CellReference;
use crate::spreadsheet::reference::Column;
use crate::spreadsheet::Spreadsheet;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

/// Where to look for the header row: rows are one-based as printed in the sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderWindow {
    pub anchor_column: Column,
    pub first_header_row: usize,
    pub last_header_row: usize,
    /// Used when no row of the window matches
    pub default_header_row: usize,
}

impl Default for HeaderWindow {
    fn default() -> Self {
        HeaderWindow {
            anchor_column: Column(0),
            first_header_row: 10,
            last_header_row: 12,
            default_header_row: 11,
        }
    }
}

/// Header window plus the column mappings of one table.
#[derive(Clone, Debug)]
pub struct TableSchema<R: Record> {
    pub window: HeaderWindow,
    pub columns: Vec<ColumnMapping<R>>,
}

/// Finds the one-based header row: the first row of the window whose anchor cell
/// contains, ignoring case, any search term of any mapping.
///
/// Falls back to the default row with a `HeaderNotFound` diagnostic.
pub fn find_header_row<S: Spreadsheet + ?Sized, R: Record>(
    spreadsheet: &mut S,
    sheet: &str,
    window: &HeaderWindow,
    mappings: &[ColumnMapping<R>],
) -> Result<(usize, Option<ExtractError>), RustyFormError> {
    let terms: Vec<String> = mappings
        .iter()
        .flat_map(|mapping| mapping.search_terms.iter())
        .map(|term| term.to_lowercase())
        .collect();
    for row_number in window.first_header_row..=window.last_header_row {
        let reference = CellReference::at(window.anchor_column, row_number);
        let value = spreadsheet
            .cell_value(sheet, &reference)
            .map_err(|source| ExtractError::read_failure(sheet, reference, source))?
            .to_lowercase();
        if terms.iter().any(|term| value.contains(term.as_str())) {
            debug!(sheet, row = row_number, "found header row");
            return Ok((row_number, None));
        }
    }

    let diagnostic = ExtractError::HeaderNotFound {
        sheet: sheet.to_owned(),
        fallback_row: window.default_header_row,
    };
    warn!("{diagnostic}");
    Ok((window.default_header_row, Some(diagnostic)))
}

/// Binds each mapping to the first column, left to right, whose header cell contains
/// one of its search terms. Unbound mappings are reported as `ColumnNotFound`.
pub fn bind_columns<S: Spreadsheet + ?Sized, R: Record>(
    spreadsheet: &mut S,
    sheet: &str,
    header_row: usize,
    mappings: &[ColumnMapping<R>],
) -> Result<(Vec<ColumnMapping<R>>, Vec<ExtractError>), RustyFormError> {
    let headers = spreadsheet
        .row(sheet, header_row.saturating_sub(1))
        .map_err(|source| ExtractError::read_failure(sheet, format!("row {header_row}"), source))?;

    let mut bound = Vec::with_capacity(mappings.len());
    let mut diagnostics = Vec::new();
    for mapping in mappings {
        let found = headers
            .iter()
            .position(|header| mapping.search_terms.iter().any(|term| label_contains(header, term)));
        let mut mapping = mapping.to_owned();
        match found {
            Some(index) => {
                debug!(sheet, field = %mapping.field, column = %Column(index), "bound column");
                mapping.found_column = Some(Column(index));
            }
            None => {
                let diagnostic = ExtractError::ColumnNotFound {
                    sheet: sheet.to_owned(),
                    field: mapping.field.to_string(),
                };
                warn!("{diagnostic}");
                diagnostics.push(diagnostic);
            }
        }
        bound.push(mapping);
    }
    Ok((bound, diagnostics))
}

/// Locates the header row and columns of a table and returns its rows as a lazy iterator,
/// together with the soft failures found along the way.
pub fn read_table<'a, S: Spreadsheet + ?Sized, R: Record>(
    spreadsheet: &'a mut S,
    sheet: &str,
    schema: &TableSchema<R>,
) -> Result<(TableRows<'a, S, R>, Vec<ExtractError>), RustyFormError> {
    let (header_row, header_diagnostic) = find_header_row(spreadsheet, sheet, &schema.window, &schema.columns)?;
    let (mappings, mut diagnostics) = bind_columns(spreadsheet, sheet, header_row, &schema.columns)?;
    if let Some(diagnostic) = header_diagnostic {
        diagnostics.insert(0, diagnostic);
    }
    let rows = TableRows::new(spreadsheet, sheet, header_row, mappings);
    Ok((rows, diagnostics))
}

/// Rows below the header, one record per row, ending at the first row whose primary
/// column is empty.
///
/// The primary column is the first bound mapping; with no bound mapping there are no rows.
/// A read failure is yielded once and ends the iteration.
pub struct TableRows<'a, S: Spreadsheet + ?Sized, R: Record> {
    spreadsheet: &'a mut S,
    sheet: String,
    /// Next data row, zero-based
    row: usize,
    columns: Vec<(Column, ColumnMapping<R>)>,
    finished: bool,
}

impl<'a, S: Spreadsheet + ?Sized, R: Record> TableRows<'a, S, R> {
    fn new(spreadsheet: &'a mut S, sheet: &str, header_row: usize, mappings: Vec<ColumnMapping<R>>) -> Self {
        let columns: Vec<(Column, ColumnMapping<R>)> = mappings
            .into_iter()
            .filter_map(|mapping| mapping.found_column.map(|column| (column, mapping)))
            .collect();
        TableRows {
            spreadsheet,
            sheet: sheet.to_owned(),
            // header_row is one-based, so it is also the zero-based index of the next row
            row: header_row,
            finished: columns.is_empty(),
            columns,
        }
    }

    fn read_row(&mut self) -> Result<Option<R>, ExtractError> {
        let mut cells = Vec::with_capacity(self.columns.len());
        for (column, _) in &self.columns {
            let reference = CellReference { row: self.row, col: *column };
            let value = self.spreadsheet
                .cell_value(&self.sheet, &reference)
                .map_err(|source| ExtractError::read_failure(&self.sheet, reference, source))?;
            if cells.is_empty() && value.is_empty() {
                return Ok(None);
            }
            cells.push(value.trim().to_owned());
        }

        let mut record = R::default();
        record.set_sheet_name(&self.sheet);
        for ((_, mapping), value) in self.columns.iter().zip(cells) {
            mapping.set(&mut record, value);
        }
        Ok(Some(record))
    }
}

impl<S: Spreadsheet + ?Sized, R: Record> Iterator for TableRows<'_, S, R> {
    type Item = Result<R, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_row() {
            Ok(Some(record)) => {
                self.row += 1;
                Some(Ok(record))
            }
            Ok(None) => {
                debug!(sheet = %self.sheet, row = self.row + 1, "reached end of table");
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::criteria::ColumnDefinition;
    use crate::extractor::record::FieldSetter;
    use crate::spreadsheet::memory::MemorySpreadsheet;
    use crate::spreadsheet::sheet::Sheet;
    use std::fmt::Display;
    use std::fmt::Formatter;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Line {
        sheet_name: String,
        item: String,
        part_number: String,
        eccn: String,
    }

    #[derive(Copy, Clone, Debug, PartialEq)]
    enum LineField {
        Item,
        PartNumber,
        Eccn,
    }

    impl Display for LineField {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl Record for Line {
        type Field = LineField;

        fn setter(field: LineField) -> FieldSetter<Self> {
            match field {
                LineField::Item => FieldSetter::Text(|line, value| line.item = value),
                LineField::PartNumber => FieldSetter::Text(|line, value| line.part_number = value),
                LineField::Eccn => FieldSetter::Text(|line, value| line.eccn = value),
            }
        }

        fn set_sheet_name(&mut self, sheet_name: &str) {
            self.sheet_name = sheet_name.to_owned();
        }
    }

    fn schema(definitions: &[ColumnDefinition<LineField>]) -> TableSchema<Line> {
        TableSchema {
            window: HeaderWindow::default(),
            columns: definitions
                .iter()
                .map(|definition| ColumnMapping::<Line>::compile(definition, &[]).unwrap())
                .collect(),
        }
    }

    fn default_schema() -> TableSchema<Line> {
        schema(&[
            ColumnDefinition::new(LineField::Item, &["Item"]),
            ColumnDefinition::new(LineField::PartNumber, &["part number"]),
            ColumnDefinition::new(LineField::Eccn, &["ECCN N°", "ECCN"]),
        ])
    }

    fn table_sheet(header_row: usize) -> Sheet {
        let mut sheet = Sheet::new("Controlled Content");
        sheet.push_text("A1", "Controlled content declaration").unwrap();
        for (column, header) in ["A", "B", "C"].iter().zip(["Item", "Part  Number", "ECCN N°"]) {
            sheet.push_text(&format!("{column}{header_row}"), header).unwrap();
        }
        for (offset, (item, part, eccn)) in [("1", " P-1 ", "EAR99"), ("2", "P-2", ""), ("3", "P-3", "5A002")].iter().enumerate() {
            let row = header_row + 1 + offset;
            sheet.push_text(&format!("A{row}"), item).unwrap();
            sheet.push_text(&format!("B{row}"), part).unwrap();
            sheet.push_text(&format!("C{row}"), eccn).unwrap();
        }
        // beyond the sentinel row
        sheet.push_text(&format!("B{}", header_row + 6), "not a row").unwrap();
        sheet
    }

    #[test]
    fn streams_rows_until_empty_primary_cell() -> Result<(), RustyFormError> {
        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(table_sheet(11));
        let (rows, diagnostics) = read_table(&mut spreadsheet, "Controlled Content", &default_schema())?;
        assert!(diagnostics.is_empty());
        let lines = rows.collect::<Result<Vec<Line>, ExtractError>>()?;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].part_number, "P-1");
        assert_eq!(lines[0].eccn, "EAR99");
        assert_eq!(lines[1].eccn, "");
        assert_eq!(lines[2].item, "3");
        assert!(lines.iter().all(|line| line.sheet_name == "Controlled Content"));
        Ok(())
    }

    #[test]
    fn blank_looking_primary_cell_is_still_a_row() -> Result<(), RustyFormError> {
        let mut sheet = table_sheet(11);
        sheet.push_text("A13", "  ").unwrap();
        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(sheet);
        let (rows, _) = read_table(&mut spreadsheet, "Controlled Content", &default_schema())?;
        let lines = rows.collect::<Result<Vec<Line>, ExtractError>>()?;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].item, "");
        assert_eq!(lines[1].part_number, "P-2");
        assert_eq!(lines[2].item, "3");
        Ok(())
    }

    #[test]
    fn header_is_searched_in_window() -> Result<(), RustyFormError> {
        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(table_sheet(10));
        let schema = default_schema();
        let (row, diagnostic) = find_header_row(&mut spreadsheet, "Controlled Content", &schema.window, &schema.columns)?;
        assert_eq!((row, diagnostic.is_none()), (10, true));

        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(table_sheet(14));
        let (row, diagnostic) = find_header_row(&mut spreadsheet, "Controlled Content", &schema.window, &schema.columns)?;
        assert_eq!(row, 11);
        assert!(matches!(diagnostic, Some(ExtractError::HeaderNotFound { fallback_row: 11, .. })));
        Ok(())
    }

    #[test]
    fn unbound_columns_are_reported_and_skipped() -> Result<(), RustyFormError> {
        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(table_sheet(11));
        let schema = schema(&[
            ColumnDefinition::new(LineField::Eccn, &["usml"]),
            ColumnDefinition::new(LineField::PartNumber, &["part number"]),
        ]);
        let (rows, diagnostics) = read_table(&mut spreadsheet, "Controlled Content", &schema)?;
        // neither term appears in the anchor column, so row 11 is used as a fallback
        assert!(matches!(
            &diagnostics[..],
            [ExtractError::HeaderNotFound { fallback_row: 11, .. }, ExtractError::ColumnNotFound { field, .. }] if field == "Eccn"
        ));
        // part number becomes the primary column
        let lines = rows.collect::<Result<Vec<Line>, ExtractError>>()?;
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.eccn.is_empty() && line.item.is_empty()));
        Ok(())
    }

    #[test]
    fn no_bound_column_means_no_rows() -> Result<(), RustyFormError> {
        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(table_sheet(11));
        let schema = schema(&[ColumnDefinition::new(LineField::Eccn, &["usml"])]);
        let (mut rows, diagnostics) = read_table(&mut spreadsheet, "Controlled Content", &schema)?;
        assert_eq!(diagnostics.len(), 2);
        assert!(rows.next().is_none());
        Ok(())
    }

    #[test]
    fn read_failure_is_yielded_once() -> Result<(), RustyFormError> {
        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(table_sheet(11));
        let schema = default_schema();
        let (mappings, _) = bind_columns(&mut spreadsheet, "Controlled Content", 11, &schema.columns)?;
        spreadsheet.close();
        let mut rows = TableRows::new(&mut spreadsheet, "Controlled Content", 11, mappings);
        assert!(matches!(rows.next(), Some(Err(ExtractError::CellReadFailure { .. }))));
        assert!(rows.next().is_none());
        Ok(())
    }
}

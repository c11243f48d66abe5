use crate::error::RustyFormError;
use crate::extractor::criteria::FieldSpec;
use crate::extractor::record::Record;
use crate::extractor::strategy::extract_value;
use crate::extractor::value::resolve_value;
use crate::extractor::ExtractError;
use crate::helpers::string::label_contains;
use crate::spreadsheet::Spreadsheet;
use tracing::debug;
use tracing::warn;

/// Populates `record` from `sheet`, one field spec at a time in declared order.
///
/// For each field the candidate anchors are tried in order; the first anchor whose label
/// contains one of the search terms (ignoring case and whitespace runs) supplies the value.
/// Fields matching nothing keep their default and are pushed to `diagnostics` as
/// `FieldNotFound`. A read failure stops the record, leaving the fields filled so far.
pub fn populate<S: Spreadsheet + ?Sized, R: Record>(
    spreadsheet: &mut S,
    sheet: &str,
    record: &mut R,
    fields: &[FieldSpec<R>],
    diagnostics: &mut Vec<ExtractError>,
) -> Result<(), RustyFormError> {
    for spec in fields {
        if !populate_field(spreadsheet, sheet, record, spec)? {
            let diagnostic = ExtractError::FieldNotFound {
                sheet: sheet.to_owned(),
                field: spec.field.to_string(),
            };
            warn!("{diagnostic}");
            diagnostics.push(diagnostic);
        }
    }
    Ok(())
}

/// Creates a record for `sheet` and populates it.
///
/// A read failure ends the record but not the caller: the partly filled record is
/// returned with the `CellReadFailure` as its last diagnostic.
pub fn extract_record<S: Spreadsheet + ?Sized, R: Record>(
    spreadsheet: &mut S,
    sheet: &str,
    fields: &[FieldSpec<R>],
) -> Result<(R, Vec<ExtractError>), RustyFormError> {
    let mut record = R::default();
    record.set_sheet_name(sheet);
    let mut diagnostics = Vec::new();
    if let Err(error) = populate(spreadsheet, sheet, &mut record, fields, &mut diagnostics) {
        let failure = ExtractError::recover(error)?;
        warn!("{failure}");
        diagnostics.push(failure);
    }
    Ok((record, diagnostics))
}

fn populate_field<S: Spreadsheet + ?Sized, R: Record>(
    spreadsheet: &mut S,
    sheet: &str,
    record: &mut R,
    spec: &FieldSpec<R>,
) -> Result<bool, RustyFormError> {
    for anchor in &spec.criteria.cell_ranges {
        let label = resolve_value(spreadsheet, sheet, anchor)
            .map_err(|source| ExtractError::read_failure(sheet, anchor, source))?;
        if !spec.criteria.search_terms.iter().any(|term| label_contains(&label, term)) {
            continue;
        }
        let value = extract_value(spreadsheet, sheet, anchor, &spec.criteria.mode)
            .map_err(|source| ExtractError::read_failure(sheet, anchor, source))?;
        debug!(sheet, field = %spec.field, anchor = %anchor, label = %label, value = ?value, "matched field");
        spec.setter().apply(record, &spec.field.to_string(), value)?;
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::criteria::ExtractionMode;
    use crate::extractor::criteria::FieldDefinition;
    use crate::extractor::record::FieldSetter;
    use crate::spreadsheet::control::FormControl;
    use crate::spreadsheet::memory::MemorySpreadsheet;
    use crate::spreadsheet::reference::CellReference;
    use crate::spreadsheet::sheet::Sheet;
    use crate::spreadsheet::SpreadsheetError;
    use std::fmt::Display;
    use std::fmt::Formatter;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Part {
        sheet_name: String,
        number: String,
        description: String,
        modified: bool,
    }

    #[derive(Copy, Clone, Debug, PartialEq)]
    enum PartField {
        Number,
        Description,
        Modified,
    }

    impl Display for PartField {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            match self {
                PartField::Number => f.write_str("number"),
                PartField::Description => f.write_str("description"),
                PartField::Modified => f.write_str("modified"),
            }
        }
    }

    impl Record for Part {
        type Field = PartField;

        fn setter(field: PartField) -> FieldSetter<Self> {
            match field {
                PartField::Number => FieldSetter::Text(|part, value| part.number = value),
                PartField::Description => FieldSetter::Text(|part, value| part.description = value),
                PartField::Modified => FieldSetter::Flag(|part, value| part.modified = value),
            }
        }

        fn set_sheet_name(&mut self, sheet_name: &str) {
            self.sheet_name = sheet_name.to_owned();
        }
    }

    fn fields() -> Vec<FieldSpec<Part>> {
        [
            FieldDefinition::new(PartField::Number, &["part number", "part-nr"], &["B12:D12"], ExtractionMode::Simple { offset: 3 }),
            FieldDefinition::new(PartField::Description, &["description"], &["B13:D13", "B14:D14"], ExtractionMode::Simple { offset: 3 }),
            FieldDefinition::new(PartField::Modified, &["Modified"], &["B25:F25"], ExtractionMode::boolean(5, &["YES"])),
        ]
        .iter()
        .map(|definition| FieldSpec::<Part>::compile(definition, &[]).unwrap())
        .collect()
    }

    /// Fails every read of one cell and serves everything else from memory.
    struct FailingCell {
        inner: MemorySpreadsheet,
        sheet: &'static str,
        cell: &'static str,
    }

    impl Spreadsheet for FailingCell {
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
            if sheet == self.sheet && cell.to_string() == self.cell {
                Err(SpreadsheetError::FileError(format!("{sheet}!{cell}")))?
            }
            self.inner.cell_value(sheet, cell)
        }
    }

    #[test]
    fn label_match_fills_value_at_offset() -> Result<(), RustyFormError> {
        let mut sheet = Sheet::new("Buyer Details");
        sheet.push_text("B12", "PART   Number").unwrap();
        sheet.push_text("E12", "ABC-123").unwrap();
        sheet.push_text("B14", "Part description").unwrap();
        sheet.push_text("E14", "Bracket").unwrap();
        sheet.push_text("B25", "Modified ?").unwrap();
        sheet.push_control(FormControl::checkbox("G25".parse()?, "Yes", true));
        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(sheet);

        let (part, diagnostics) = extract_record::<_, Part>(&mut spreadsheet, "Buyer Details", &fields())?;
        assert!(diagnostics.is_empty());
        assert_eq!(part.sheet_name, "Buyer Details");
        assert_eq!(part.number, "ABC-123");
        assert_eq!(part.description, "Bracket");
        assert!(part.modified);
        Ok(())
    }

    #[test]
    fn unmatched_field_keeps_default_and_later_fields_still_extract() -> Result<(), RustyFormError> {
        let mut sheet = Sheet::new("Buyer Details");
        sheet.push_text("B12", "Reference").unwrap();
        sheet.push_text("E12", "ignored").unwrap();
        sheet.push_text("B13", "Description").unwrap();
        sheet.push_text("E13", "Bracket").unwrap();
        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(sheet);

        let mut part = Part::default();
        let mut diagnostics = Vec::new();
        populate(&mut spreadsheet, "Buyer Details", &mut part, &fields(), &mut diagnostics)?;
        assert_eq!(part.number, "");
        assert_eq!(part.description, "Bracket");
        assert!(!part.modified);
        let missing: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
        assert_eq!(
            missing,
            vec![
                "Field 'number' not found in sheet 'Buyer Details'",
                "Field 'modified' not found in sheet 'Buyer Details'",
            ]
        );
        Ok(())
    }

    #[test]
    fn read_failure_aborts_record() {
        let mut spreadsheet = MemorySpreadsheet::new("form.xlsx").with_sheet(Sheet::new("Buyer Details"));
        spreadsheet.close();
        let mut part = Part::default();
        let error = populate(&mut spreadsheet, "Buyer Details", &mut part, &fields(), &mut Vec::new()).unwrap_err();
        assert!(matches!(
            error,
            RustyFormError::ExtractError(ExtractError::CellReadFailure { ref reference, .. }) if reference == "B12:D12"
        ));
    }

    #[test]
    fn read_failure_keeps_fields_read_before_it() -> Result<(), RustyFormError> {
        let mut sheet = Sheet::new("Buyer Details");
        sheet.push_text("B12", "Part Number").unwrap();
        sheet.push_text("E12", "ABC-123").unwrap();
        let mut spreadsheet = FailingCell {
            inner: MemorySpreadsheet::new("form.xlsx").with_sheet(sheet),
            sheet: "Buyer Details",
            cell: "B13",
        };

        let (part, diagnostics) = extract_record::<_, Part>(&mut spreadsheet, "Buyer Details", &fields())?;
        assert_eq!(part.sheet_name, "Buyer Details");
        assert_eq!(part.number, "ABC-123");
        assert_eq!(part.description, "");
        assert!(matches!(
            &diagnostics[..],
            [ExtractError::CellReadFailure { reference, .. }] if reference == "B13:D13"
        ));
        Ok(())
    }
}

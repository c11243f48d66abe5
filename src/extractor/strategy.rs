//! Value extraction strategies, one per [`ExtractionMode`].
use crate::error::RustyFormError;
use crate::extractor::checkbox::is_checked;
use crate::extractor::criteria::ClassificationCriteria;
use crate::extractor::criteria::ExtractionMode;
use crate::extractor::record::FieldValue;
use crate::extractor::value::resolve_value;
use crate::spreadsheet::reference::CellRange;
use crate::spreadsheet::Spreadsheet;
use tracing::debug;

/// Extracts the value of a field whose label was found at `anchor`.
pub fn extract_value<S: Spreadsheet + ?Sized>(
    spreadsheet: &mut S,
    sheet: &str,
    anchor: &CellRange,
    mode: &ExtractionMode,
) -> Result<FieldValue, RustyFormError> {
    match mode {
        ExtractionMode::Simple { offset } => {
            let value = resolve_value(spreadsheet, sheet, &anchor.shifted(*offset))?;
            Ok(FieldValue::Text(value))
        }
        ExtractionMode::Boolean(criteria) => {
            let cell = anchor.shifted(criteria.offset).start_cell;
            let checked = is_checked(spreadsheet, sheet, &cell, &criteria.search_terms)?;
            Ok(FieldValue::Flag(checked))
        }
        ExtractionMode::Dual { states } => Ok(FieldValue::Text(classify(spreadsheet, sheet, anchor, states)?)),
        ExtractionMode::Tri { states } => Ok(FieldValue::Text(classify(spreadsheet, sheet, anchor, states)?)),
    }
}

/// Label of the only checked state, or an empty string when none or several are checked.
fn classify<S: Spreadsheet + ?Sized>(
    spreadsheet: &mut S,
    sheet: &str,
    anchor: &CellRange,
    states: &[ClassificationCriteria],
) -> Result<String, RustyFormError> {
    let mut checked = Vec::with_capacity(states.len());
    for state in states {
        let cell = anchor.shifted(state.offset).start_cell;
        if is_checked(spreadsheet, sheet, &cell, &state.search_terms)? {
            checked.push(state.label.as_str());
        }
    }
    match checked.as_slice() {
        [label] => Ok(label.to_string()),
        _ => {
            debug!(sheet, anchor = %anchor, checked = ?checked, "ambiguous classification");
            Ok(String::new())
        }
    }
}

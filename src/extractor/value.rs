use crate::error::RustyFormError;
use crate::spreadsheet::reference::CellRange;
use crate::spreadsheet::Spreadsheet;

/// Resolves the trimmed value shown at the start of `range`.
///
/// An empty start cell falls back to the first merged range whose start address and the
/// cell's address are prefixes of one another, which is how a merged block's value is
/// reached from any of its cells on the first row. No match yields an empty string.
pub fn resolve_value<S: Spreadsheet + ?Sized>(
    spreadsheet: &mut S,
    sheet: &str,
    range: &CellRange,
) -> Result<String, RustyFormError> {
    let value = spreadsheet.cell_value(sheet, &range.start_cell)?;
    if !value.is_empty() {
        return Ok(value.trim().to_owned());
    }

    let address = range.start_cell.to_string();
    let merged = spreadsheet
        .merged_ranges(sheet)?
        .into_iter()
        .find(|merged| merged.covers_by_prefix(&address))
        .map(|merged| merged.value.trim().to_owned());
    Ok(merged.unwrap_or_default())
}

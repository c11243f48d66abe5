use crate::error::RustyFormError;
use crate::spreadsheet::control::FormControlKind;
use crate::spreadsheet::reference::CellReference;
use crate::spreadsheet::Spreadsheet;

/// Whether a checkbox anchored at `cell` with one of `accepted_labels` as caption is checked.
///
/// Several checkboxes may share an anchor cell; the first one whose caption matches decides.
/// No such checkbox means unchecked.
pub fn is_checked<S: Spreadsheet + ?Sized>(
    spreadsheet: &mut S,
    sheet: &str,
    cell: &CellReference,
    accepted_labels: &[String],
) -> Result<bool, RustyFormError> {
    let checked = spreadsheet
        .form_controls(sheet)?
        .into_iter()
        .filter(|control| control.kind == FormControlKind::CheckBox && control.cell == *cell)
        .find(|control| accepted_labels.iter().any(|label| control.has_caption(label)))
        .map(|control| control.checked)
        .unwrap_or(false);
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::control::FormControl;
    use crate::spreadsheet::memory::MemorySpreadsheet;
    use crate::spreadsheet::sheet::Sheet;

    fn cell(value: &str) -> CellReference {
        value.parse().unwrap()
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn spreadsheet() -> MemorySpreadsheet {
        let mut sheet = Sheet::new("Form");
        sheet.push_control(FormControl::checkbox(cell("F21"), "Yes", true));
        sheet.push_control(FormControl::checkbox(cell("F21"), "No", false));
        sheet.push_control(FormControl {
            cell: cell("G21"),
            kind: FormControlKind::OptionButton,
            checked: true,
            paragraphs: vec!["Yes".to_owned()],
        });
        MemorySpreadsheet::new("form.xlsx").with_sheet(sheet)
    }

    #[test]
    fn caption_selects_among_shared_anchor() -> Result<(), RustyFormError> {
        let mut spreadsheet = spreadsheet();
        assert!(is_checked(&mut spreadsheet, "Form", &cell("F21"), &labels(&["YES"]))?);
        assert!(!is_checked(&mut spreadsheet, "Form", &cell("F21"), &labels(&["no"]))?);
        assert!(!is_checked(&mut spreadsheet, "Form", &cell("F21"), &labels(&["Maybe"]))?);
        Ok(())
    }

    #[test]
    fn only_checkboxes_count() -> Result<(), RustyFormError> {
        let mut spreadsheet = spreadsheet();
        assert!(!is_checked(&mut spreadsheet, "Form", &cell("G21"), &labels(&["Yes"]))?);
        assert!(!is_checked(&mut spreadsheet, "Form", &cell("A1"), &labels(&["Yes"]))?);
        Ok(())
    }
}

use crate::spreadsheet::reference::CellReference;
use serde::Serialize;

/// Kind of a legacy form control, from the VML `ObjectType` attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormControlKind {
    CheckBox,
    OptionButton,
    Button,
    GroupBox,
    Label,
    ScrollBar,
    SpinButton,
    ListBox,
    DropDown,
    Other(String),
}

impl FormControlKind {
    pub fn parse(object_type: &str) -> Self {
        match object_type.to_ascii_lowercase().as_str() {
            "checkbox" => Self::CheckBox,
            "radio" => Self::OptionButton,
            "button" => Self::Button,
            "gbox" => Self::GroupBox,
            "label" => Self::Label,
            "scroll" => Self::ScrollBar,
            "spin" => Self::SpinButton,
            "list" => Self::ListBox,
            "drop" => Self::DropDown,
            _ => Self::Other(object_type.to_owned()),
        }
    }
}

/// A form control embedded in a sheet, anchored at the cell under its top-left corner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormControl {
    pub cell: CellReference,
    pub kind: FormControlKind,
    pub checked: bool,
    /// Caption text runs, one per paragraph or formatting run
    pub paragraphs: Vec<String>,
}

impl FormControl {
    pub fn checkbox(cell: CellReference, caption: &str, checked: bool) -> Self {
        FormControl {
            cell,
            kind: FormControlKind::CheckBox,
            checked,
            paragraphs: vec![caption.to_owned()],
        }
    }

    /// Whether any caption paragraph equals `label`, ignoring case and surrounding whitespace.
    pub fn has_caption(&self, label: &str) -> bool {
        let label = label.trim().to_lowercase();
        self.paragraphs
            .iter()
            .any(|paragraph| paragraph.trim().to_lowercase() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_match_is_exact_but_case_insensitive() {
        let control = FormControl::checkbox(CellReference::new(0, 0), " Yes ", true);
        assert!(control.has_caption("YES"));
        assert!(control.has_caption("yes"));
        assert!(!control.has_caption("Y"));
        assert!(!control.has_caption("Yes please"));
    }

    #[test]
    fn object_types() {
        assert_eq!(FormControlKind::parse("Checkbox"), FormControlKind::CheckBox);
        assert_eq!(FormControlKind::parse("Radio"), FormControlKind::OptionButton);
        assert_eq!(FormControlKind::parse("Note"), FormControlKind::Other("Note".to_owned()));
    }
}

use crate::extractor::ExtractError;
use tracing::debug;

/// Finds the sheet whose name contains `search_word`, ignoring case.
///
/// When several sheets match, the last one in workbook order wins.
pub fn find_sheet<S: AsRef<str>>(sheet_names: &[S], search_word: &str) -> Result<String, ExtractError> {
    let needle = search_word.to_lowercase();
    let found = sheet_names
        .iter()
        .map(AsRef::<str>::as_ref)
        .rfind(|name| name.to_lowercase().contains(&needle))
        .map(str::to_owned);
    match found {
        Some(name) => {
            debug!(search_word, sheet = %name, "resolved sheet");
            Ok(name)
        }
        None => Err(ExtractError::SheetNotFound(search_word.to_owned())),
    }
}

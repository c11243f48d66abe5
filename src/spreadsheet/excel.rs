//! Office Open XML package helpers
use crate::error::RustyFormError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::collections::HashMap;
use zip::ZipArchive;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Relationship type suffixes
pub(super) const WORKSHEET_RELATIONSHIP: &str = "/worksheet";
pub(super) const VML_DRAWING_RELATIONSHIP: &str = "/vmlDrawing";

/// Opens the zip package of a workbook, rejecting encrypted files.
///
/// Excel stores password protected workbooks in an OLE compound file instead of a zip.
pub(super) fn open_archive(file_name: &str, mut reader: UnifiedReader) -> Result<ZipArchive<UnifiedReader>, RustyFormError> {
    if reader.is_compound_file()? {
        Err(SpreadsheetError::SpreadsheetPasswordProtectedError(file_name.to_owned()))?;
    }
    Ok(ZipArchive::new(reader)?)
}

/// Loads the relationships of `part` whose type ends with `kind`.
///
/// # Returns
/// Mapping of relationship IDs to package paths resolved against `part`,
/// or `None` if the part has no relationships file.
pub(super) fn load_relationships(
    zip: &mut ZipArchive<UnifiedReader>,
    part: &str,
    kind: &str,
) -> Result<Option<HashMap<String, String>>, RustyFormError> {
    let mut reader = match zip.xml_reader(&relationships_path(part))? {
        Some(reader) => reader,
        None => return Ok(None),
    };
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let relationship_type = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if relationship_type.map(|it| it.ends_with(kind)).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), resolve_part_path(part, &target));
                }
            }
        }
    });
    Ok(Some(relationships))
}

/// Maps format indexes to cell types using custom and built-in formats
pub(super) fn load_number_formats(format_indexes: Vec<String>, custom_formats: HashMap<String, CellType>, is_1904: bool) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Path of the relationships part belonging to `part`,
/// e.g. `xl/worksheets/_rels/sheet1.xml.rels` for `xl/worksheets/sheet1.xml`.
pub(super) fn relationships_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((directory, file_name)) => format!("{directory}/_rels/{file_name}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolves a relationship target against the part that declares it.
/// Absolute targets start at the package root; relative ones may climb with `..`.
pub(super) fn resolve_part_path(part: &str, target: &str) -> String {
    let target = target.replace('\\', "/");
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_owned();
    }
    let mut segments: Vec<&str> = part.split('/').collect();
    segments.pop();
    for segment in target.split('/') {
        match segment {
            "" | "." => (),
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

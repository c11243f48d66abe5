use crate::error::ResultMessage;
use crate::error::RustyFormError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::vml::read_form_controls;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;
use zip::read::ZipFile;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content
const TAG_MERGE_CELL: QName = QName(b"mergeCell");    // Merged range
const TAG_LEGACY_DRAWING: QName = QName(b"legacyDrawing"); // VML drawing with form controls

/// An Office Open XML workbook (`.xlsx`, `.xlsm`, `.xltx`, `.xltm`).
///
/// Opening reads only the workbook structure and styles. Shared strings are read on the
/// first sheet access, and each worksheet with its merged ranges and VML form controls is
/// parsed once and cached.
pub struct XlsxSpreadsheet {
    /// File name of the spreadsheet
    name: String,
    /// ZIP archive containing the workbook parts, `None` once closed
    zip: Option<ZipArchive<UnifiedReader>>,
    /// Parsed number formats for cell type detection, indexed by style ID
    number_formats: Vec<CellType>,
    /// List of worksheets with (name, zip_path) pairs
    sheets: Vec<(String, String)>,
    shared_strings: Option<Vec<String>>,
    cache: HashMap<String, Sheet>,
}

impl XlsxSpreadsheet {
    /// Opens an XLSX workbook from disk and parses its structure
    pub fn open<P: AsRef<Path>>(path: P) -> Result<XlsxSpreadsheet, RustyFormError> {
        let name = path.as_ref().display().to_string();
        let reader = UnifiedReader::open(path.as_ref())?;
        Self::load(name, reader)
    }

    /// Opens an XLSX workbook already held in memory
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<XlsxSpreadsheet, RustyFormError> {
        Self::load(name.to_owned(), UnifiedReader::from_bytes(bytes))
    }

    fn load(name: String, reader: UnifiedReader) -> Result<XlsxSpreadsheet, RustyFormError> {
        let mut zip = excel::open_archive(&name, reader)?;
        let (sheets, is_1904) = load_workbook(&mut zip).with_prefix(&name)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(name.to_owned()))?
        }
        let number_formats = load_number_formats(&mut zip, is_1904).with_prefix(&name)?;
        debug!(file = %name, sheets = sheets.len(), "opened workbook");
        Ok(XlsxSpreadsheet {
            name,
            zip: Some(zip),
            number_formats,
            sheets,
            shared_strings: None,
            cache: HashMap::new(),
        })
    }

    fn closed_error(&self) -> RustyFormError {
        SpreadsheetError::SpreadsheetClosedError(self.name.to_owned()).into()
    }

    /// Parses one worksheet with its merged ranges and form controls.
    fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, RustyFormError> {
        let zip_path = self.sheets.iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, path)| path.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(sheet_name.to_owned()))?;
        let zip = self.zip.as_mut().ok_or_else(|| SpreadsheetError::SpreadsheetClosedError(self.name.to_owned()))?;
        if self.shared_strings.is_none() {
            self.shared_strings = Some(load_shared_strings(zip)?);
        }
        let shared_strings = self.shared_strings.as_deref().unwrap_or_default();

        let mut sheet = Sheet::new(sheet_name);
        let mut merged_ranges = Vec::<String>::new();
        let mut drawing_id = None::<String>;
        {
            let mut reader = zip.xml_reader(&zip_path)?
                .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
            let mut row_count = 0usize;
            let mut col_count = 0usize;
            let mut row = 0usize;
            let mut col = 0usize;
            let mut kind = CellType::default();
            let mut is_shared = false;
            let mut value = String::new();
            match_xml_events!(reader => {
                Event::Start(event) if event.name() == TAG_ROW => {
                    row_count = event.get_attribute_value("r")?
                        .and_then(|number| number.parse::<usize>().ok())
                        .and_then(|number| number.checked_sub(1))
                        .unwrap_or(row_count);
                    col_count = 0;
                }
                Event::End(event) if event.name() == TAG_ROW => {
                    row_count += 1;
                }
                Event::Start(event) if event.name() == TAG_CELL => {
                    (row, col) = event.get_attribute_value("r")?
                        .and_then(|reference| reference_to_index(&reference))
                        .unwrap_or((row_count, col_count));
                    col_count = col + 1;
                    value.clear();
                    let cell_type = event.get_attribute_value("t")?;
                    is_shared = cell_type.as_deref() == Some("s");
                    kind = cell_type.map(|t| {
                        match t.as_ref() {
                            "inlineStr" | "str" | "s" => CellType::Text,
                            "d" => CellType::IsoDateTime,
                            "b" => CellType::Boolean,
                            "e" => CellType::Error,
                            _ => CellType::Number,
                        }
                    }).unwrap_or(CellType::Number);
                    if let Some(format_id) = event.get_attribute_value("s")? {
                        if kind == CellType::Number && !format_id.is_empty() {
                            let index = format_id.parse::<usize>()?;
                            kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                        }
                    }
                }
                Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                    value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
                }
                Event::Start(event) if event.name() == TAG_VALUE => {
                    value = read_string_value(&mut reader, TAG_VALUE, true)?;
                }
                Event::End(event) if !value.is_empty() && event.name() == TAG_CELL => {
                    let cell = if is_shared {
                        let index = value.trim().parse::<usize>()?;
                        let text = shared_strings.get(index).map(String::as_str).unwrap_or_default();
                        Cell::text(row, col, text)
                    } else {
                        Cell { row, col, kind, value: value.to_owned() }
                    };
                    sheet.push(cell);
                    value.clear();
                }
                Event::Start(event) if event.name() == TAG_MERGE_CELL => {
                    if let Some(range) = event.get_attribute_value("ref")? {
                        merged_ranges.push(range.to_string());
                    }
                }
                Event::Start(event) if event.name() == TAG_LEGACY_DRAWING => {
                    drawing_id = event.get_local_attribute_value(b"id")?.map(|id| id.to_string());
                }
            });
        }

        for range in merged_ranges {
            sheet.merge(&range)?;
        }

        if let Some(drawing_id) = drawing_id {
            let drawing_path = load_relationships(zip, &zip_path, excel::VML_DRAWING_RELATIONSHIP)?
                .and_then(|mut relationships| relationships.remove(&drawing_id));
            if let Some(drawing_path) = drawing_path {
                if let Some(mut reader) = zip.xml_reader(&drawing_path)? {
                    for control in read_form_controls(&mut reader).with_prefix(&drawing_path)? {
                        sheet.push_control(control);
                    }
                }
            }
        }

        debug!(sheet = sheet_name, controls = sheet.form_controls().len(), "loaded sheet");
        Ok(sheet)
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Result<Vec<String>, RustyFormError> {
        if self.zip.is_none() {
            return Err(self.closed_error());
        }
        Ok(self.sheets.iter().map(|(name, _)| name.to_owned()).collect())
    }

    fn sheet(&mut self, name: &str) -> Result<&Sheet, RustyFormError> {
        if self.zip.is_none() {
            return Err(self.closed_error());
        }
        if !self.cache.contains_key(name) {
            let sheet = self.read_sheet(name).with_prefix(&self.name)?;
            self.cache.insert(name.to_owned(), sheet);
        }
        self.cache
            .get(name)
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(name.to_owned()).into())
    }

    fn close(&mut self) {
        if self.zip.take().is_some() {
            debug!(file = %self.name, "closed workbook");
        }
        self.shared_strings = None;
        self.cache.clear();
    }
}

/// Loads every shared string of the workbook, in table order
fn load_shared_strings(zip: &mut ZipArchive<UnifiedReader>) -> Result<Vec<String>, RustyFormError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
            shared_strings.push(string);
        }
    });
    Ok(shared_strings)
}

/// Loads sheet names with their part paths and the date system from `xl/workbook.xml`
fn load_workbook(zip: &mut ZipArchive<UnifiedReader>) -> Result<(Vec<(String, String)>, bool), RustyFormError> {
    let relationships = load_relationships(zip, "xl/workbook.xml", excel::WORKSHEET_RELATIONSHIP)?
        .ok_or_else(|| SpreadsheetError::FileError("xl/_rels/workbook.xml.rels".to_string()))?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(id.as_ref()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads number formats and cell styles from `xl/styles.xml`
///
/// # Returns
/// Vector of CellType values indexed by style ID
fn load_number_formats(zip: &mut ZipArchive<UnifiedReader>, is_1904: bool) -> Result<Vec<CellType>, RustyFormError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                let style = CellType::parse_custom_number_format(&format, is_1904);
                custom_formats.insert(id.to_string(), style);
            }
        }

        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => break,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            format_indexes.push(event.get_attribute_value("numFmtId")?.unwrap_or(Cow::Borrowed("0")).to_string());
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Skips phonetic text annotations. `is_text_content` treats the whole element as text,
/// as for `<v>`; otherwise only `<t>` runs are collected.
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, UnifiedReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, RustyFormError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

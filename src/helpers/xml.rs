//! XML parsing utilities for the Office Open XML parts of a workbook
//! (workbook, worksheets, shared strings, styles, relationships and VML drawings).

use crate::error::RustyFormError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// XML reader wrapper configured for loosely formed spreadsheet parts.
///
/// End names are not checked because VML drawings written by Excel contain
/// unclosed `<br>` elements.
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event, `None` at end of document
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, RustyFormError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(RustyFormError::XmlError(error)),
        }
    }
}

/// Helper trait for XML attributes
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, RustyFormError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, RustyFormError> {
        Ok(self.unescape_value()?)
    }
}

/// Helper trait for start tags
pub(crate) trait XmlNodeHelper<'a> {
    /// Gets an attribute value by its full (possibly prefixed) name
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustyFormError>;

    /// Gets an attribute value by local name, ignoring any namespace prefix
    fn get_local_attribute_value(&'a self, local_name: &[u8]) -> Result<Option<Cow<'a, str>>, RustyFormError>;

    /// Whether the tag's local name equals `local_name`
    fn is(&self, local_name: &[u8]) -> bool;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustyFormError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }

    fn get_local_attribute_value(&'a self, local_name: &[u8]) -> Result<Option<Cow<'a, str>>, RustyFormError> {
        for result in self.attributes() {
            let attribute = result?;
            if attribute.key.local_name().as_ref() == local_name {
                return Ok(Some(attribute.get_value()?));
            }
        }
        Ok(None)
    }

    fn is(&self, local_name: &[u8]) -> bool {
        self.local_name().as_ref() == local_name
    }
}

/// Local-name comparison for end tags
pub(crate) trait XmlEndHelper {
    fn is(&self, local_name: &[u8]) -> bool;
}

impl XmlEndHelper for BytesEnd<'_> {
    fn is(&self, local_name: &[u8]) -> bool {
        self.local_name().as_ref() == local_name
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends text for an entity or character reference such as `&amp;` or `&#10;`
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyFormError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyFormError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else if raw == "nbsp" {
            // HTML entity used by VML text boxes
            self.push(' ');
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn unclosed_elements_are_tolerated() -> Result<(), RustyFormError> {
        let mut reader = XmlReader::new(Cursor::new(
            b"<xml><div>Yes<br></div><x:Checked>1</x:Checked></xml>".to_vec(),
        ));
        let mut text = String::new();
        let mut names = Vec::new();
        match_xml_events!(reader => {
            Event::Start(event) => names.push(String::from_utf8_lossy(event.local_name().as_ref()).to_string()),
            Event::Text(event) => text.push_str(&event.xml_content()?),
        });
        assert_eq!(names, vec!["xml", "div", "br", "Checked"]);
        assert_eq!(text, "Yes1");
        Ok(())
    }

    #[test]
    fn resolves_character_references() -> Result<(), RustyFormError> {
        let mut reader = XmlReader::new(Cursor::new(b"<t>A&amp;B&#x41;&#66;</t>".to_vec()));
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Text(event) => text.push_str(&event.xml_content()?),
            Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
        });
        assert_eq!(text, "A&BAB");
        Ok(())
    }
}

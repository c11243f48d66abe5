//! Legacy form controls stored in VML drawings.
//!
//! Excel keeps checkboxes, option buttons and friends as `v:shape` elements whose
//! `x:ClientData` child carries the control type, the anchor and the checked state,
//! while the caption lives in the shape's `v:textbox`:
//!
//! ```xml
//! <v:shape id="_x0000_s1025" type="#_x0000_t201">
//!   <v:textbox><div><font face="Tahoma">Yes</font></div></v:textbox>
//!   <x:ClientData ObjectType="Checkbox">
//!     <x:Anchor>5, 0, 11, 2, 6, 30, 12, 4</x:Anchor>
//!     <x:Checked>1</x:Checked>
//!   </x:ClientData>
//! </v:shape>
//! ```
use crate::error::RustyFormError;
use crate::helpers::xml::XmlEndHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::match_xml_events;
use crate::spreadsheet::control::FormControl;
use crate::spreadsheet::control::FormControlKind;
use crate::spreadsheet::reference::CellReference;
use quick_xml::events::Event;
use std::io::BufRead;

const TAG_SHAPE: &[u8] = b"shape";
const TAG_TEXTBOX: &[u8] = b"textbox";
const TAG_CLIENT_DATA: &[u8] = b"ClientData";
const TAG_ANCHOR: &[u8] = b"Anchor";
const TAG_CHECKED: &[u8] = b"Checked";

#[derive(Copy, Clone, PartialEq)]
enum Property {
    Anchor,
    Checked,
}

/// Control properties collected while walking one `v:shape`.
#[derive(Default)]
struct ShapeState {
    object_type: Option<String>,
    anchor: String,
    checked: String,
    paragraphs: Vec<String>,
    run: String,
}

impl ShapeState {
    fn flush_run(&mut self) {
        if !self.run.trim().is_empty() {
            self.paragraphs.push(self.run.trim().to_owned());
        }
        self.run.clear();
    }

    fn into_control(self) -> Option<FormControl> {
        let kind = FormControlKind::parse(self.object_type.as_deref()?);
        let cell = parse_anchor(&self.anchor)?;
        let checked = self.checked.trim().parse::<i64>().map(|state| state != 0).unwrap_or(false);
        Some(FormControl {
            cell,
            kind,
            checked,
            paragraphs: self.paragraphs,
        })
    }
}

/// Reads every form control of a VML drawing.
/// Shapes without `ClientData` (comments' frames, pictures) or without a valid anchor are skipped.
pub(super) fn read_form_controls<R: BufRead>(reader: &mut XmlReader<R>) -> Result<Vec<FormControl>, RustyFormError> {
    let mut controls = Vec::new();
    let mut shape: Option<ShapeState> = None;
    let mut in_textbox = false;
    let mut property: Option<Property> = None;

    match_xml_events!(reader => {
        Event::Start(event) if event.is(TAG_SHAPE) => {
            shape = Some(ShapeState::default());
            in_textbox = false;
        }
        Event::End(event) if event.is(TAG_SHAPE) => {
            if let Some(control) = shape.take().and_then(ShapeState::into_control) {
                controls.push(control);
            }
        }
        Event::Start(event) if event.is(TAG_TEXTBOX) => in_textbox = true,
        Event::End(event) if event.is(TAG_TEXTBOX) => {
            in_textbox = false;
            if let Some(state) = shape.as_mut() {
                state.flush_run();
            }
        }
        Event::Start(event) if event.is(TAG_CLIENT_DATA) => {
            if let Some(state) = shape.as_mut() {
                state.object_type = event.get_local_attribute_value(b"ObjectType")?.map(|it| it.to_string());
            }
        }
        Event::Start(event) if event.is(TAG_ANCHOR) => property = Some(Property::Anchor),
        Event::Start(event) if event.is(TAG_CHECKED) => property = Some(Property::Checked),
        Event::End(event) if event.is(TAG_ANCHOR) || event.is(TAG_CHECKED) => property = None,
        // Runs inside the text box end at any markup boundary (div, font, br)
        Event::Start(_) if in_textbox => {
            if let Some(state) = shape.as_mut() {
                state.flush_run();
            }
        }
        Event::End(_) if in_textbox => {
            if let Some(state) = shape.as_mut() {
                state.flush_run();
            }
        }
        Event::Text(event) => {
            if let Some(state) = shape.as_mut() {
                let text = event.xml_content()?;
                match property {
                    Some(Property::Anchor) => state.anchor.push_str(&text),
                    Some(Property::Checked) => state.checked.push_str(&text),
                    None if in_textbox => state.run.push_str(&text),
                    None => (),
                }
            }
        }
        Event::GeneralRef(event) if in_textbox => {
            if let Some(state) = shape.as_mut() {
                state.run.push_bytes_ref(&event)?;
            }
        }
    });
    Ok(controls)
}

/// Anchor is `LeftColumn, LeftOffset, TopRow, TopOffset, RightColumn, RightOffset, BottomRow, BottomOffset`.
fn parse_anchor(anchor: &str) -> Option<CellReference> {
    let mut values = anchor.split(',').map(|value| value.trim().parse::<usize>());
    let left_column = values.next()?.ok()?;
    let _left_offset = values.next()?.ok()?;
    let top_row = values.next()?.ok()?;
    Some(CellReference::new(top_row, left_column))
}

//! Output records and the typed setters that populate them.
use crate::extractor::criteria::SchemaError;
use serde::Serialize;
use std::fmt::Debug;
use std::fmt::Display;

/// Kind of value a field holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Flag,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => f.write_str("text"),
            FieldKind::Flag => f.write_str("flag"),
        }
    }
}

/// A value produced by an extraction strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Flag(_) => FieldKind::Flag,
        }
    }
}

/// Typed assignment into one field of a record.
pub enum FieldSetter<R> {
    Text(fn(&mut R, String)),
    Flag(fn(&mut R, bool)),
}

// Derives would require `R: Clone`
impl<R> Clone for FieldSetter<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldSetter<R> {}

impl<R> Debug for FieldSetter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldSetter::{}", self.kind())
    }
}

impl<R> FieldSetter<R> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSetter::Text(_) => FieldKind::Text,
            FieldSetter::Flag(_) => FieldKind::Flag,
        }
    }

    /// Assigns `value`, refusing a value of the other kind.
    pub fn apply(&self, record: &mut R, field: &str, value: FieldValue) -> Result<(), SchemaError> {
        match (self, value) {
            (FieldSetter::Text(set), FieldValue::Text(value)) => set(record, value),
            (FieldSetter::Flag(set), FieldValue::Flag(value)) => set(record, value),
            (setter, value) => Err(SchemaError::ValueKindMismatch {
                field: field.to_owned(),
                expected: setter.kind(),
                found: value.kind(),
            })?,
        }
        Ok(())
    }
}

/// A flat output record populated field by field.
///
/// `Field` enumerates the record's assignable fields; `setter` maps each one to its
/// typed assignment, so adding a field without a setter does not compile.
pub trait Record: Default {
    type Field: Copy + Debug + Display + PartialEq + 'static;

    fn setter(field: Self::Field) -> FieldSetter<Self>;

    /// Records the sheet the values were read from.
    fn set_sheet_name(&mut self, sheet_name: &str);
}

//! Declarative field and column schemas.
//!
//! A schema is written as [`FieldDefinition`]s and [`ColumnDefinition`]s (built in or
//! loaded from YAML) and compiled into [`FieldSpec`]s and [`ColumnMapping`]s, which pair
//! each definition with the record's typed setter.
use crate::extractor::record::FieldKind;
use crate::extractor::record::FieldSetter;
use crate::extractor::record::Record;
use crate::spreadsheet::reference::CellRange;
use crate::spreadsheet::reference::Column;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Placeholder expanded once per configured company name.
pub const COMPANY_NAME_PLACEHOLDER: &str = "{companyName}";

/// Errors found while compiling a schema.
#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("Field '{field}' holds {expected} values but its extraction mode yields {found}")]
    ValueKindMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },

    #[error("Field '{0}' has no search terms")]
    MissingSearchTerms(String),

    #[error("Field '{0}' has no cell ranges")]
    MissingCellRanges(String),
}

/// One candidate state of a mutually exclusive checkbox group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationCriteria {
    /// Value produced when this state alone is checked
    pub label: String,
    /// Accepted checkbox captions
    pub search_terms: Vec<String>,
    pub offset: u32,
}

impl ClassificationCriteria {
    pub fn new(label: &str, search_terms: &[&str], offset: u32) -> Self {
        ClassificationCriteria {
            label: label.to_owned(),
            search_terms: to_strings(search_terms),
            offset,
        }
    }
}

/// A single checkbox field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoolClassificationCriteria {
    pub offset: u32,
    /// Accepted checkbox captions
    pub search_terms: Vec<String>,
}

/// How the value of a field is obtained once its label is found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Cell text `offset` columns right of the anchor
    Simple { offset: u32 },
    /// Checked state of one checkbox
    Boolean(BoolClassificationCriteria),
    /// Label of the single checked state out of two
    Dual { states: [ClassificationCriteria; 2] },
    /// Label of the single checked state out of three
    Tri { states: [ClassificationCriteria; 3] },
}

impl ExtractionMode {
    pub fn boolean(offset: u32, search_terms: &[&str]) -> Self {
        ExtractionMode::Boolean(BoolClassificationCriteria {
            offset,
            search_terms: to_strings(search_terms),
        })
    }

    /// Kind of value this mode produces.
    pub fn value_kind(&self) -> FieldKind {
        match self {
            ExtractionMode::Boolean(_) => FieldKind::Flag,
            ExtractionMode::Simple { .. } | ExtractionMode::Dual { .. } | ExtractionMode::Tri { .. } => FieldKind::Text,
        }
    }

    fn expand_company_names(&self, company_names: &[String]) -> Self {
        let expand_state = |state: &ClassificationCriteria| ClassificationCriteria {
            label: state.label.to_owned(),
            search_terms: expand_company_names(&state.search_terms, company_names),
            offset: state.offset,
        };
        match self {
            ExtractionMode::Simple { offset } => ExtractionMode::Simple { offset: *offset },
            ExtractionMode::Boolean(criteria) => ExtractionMode::Boolean(BoolClassificationCriteria {
                offset: criteria.offset,
                search_terms: expand_company_names(&criteria.search_terms, company_names),
            }),
            ExtractionMode::Dual { states } => ExtractionMode::Dual { states: states.each_ref().map(expand_state) },
            ExtractionMode::Tri { states } => ExtractionMode::Tri { states: states.each_ref().map(expand_state) },
        }
    }
}

/// What to look for and where, for one logical field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Candidate label texts
    pub search_terms: Vec<String>,
    /// Candidate anchors, tried in order
    pub cell_ranges: Vec<CellRange>,
    pub mode: ExtractionMode,
}

/// Serializable definition of one field, keyed by the record's field tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition<F> {
    pub field: F,
    pub search_terms: Vec<String>,
    pub cell_ranges: Vec<CellRange>,
    pub mode: ExtractionMode,
}

impl<F> FieldDefinition<F> {
    /// Builds a definition from string literals; `ranges` must be valid references.
    pub(crate) fn new(field: F, search_terms: &[&str], ranges: &[&str], mode: ExtractionMode) -> Self {
        FieldDefinition {
            field,
            search_terms: to_strings(search_terms),
            cell_ranges: ranges
                .iter()
                .map(|range| range.parse().expect("Hardcode cell range"))
                .collect(),
            mode,
        }
    }
}

/// A compiled field: criteria plus the typed setter of the record field.
#[derive(Clone, Debug)]
pub struct FieldSpec<R: Record> {
    pub field: R::Field,
    pub criteria: SearchCriteria,
    setter: FieldSetter<R>,
}

impl<R: Record> FieldSpec<R> {
    /// Pairs `criteria` with the setter of `field`, checking that the mode produces
    /// the kind of value the field holds.
    pub fn new(field: R::Field, criteria: SearchCriteria) -> Result<Self, SchemaError> {
        let setter = R::setter(field);
        if setter.kind() != criteria.mode.value_kind() {
            Err(SchemaError::ValueKindMismatch {
                field: field.to_string(),
                expected: setter.kind(),
                found: criteria.mode.value_kind(),
            })?
        }
        Ok(FieldSpec { field, criteria, setter })
    }

    /// Validates and compiles a definition, expanding company-name placeholders.
    pub fn compile(definition: &FieldDefinition<R::Field>, company_names: &[String]) -> Result<Self, SchemaError> {
        let field = definition.field;
        if definition.search_terms.is_empty() {
            Err(SchemaError::MissingSearchTerms(field.to_string()))?
        }
        if definition.cell_ranges.is_empty() {
            Err(SchemaError::MissingCellRanges(field.to_string()))?
        }
        let criteria = SearchCriteria {
            search_terms: expand_company_names(&definition.search_terms, company_names),
            cell_ranges: definition.cell_ranges.to_owned(),
            mode: definition.mode.expand_company_names(company_names),
        };
        FieldSpec::new(field, criteria)
    }

    pub fn setter(&self) -> FieldSetter<R> {
        self.setter
    }
}

/// Serializable definition of one table column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition<F> {
    pub field: F,
    pub search_terms: Vec<String>,
}

impl<F> ColumnDefinition<F> {
    pub(crate) fn new(field: F, search_terms: &[&str]) -> Self {
        ColumnDefinition { field, search_terms: to_strings(search_terms) }
    }
}

/// A table column bound to a text field, resolved once per sheet.
#[derive(Debug)]
pub struct ColumnMapping<R: Record> {
    pub field: R::Field,
    pub search_terms: Vec<String>,
    /// Column whose header matched, `None` until discovered
    pub found_column: Option<Column>,
    setter: fn(&mut R, String),
}

// Derive would require `R: Clone`
impl<R: Record> Clone for ColumnMapping<R> {
    fn clone(&self) -> Self {
        ColumnMapping {
            field: self.field,
            search_terms: self.search_terms.to_owned(),
            found_column: self.found_column,
            setter: self.setter,
        }
    }
}

impl<R: Record> ColumnMapping<R> {
    /// Table cells are text; flag fields cannot be mapped to columns.
    pub fn new(field: R::Field, search_terms: Vec<String>) -> Result<Self, SchemaError> {
        match R::setter(field) {
            FieldSetter::Text(setter) => Ok(ColumnMapping { field, search_terms, found_column: None, setter }),
            FieldSetter::Flag(_) => Err(SchemaError::ValueKindMismatch {
                field: field.to_string(),
                expected: FieldKind::Flag,
                found: FieldKind::Text,
            }),
        }
    }

    pub fn compile(definition: &ColumnDefinition<R::Field>, company_names: &[String]) -> Result<Self, SchemaError> {
        if definition.search_terms.is_empty() {
            Err(SchemaError::MissingSearchTerms(definition.field.to_string()))?
        }
        ColumnMapping::new(definition.field, expand_company_names(&definition.search_terms, company_names))
    }

    pub(crate) fn set(&self, record: &mut R, value: String) {
        (self.setter)(record, value)
    }
}

/// Expands `{companyName}` in every term, once per company name.
/// Terms without the placeholder are kept once, in their original position.
pub fn expand_company_names(terms: &[String], company_names: &[String]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(terms.len());
    for term in terms {
        if term.contains(COMPANY_NAME_PLACEHOLDER) {
            expanded.extend(
                company_names
                    .iter()
                    .map(|company_name| term.replace(COMPANY_NAME_PLACEHOLDER, company_name)),
            );
        } else {
            expanded.push(term.to_owned());
        }
    }
    expanded
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

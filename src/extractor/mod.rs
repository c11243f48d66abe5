//! # Form Extraction
//!
//! Label-driven extraction from spreadsheet forms. Fields are located by searching candidate
//! anchor cells for label text, and their values are read at a column offset from the anchor
//! as cell text, a checkbox state or the label of the single checked state in a group.
//! Tables are located by their header row and read until the first empty row.
//!
//! Soft failures (a missing sheet, field, header or column) are collected as
//! [`ExtractError`] diagnostics and logged. An accessor failure ends only the record or
//! table being read and is kept as a `CellReadFailure` diagnostic.
pub mod checkbox;
pub mod criteria;
pub mod fields;
pub mod record;
mod session;
pub mod sheets;
pub mod strategy;
pub mod table;
pub mod value;

pub use session::FormExtractor;

use crate::error::RustyFormError;
use std::fmt::Display;
use thiserror::Error;

/// Failures found while extracting one form.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No sheet matches '{0}'")]
    SheetNotFound(String),

    #[error("Failed to read '{reference}' in sheet '{sheet}': {source}")]
    CellReadFailure {
        sheet: String,
        reference: String,
        source: Box<RustyFormError>,
    },

    #[error("Field '{field}' not found in sheet '{sheet}'")]
    FieldNotFound { sheet: String, field: String },

    #[error("Header row not found in sheet '{sheet}', using row {fallback_row}")]
    HeaderNotFound { sheet: String, fallback_row: usize },

    #[error("Column '{field}' not found in sheet '{sheet}'")]
    ColumnNotFound { sheet: String, field: String },
}

impl ExtractError {
    /// Wraps an accessor failure, keeping an already wrapped one as is.
    pub(crate) fn read_failure(sheet: &str, reference: impl Display, source: RustyFormError) -> ExtractError {
        match source {
            RustyFormError::ExtractError(error @ ExtractError::CellReadFailure { .. }) => error,
            source => ExtractError::CellReadFailure {
                sheet: sheet.to_owned(),
                reference: reference.to_string(),
                source: Box::new(source),
            },
        }
    }

    /// Takes the `CellReadFailure` out of `error`, handing any other error back.
    pub(crate) fn recover(error: RustyFormError) -> Result<ExtractError, RustyFormError> {
        match error {
            RustyFormError::ExtractError(failure @ ExtractError::CellReadFailure { .. }) => Ok(failure),
            error => Err(error),
        }
    }

    /// Whether extraction of the current record carries on past this failure.
    pub fn is_soft(&self) -> bool {
        !matches!(self, ExtractError::CellReadFailure { .. })
    }
}

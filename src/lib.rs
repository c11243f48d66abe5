//! # Rusty Form
//!
//! Label-driven extraction of structured data from spreadsheet forms whose layout drifts
//! between versions. Values are found by searching candidate cells for label text rather
//! than by trusting fixed coordinates, and checkbox groups are read from the form controls
//! embedded in the workbook.
//!
//! ## Features
//!
//! - **Criteria-driven fields**: candidate anchors, search terms and an extraction mode per field
//! - **Checkbox classifications**: single checkboxes and two- or three-state groups
//! - **Dynamic tables**: header row and columns located by text, rows read up to the first blank
//! - **Pure Rust xlsx reader**: shared strings, merged cells, date formats and VML form controls
//! - **Configurable schema**: YAML overrides for company names, sheet names and field criteria
//!
//! ## Example
//!
//! ```no_run
//! use rusty_form::{FormExtractor, FormSchema};
//!
//! let schema = FormSchema::seccf(&["Acme".to_owned()])?;
//! let mut extractor = FormExtractor::open("form.xlsx", schema)?;
//! let extraction = extractor.extract()?;
//! println!("{:?}", extraction.buyer_details);
//! # Ok::<(), rusty_form::RustyFormError>(())
//! ```
pub mod config;
pub mod error;
pub mod extractor;
mod helpers;
pub mod seccf;
pub mod spreadsheet;

pub use config::ExtractorConfig;
pub use error::RustyFormError;
pub use extractor::ExtractError;
pub use extractor::FormExtractor;
pub use seccf::schema::FormSchema;
pub use seccf::Extraction;
pub use spreadsheet::open_spreadsheet;
pub use spreadsheet::Spreadsheet;

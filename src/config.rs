//! YAML configuration of the extractor.
use crate::error::ResultMessage;
use crate::error::RustyFormError;
use crate::extractor::criteria::ColumnDefinition;
use crate::extractor::criteria::FieldDefinition;
use crate::extractor::table::HeaderWindow;
use crate::seccf::schema::SheetSearchWords;
use crate::seccf::schema::DEFAULT_COMPANY_NAMES;
use crate::seccf::BuyerField;
use crate::seccf::ControlledContentField;
use crate::seccf::ProductField;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;

/// Extractor settings; every key is optional.
///
/// ```yaml
/// company_names: ["Acme", "Acme Ltd"]
/// sheets:
///   controlled_content: "content"
/// table:
///   default_header_row: 12
/// ```
///
/// `buyer_fields`, `product_fields` and `controlled_content_columns` replace the built-in
/// definitions of their section when present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub company_names: Vec<String>,
    pub sheets: SheetSearchWords,
    pub table: HeaderWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_fields: Option<Vec<FieldDefinition<BuyerField>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_fields: Option<Vec<FieldDefinition<ProductField>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controlled_content_columns: Option<Vec<ColumnDefinition<ControlledContentField>>>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            company_names: DEFAULT_COMPANY_NAMES.iter().map(|name| name.to_string()).collect(),
            sheets: SheetSearchWords::default(),
            table: HeaderWindow::default(),
            buyer_fields: None,
            product_fields: None,
            controlled_content_columns: None,
        }
    }
}

impl ExtractorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RustyFormError> {
        let path = path.as_ref();
        let message = format!("Failed to load config '{}'", path.display());
        std::fs::read_to_string(path)
            .map_err(RustyFormError::from)
            .and_then(|yaml| Ok(Self::from_yaml_str(&yaml)?))
            .with_prefix(&message)
    }

    /// Replaces the company names, keeping the configured ones when `company_names` is empty.
    pub fn with_company_names(mut self, company_names: Vec<String>) -> Self {
        if !company_names.is_empty() {
            self.company_names = company_names;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::criteria::ExtractionMode;
    use crate::seccf::schema::FormSchema;
    use crate::spreadsheet::reference::Column;
    use std::io::Write;

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = ExtractorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ExtractorConfig::default());
        assert_eq!(config.company_names, vec!["Amazon", "Amazon Inc", "Amazon Ltd"]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = r#"
company_names: ["Acme"]
sheets:
  controlled_content: "content"
table:
  anchor_column: B
  default_header_row: 12
"#;
        let config = ExtractorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.company_names, vec!["Acme"]);
        assert_eq!(config.sheets.buyer_details, "buyer details");
        assert_eq!(config.sheets.controlled_content, "content");
        assert_eq!(config.table.anchor_column, Column(1));
        assert_eq!(config.table.first_header_row, 10);
        assert_eq!(config.table.default_header_row, 12);
    }

    #[test]
    fn custom_fields_replace_builtins() {
        let yaml = r#"
buyer_fields:
  - field: part_number
    search_terms: ["article"]
    cell_ranges: ["A5:C5"]
    mode: { type: simple, offset: 2 }
  - field: modified
    search_terms: ["changed"]
    cell_ranges: ["A6:C6"]
    mode: { type: boolean, offset: 3, search_terms: ["X"] }
"#;
        let config = ExtractorConfig::from_yaml_str(yaml).unwrap();
        let schema = FormSchema::from_config(&config).unwrap();
        assert_eq!(schema.buyer_fields.len(), 2);
        assert_eq!(schema.buyer_fields[0].criteria.mode, ExtractionMode::Simple { offset: 2 });
        assert_eq!(schema.buyer_fields[1].field, BuyerField::Modified);
        assert_eq!(schema.product_fields.len(), ProductField::ALL.len());
    }

    #[test]
    fn mismatched_mode_is_rejected() {
        let yaml = r#"
buyer_fields:
  - field: modified
    search_terms: ["changed"]
    cell_ranges: ["A6:C6"]
    mode: { type: simple, offset: 3 }
"#;
        let config = ExtractorConfig::from_yaml_str(yaml).unwrap();
        let error = FormSchema::from_config(&config).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Field 'modified' holds flag values but its extraction mode yields text"
        );
    }

    #[test]
    fn load_reports_the_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "company_names: [").unwrap();
        let error = ExtractorConfig::load(file.path()).unwrap_err();
        assert!(error.to_string().starts_with("Failed to load config"));

        let missing = ExtractorConfig::load("/nonexistent/rusty-form.yaml").unwrap_err();
        assert!(missing.to_string().contains("/nonexistent/rusty-form.yaml"));
    }

    #[test]
    fn command_line_companies_override() {
        let config = ExtractorConfig::default().with_company_names(vec!["Acme".to_owned()]);
        assert_eq!(config.company_names, vec!["Acme"]);
        let config = config.with_company_names(Vec::new());
        assert_eq!(config.company_names, vec!["Acme"]);
    }
}

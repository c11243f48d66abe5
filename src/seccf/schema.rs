//! Built-in SECCF criteria and the compiled [`FormSchema`].
use crate::config::ExtractorConfig;
use crate::extractor::criteria::ClassificationCriteria;
use crate::extractor::criteria::ColumnDefinition;
use crate::extractor::criteria::ColumnMapping;
use crate::extractor::criteria::ExtractionMode;
use crate::extractor::criteria::FieldDefinition;
use crate::extractor::criteria::FieldSpec;
use crate::extractor::criteria::SchemaError;
use crate::extractor::record::Record;
use crate::extractor::table::TableSchema;
use crate::seccf::BuyerDetails;
use crate::seccf::BuyerField;
use crate::seccf::ControlledContentField;
use crate::seccf::ControlledContentRow;
use crate::seccf::ProductDetails;
use crate::seccf::ProductField;
use serde::Deserialize;
use serde::Serialize;

/// Company names substituted for `{companyName}` when none are configured.
pub const DEFAULT_COMPANY_NAMES: [&str; 3] = ["Amazon", "Amazon Inc", "Amazon Ltd"];

/// Case-insensitive words identifying the sheet of each section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSearchWords {
    pub buyer_details: String,
    pub product_details: String,
    pub controlled_content: String,
}

impl Default for SheetSearchWords {
    fn default() -> Self {
        SheetSearchWords {
            buyer_details: "buyer details".to_owned(),
            product_details: "product details".to_owned(),
            controlled_content: "controlled content".to_owned(),
        }
    }
}

/// Compiled, read-only schema of the whole form.
#[derive(Clone, Debug)]
pub struct FormSchema {
    pub sheets: SheetSearchWords,
    pub buyer_fields: Vec<FieldSpec<BuyerDetails>>,
    pub product_fields: Vec<FieldSpec<ProductDetails>>,
    pub controlled_content: TableSchema<ControlledContentRow>,
}

impl FormSchema {
    /// The built-in SECCF schema with `{companyName}` expanded for `company_names`.
    pub fn seccf(company_names: &[String]) -> Result<FormSchema, SchemaError> {
        FormSchema::from_config(&ExtractorConfig {
            company_names: company_names.to_vec(),
            ..Default::default()
        })
    }

    /// Builds the schema from a configuration; absent definitions fall back to the built-ins.
    pub fn from_config(config: &ExtractorConfig) -> Result<FormSchema, SchemaError> {
        let company_names = &config.company_names;
        let buyer_fields = match &config.buyer_fields {
            Some(definitions) => compile_fields::<BuyerDetails>(definitions, company_names)?,
            None => compile_fields::<BuyerDetails>(&buyer_field_definitions(), company_names)?,
        };
        let product_fields = match &config.product_fields {
            Some(definitions) => compile_fields::<ProductDetails>(definitions, company_names)?,
            None => compile_fields::<ProductDetails>(&product_field_definitions(), company_names)?,
        };
        let columns = match &config.controlled_content_columns {
            Some(definitions) => compile_columns::<ControlledContentRow>(definitions, company_names)?,
            None => compile_columns::<ControlledContentRow>(&controlled_content_column_definitions(), company_names)?,
        };
        Ok(FormSchema {
            sheets: config.sheets.to_owned(),
            buyer_fields,
            product_fields,
            controlled_content: TableSchema {
                window: config.table.to_owned(),
                columns,
            },
        })
    }
}

fn compile_fields<R: Record>(
    definitions: &[FieldDefinition<R::Field>],
    company_names: &[String],
) -> Result<Vec<FieldSpec<R>>, SchemaError> {
    definitions
        .iter()
        .map(|definition| FieldSpec::<R>::compile(definition, company_names))
        .collect()
}

fn compile_columns<R: Record>(
    definitions: &[ColumnDefinition<R::Field>],
    company_names: &[String],
) -> Result<Vec<ColumnMapping<R>>, SchemaError> {
    definitions
        .iter()
        .map(|definition| ColumnMapping::<R>::compile(definition, company_names))
        .collect()
}

fn text(offset: u32) -> ExtractionMode {
    ExtractionMode::Simple { offset }
}

fn checkbox(offset: u32) -> ExtractionMode {
    ExtractionMode::boolean(offset, &["YES"])
}

fn yes_no(yes: (&[&str], u32), no: (&[&str], u32)) -> ExtractionMode {
    ExtractionMode::Dual {
        states: [
            ClassificationCriteria::new("YES", yes.0, yes.1),
            ClassificationCriteria::new("NO", no.0, no.1),
        ],
    }
}

pub fn buyer_field_definitions() -> Vec<FieldDefinition<BuyerField>> {
    use BuyerField::*;
    vec![
        FieldDefinition::new(PartNumber, &["part number", "part-nr", "part_number"], &["B12:D12"], text(3)),
        FieldDefinition::new(PartDescription, &["description", "desc", "part description"], &["B13:D13"], text(3)),
        FieldDefinition::new(
            ControlListClassificationNumber,
            &["control list classification number"],
            &["B18:D18"],
            text(3),
        ),
        FieldDefinition::new(Rfq, &["RQF", "quote reference"], &["B19:D19"], text(3)),
        FieldDefinition::new(BuildToPrint, &["Build To Print"], &["B21:F21"], checkbox(5)),
        FieldDefinition::new(
            ManufacturedToSpecification,
            &["Manufactured to specification", "(MTS)"],
            &["B22:F22"],
            checkbox(5),
        ),
        FieldDefinition::new(
            OriginalEquipmentManufacturer,
            &["Original Equipment Manufacturer"],
            &["B23:F23"],
            checkbox(5),
        ),
        FieldDefinition::new(Modified, &["Modified"], &["B25:F25"], checkbox(5)),
        FieldDefinition::new(
            ClassificationOfItem,
            &["{companyName} Classification of item"],
            &["B15:D15"],
            ExtractionMode::Dual {
                states: [
                    ClassificationCriteria::new("DUAL", &["Dual", "DU"], 3),
                    ClassificationCriteria::new("MILITARY", &["Military", "MIL"], 4),
                ],
            },
        ),
    ]
}

pub fn product_field_definitions() -> Vec<FieldDefinition<ProductField>> {
    use ProductField::*;
    vec![
        // Supplier
        FieldDefinition::new(SupplierPartNumber, &["Supplier part number"], &["C11:D11"], text(2)),
        FieldDefinition::new(SupplierCompanyName, &["company name"], &["C12:C12"], text(1)),
        FieldDefinition::new(SupplierFullAddress, &["full address"], &["C13:C13"], text(1)),
        FieldDefinition::new(SupplierCountry, &["Country"], &["C14:C14"], text(1)),
        FieldDefinition::new(SupplierCompanyNumber, &["company number"], &["C15:C15"], text(1)),
        // Manufacturer
        FieldDefinition::new(ManufacturerPartNumber, &["manufacturer part number"], &["C16:D16"], text(2)),
        FieldDefinition::new(ManufacturerCompanyName, &["company name"], &["C17:C17"], text(1)),
        FieldDefinition::new(ManufacturerFullAddress, &["full address"], &["C18:C18"], text(1)),
        FieldDefinition::new(ManufacturerCountry, &["Country"], &["C19:C19"], text(1)),
        FieldDefinition::new(ManufacturerCompanyNumber, &["company number"], &["C20:C20"], text(1)),
        // Product
        FieldDefinition::new(CountryOfOrigin, &["country of origin"], &["B21:D21"], text(3)),
        FieldDefinition::new(CustomsTariffCode, &["customs tariff code"], &["B22:D22"], text(3)),
        FieldDefinition::new(
            ExportControlRegulated,
            &["export control regulations"],
            &["B23:D23"],
            yes_no((&["YES"], 3), (&["No"], 4)),
        ),
        FieldDefinition::new(
            PartClassification,
            &["classification of the part"],
            &["B24:D24"],
            ExtractionMode::Tri {
                states: [
                    ClassificationCriteria::new("DUAL", &["DU", "DUAL"], 3),
                    ClassificationCriteria::new("MILITARY", &["MIL"], 3),
                    ClassificationCriteria::new("CIVIL", &["CIVIL"], 5),
                ],
            },
        ),
        FieldDefinition::new(
            ControlListClassificationNumber,
            &["control list classification number"],
            &["B28:D28"],
            text(3),
        ),
        FieldDefinition::new(
            ThirdCountryControlledContent,
            &["third country controlled content"],
            &["B29:D29"],
            yes_no((&["YES"], 3), (&["No"], 4)),
        ),
        FieldDefinition::new(
            EndUserStatementRequired,
            &["end user statement will be required"],
            &["B31:E31"],
            yes_no((&["YES"], 4), (&["No"], 4)),
        ),
        FieldDefinition::new(
            ExportLicenceShipmentRequired,
            &["Export Licence for shipment to {companyName}"],
            &["B32:E32"],
            yes_no((&["YES"], 4), (&["NO"], 4)),
        ),
        FieldDefinition::new(
            ExportLicenceEndUserRequired,
            &["Export Licence for shipment to {companyName} Specified End User"],
            &["B33:E33"],
            ExtractionMode::Tri {
                states: [
                    ClassificationCriteria::new("YES", &["YES"], 4),
                    ClassificationCriteria::new("NO", &["NO"], 4),
                    ClassificationCriteria::new(
                        "END USER NOT ADVISED TO SUPPLIER",
                        &["END USER NOT ADVISED TO SUPPLIER"],
                        4,
                    ),
                ],
            },
        ),
        FieldDefinition::new(
            AdditionalExportDocsRequired,
            &["Are other export documents required to be completed by"],
            &["B34:E34"],
            yes_no((&["YES"], 4), (&["No"], 4)),
        ),
        FieldDefinition::new(
            TransferReexportConditions,
            &["additional is required to allow the product to be shipped"],
            &["B35:E35", "B36:E36"],
            text(4),
        ),
        // Supplier representative; the block may sit one row lower
        FieldDefinition::new(RepresentativeName, &["name"], &["B49:D49", "B50:D50"], text(3)),
        FieldDefinition::new(RepresentativePosition, &["position in the company"], &["B50:D50", "B51:D51"], text(3)),
        FieldDefinition::new(RepresentativeSignature, &["Signature of Supplier"], &["B51:D51", "B52:D52"], text(3)),
        FieldDefinition::new(
            SupplierCompanySeal,
            &["SUPPLIER COMPANY SEAL", "company name"],
            &["B52:D52", "B53:D53"],
            text(3),
        ),
        FieldDefinition::new(SignatureDate, &["DATE", "(day/month/year)"], &["B53:D53", "B54:D54"], text(3)),
    ]
}

pub fn controlled_content_column_definitions() -> Vec<ColumnDefinition<ControlledContentField>> {
    use ControlledContentField::*;
    vec![
        ColumnDefinition::new(ItemNum, &["Item"]),
        ColumnDefinition::new(PartNumber, &["part number"]),
        ColumnDefinition::new(
            ComponentManufacturerPartNumber,
            &["component manufacturer part number", "component manufacturer part-nr"],
        ),
        ColumnDefinition::new(PartDescription, &["part description", "component description"]),
        ColumnDefinition::new(ManufacturerOfComponent, &["manufacturer of the component", "manufacturer of component"]),
        ColumnDefinition::new(ExportRegulationCountry, &["export regulations country"]),
        ColumnDefinition::new(DualControlListClfNum, &["Dual Use Item  - Control list classification number"]),
        ColumnDefinition::new(MilitaryControlListClfNum, &["Military Item - Control list classification number"]),
        ColumnDefinition::new(IndicateLicenseApplication, &["Indicate License Application Form/Type "]),
        ColumnDefinition::new(TopLevelDeliverableItem, &["Content of the top level deliverable item"]),
        ColumnDefinition::new(UsmlN, &["usml n°", "usml"]),
        ColumnDefinition::new(EccnN, &["ECCN N°", "ECCN", "EAR 99"]),
        ColumnDefinition::new(UsEaContentRatio, &["Ratio of US EAR controlled content"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::table::HeaderWindow;

    fn companies() -> Vec<String> {
        DEFAULT_COMPANY_NAMES.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn builtin_schema_compiles() {
        let schema = FormSchema::seccf(&companies()).unwrap();
        assert_eq!(schema.buyer_fields.len(), BuyerField::ALL.len());
        assert_eq!(schema.product_fields.len(), ProductField::ALL.len());
        assert_eq!(schema.controlled_content.columns.len(), ControlledContentField::ALL.len());
        assert_eq!(schema.controlled_content.window, HeaderWindow::default());
        assert_eq!(schema.sheets.buyer_details, "buyer details");
    }

    #[test]
    fn company_placeholder_is_expanded_per_company() {
        let schema = FormSchema::seccf(&companies()).unwrap();
        let classification = schema
            .buyer_fields
            .iter()
            .find(|spec| spec.field == BuyerField::ClassificationOfItem)
            .unwrap();
        assert_eq!(
            classification.criteria.search_terms,
            vec![
                "Amazon Classification of item",
                "Amazon Inc Classification of item",
                "Amazon Ltd Classification of item",
            ]
        );
    }

    #[test]
    fn every_anchor_parses() {
        for definition in buyer_field_definitions() {
            assert!(!definition.cell_ranges.is_empty(), "{}", definition.field);
        }
        for definition in product_field_definitions() {
            assert!(!definition.cell_ranges.is_empty(), "{}", definition.field);
        }
        let transfer = product_field_definitions()
            .into_iter()
            .find(|definition| definition.field == ProductField::TransferReexportConditions)
            .unwrap();
        assert_eq!(transfer.cell_ranges.len(), 2);
    }
}

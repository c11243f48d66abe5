//! # Supplier Export Control Classification Form
//!
//! Records produced from the three sections of the form: buyer details, product details
//! and the controlled-content table, with the field tags used by schemas to address them.
pub mod schema;

use crate::extractor::record::FieldSetter;
use crate::extractor::record::Record;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;

/// Implements `Display` through the serde name of each field tag.
macro_rules! field_names {
    ($field:ident { $($variant:ident => $name:literal),* $(,)? }) => {
        impl $field {
            pub const ALL: &'static [$field] = &[$($field::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($field::$variant => $name),*
                }
            }
        }

        impl Display for $field {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerDetails {
    pub sheet_name: String,
    pub part_number: String,
    pub part_description: String,
    pub classification_of_item: String,
    pub control_list_classification_number: String,
    pub rfq: String,
    pub build_to_print: bool,
    pub manufactured_to_specification: bool,
    pub original_equipment_manufacturer: bool,
    pub modified: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerField {
    PartNumber,
    PartDescription,
    ClassificationOfItem,
    ControlListClassificationNumber,
    Rfq,
    BuildToPrint,
    ManufacturedToSpecification,
    OriginalEquipmentManufacturer,
    Modified,
}

field_names!(BuyerField {
    PartNumber => "part_number",
    PartDescription => "part_description",
    ClassificationOfItem => "classification_of_item",
    ControlListClassificationNumber => "control_list_classification_number",
    Rfq => "rfq",
    BuildToPrint => "build_to_print",
    ManufacturedToSpecification => "manufactured_to_specification",
    OriginalEquipmentManufacturer => "original_equipment_manufacturer",
    Modified => "modified",
});

impl Record for BuyerDetails {
    type Field = BuyerField;

    fn setter(field: BuyerField) -> FieldSetter<Self> {
        use BuyerField::*;
        match field {
            PartNumber => FieldSetter::Text(|record, value| record.part_number = value),
            PartDescription => FieldSetter::Text(|record, value| record.part_description = value),
            ClassificationOfItem => FieldSetter::Text(|record, value| record.classification_of_item = value),
            ControlListClassificationNumber => FieldSetter::Text(|record, value| record.control_list_classification_number = value),
            Rfq => FieldSetter::Text(|record, value| record.rfq = value),
            BuildToPrint => FieldSetter::Flag(|record, value| record.build_to_print = value),
            ManufacturedToSpecification => FieldSetter::Flag(|record, value| record.manufactured_to_specification = value),
            OriginalEquipmentManufacturer => FieldSetter::Flag(|record, value| record.original_equipment_manufacturer = value),
            Modified => FieldSetter::Flag(|record, value| record.modified = value),
        }
    }

    fn set_sheet_name(&mut self, sheet_name: &str) {
        self.sheet_name = sheet_name.to_owned();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub sheet_name: String,

    // Supplier
    pub supplier_part_number: String,
    pub supplier_company_name: String,
    pub supplier_full_address: String,
    pub supplier_country: String,
    pub supplier_company_number: String,

    // Manufacturer
    pub manufacturer_part_number: String,
    pub manufacturer_company_name: String,
    pub manufacturer_full_address: String,
    pub manufacturer_country: String,
    pub manufacturer_company_number: String,

    // Product
    pub country_of_origin: String,
    pub customs_tariff_code: String,
    /// YES / NO
    pub export_control_regulated: String,
    /// DUAL / MILITARY / CIVIL
    pub part_classification: String,
    pub control_list_classification_number: String,
    pub third_country_controlled_content: String,
    pub end_user_statement_required: String,
    pub export_licence_shipment_required: String,
    /// YES / NO / END USER NOT ADVISED TO SUPPLIER
    pub export_licence_end_user_required: String,
    pub additional_export_docs_required: String,
    pub transfer_reexport_conditions: String,

    // Supplier representative
    pub representative_name: String,
    pub representative_position: String,
    pub representative_signature: String,
    pub supplier_company_seal: String,
    pub signature_date: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    SupplierPartNumber,
    SupplierCompanyName,
    SupplierFullAddress,
    SupplierCountry,
    SupplierCompanyNumber,
    ManufacturerPartNumber,
    ManufacturerCompanyName,
    ManufacturerFullAddress,
    ManufacturerCountry,
    ManufacturerCompanyNumber,
    CountryOfOrigin,
    CustomsTariffCode,
    ExportControlRegulated,
    PartClassification,
    ControlListClassificationNumber,
    ThirdCountryControlledContent,
    EndUserStatementRequired,
    ExportLicenceShipmentRequired,
    ExportLicenceEndUserRequired,
    AdditionalExportDocsRequired,
    TransferReexportConditions,
    RepresentativeName,
    RepresentativePosition,
    RepresentativeSignature,
    SupplierCompanySeal,
    SignatureDate,
}

field_names!(ProductField {
    SupplierPartNumber => "supplier_part_number",
    SupplierCompanyName => "supplier_company_name",
    SupplierFullAddress => "supplier_full_address",
    SupplierCountry => "supplier_country",
    SupplierCompanyNumber => "supplier_company_number",
    ManufacturerPartNumber => "manufacturer_part_number",
    ManufacturerCompanyName => "manufacturer_company_name",
    ManufacturerFullAddress => "manufacturer_full_address",
    ManufacturerCountry => "manufacturer_country",
    ManufacturerCompanyNumber => "manufacturer_company_number",
    CountryOfOrigin => "country_of_origin",
    CustomsTariffCode => "customs_tariff_code",
    ExportControlRegulated => "export_control_regulated",
    PartClassification => "part_classification",
    ControlListClassificationNumber => "control_list_classification_number",
    ThirdCountryControlledContent => "third_country_controlled_content",
    EndUserStatementRequired => "end_user_statement_required",
    ExportLicenceShipmentRequired => "export_licence_shipment_required",
    ExportLicenceEndUserRequired => "export_licence_end_user_required",
    AdditionalExportDocsRequired => "additional_export_docs_required",
    TransferReexportConditions => "transfer_reexport_conditions",
    RepresentativeName => "representative_name",
    RepresentativePosition => "representative_position",
    RepresentativeSignature => "representative_signature",
    SupplierCompanySeal => "supplier_company_seal",
    SignatureDate => "signature_date",
});

impl Record for ProductDetails {
    type Field = ProductField;

    fn setter(field: ProductField) -> FieldSetter<Self> {
        use ProductField::*;
        let set: fn(&mut Self, String) = match field {
            SupplierPartNumber => |record, value| record.supplier_part_number = value,
            SupplierCompanyName => |record, value| record.supplier_company_name = value,
            SupplierFullAddress => |record, value| record.supplier_full_address = value,
            SupplierCountry => |record, value| record.supplier_country = value,
            SupplierCompanyNumber => |record, value| record.supplier_company_number = value,
            ManufacturerPartNumber => |record, value| record.manufacturer_part_number = value,
            ManufacturerCompanyName => |record, value| record.manufacturer_company_name = value,
            ManufacturerFullAddress => |record, value| record.manufacturer_full_address = value,
            ManufacturerCountry => |record, value| record.manufacturer_country = value,
            ManufacturerCompanyNumber => |record, value| record.manufacturer_company_number = value,
            CountryOfOrigin => |record, value| record.country_of_origin = value,
            CustomsTariffCode => |record, value| record.customs_tariff_code = value,
            ExportControlRegulated => |record, value| record.export_control_regulated = value,
            PartClassification => |record, value| record.part_classification = value,
            ControlListClassificationNumber => |record, value| record.control_list_classification_number = value,
            ThirdCountryControlledContent => |record, value| record.third_country_controlled_content = value,
            EndUserStatementRequired => |record, value| record.end_user_statement_required = value,
            ExportLicenceShipmentRequired => |record, value| record.export_licence_shipment_required = value,
            ExportLicenceEndUserRequired => |record, value| record.export_licence_end_user_required = value,
            AdditionalExportDocsRequired => |record, value| record.additional_export_docs_required = value,
            TransferReexportConditions => |record, value| record.transfer_reexport_conditions = value,
            RepresentativeName => |record, value| record.representative_name = value,
            RepresentativePosition => |record, value| record.representative_position = value,
            RepresentativeSignature => |record, value| record.representative_signature = value,
            SupplierCompanySeal => |record, value| record.supplier_company_seal = value,
            SignatureDate => |record, value| record.signature_date = value,
        };
        FieldSetter::Text(set)
    }

    fn set_sheet_name(&mut self, sheet_name: &str) {
        self.sheet_name = sheet_name.to_owned();
    }
}

/// One row of the controlled-content table.
///
/// Two JSON keys keep the spelling downstream consumers already read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlledContentRow {
    pub sheet_name: String,
    pub item_num: String,
    pub part_number: String,
    pub component_manufacturer_part_number: String,
    pub part_description: String,
    pub manufacturer_of_component: String,
    pub export_regulation_country: String,
    pub dual_control_list_clf_num: String,
    pub military_control_list_clf_num: String,
    #[serde(rename = "inidcate_license_application")]
    pub indicate_license_application: String,
    #[serde(rename = "top_level_delierable_item")]
    pub top_level_deliverable_item: String,
    pub usml_n: String,
    pub eccn_n: String,
    pub us_ea_content_ratio: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlledContentField {
    ItemNum,
    PartNumber,
    ComponentManufacturerPartNumber,
    PartDescription,
    ManufacturerOfComponent,
    ExportRegulationCountry,
    DualControlListClfNum,
    MilitaryControlListClfNum,
    IndicateLicenseApplication,
    TopLevelDeliverableItem,
    UsmlN,
    EccnN,
    UsEaContentRatio,
}

field_names!(ControlledContentField {
    ItemNum => "item_num",
    PartNumber => "part_number",
    ComponentManufacturerPartNumber => "component_manufacturer_part_number",
    PartDescription => "part_description",
    ManufacturerOfComponent => "manufacturer_of_component",
    ExportRegulationCountry => "export_regulation_country",
    DualControlListClfNum => "dual_control_list_clf_num",
    MilitaryControlListClfNum => "military_control_list_clf_num",
    IndicateLicenseApplication => "indicate_license_application",
    TopLevelDeliverableItem => "top_level_deliverable_item",
    UsmlN => "usml_n",
    EccnN => "eccn_n",
    UsEaContentRatio => "us_ea_content_ratio",
});

impl Record for ControlledContentRow {
    type Field = ControlledContentField;

    fn setter(field: ControlledContentField) -> FieldSetter<Self> {
        use ControlledContentField::*;
        let set: fn(&mut Self, String) = match field {
            ItemNum => |record, value| record.item_num = value,
            PartNumber => |record, value| record.part_number = value,
            ComponentManufacturerPartNumber => |record, value| record.component_manufacturer_part_number = value,
            PartDescription => |record, value| record.part_description = value,
            ManufacturerOfComponent => |record, value| record.manufacturer_of_component = value,
            ExportRegulationCountry => |record, value| record.export_regulation_country = value,
            DualControlListClfNum => |record, value| record.dual_control_list_clf_num = value,
            MilitaryControlListClfNum => |record, value| record.military_control_list_clf_num = value,
            IndicateLicenseApplication => |record, value| record.indicate_license_application = value,
            TopLevelDeliverableItem => |record, value| record.top_level_deliverable_item = value,
            UsmlN => |record, value| record.usml_n = value,
            EccnN => |record, value| record.eccn_n = value,
            UsEaContentRatio => |record, value| record.us_ea_content_ratio = value,
        };
        FieldSetter::Text(set)
    }

    fn set_sheet_name(&mut self, sheet_name: &str) {
        self.sheet_name = sheet_name.to_owned();
    }
}

/// Everything extracted from one form; sections whose sheet is missing stay empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub buyer_details: Option<BuyerDetails>,
    pub product_details: Option<ProductDetails>,
    pub controlled_content: Vec<ControlledContentRow>,
}

// src/config/profiles.rs
//
// The three entity variants share one engine; everything that differs
// between them lives here as static configuration.

use crate::models::{Cell, EntityType};
use crate::utils::constants::{LEGAL_REFERENCE_LABEL, NOT_APPLICABLE};

/// Semantic type of a required output column, which decides its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    FreeText,
    Date,
    Quantity,
    Categorical,
    /// Identifiers or codes not known at reconciliation time; left absent.
    Identifier,
}

impl FieldKind {
    pub fn default_value(&self) -> Cell {
        match self {
            FieldKind::FreeText | FieldKind::Date | FieldKind::Quantity => Some(String::new()),
            FieldKind::Categorical => Some(NOT_APPLICABLE.to_string()),
            FieldKind::Identifier => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Ordered list of columns an output table must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSchema {
    pub fields: &'static [SchemaField],
}

impl OutputSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Field names and output rules for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityProfile {
    pub entity_type: EntityType,
    pub label: &'static str,
    pub emoji: &'static str,
    /// Country column in the local table.
    pub local_country: &'static str,
    pub local_primary: &'static str,
    pub local_secondary: Option<&'static str>,
    /// Dataset name on the registry service (`<dataset>.csv`).
    pub registry_dataset: &'static str,
    pub registry_country: &'static str,
    pub registry_identifier: &'static str,
    pub registry_primary: &'static str,
    /// Candidate names of the registry's secondary column, in lookup order.
    pub registry_secondary: &'static [&'static str],
    /// Column the resolved identifier is written to.
    pub output_identifier: &'static str,
    /// Source columns renamed before the output schema is applied.
    pub renames: &'static [(&'static str, &'static str)],
    pub output_schema: Option<OutputSchema>,
}

impl EntityProfile {
    pub fn required_local_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![self.local_country, self.local_primary];
        columns.extend(self.local_secondary);
        columns
    }
}

const LOCAL_COUNTRY: &str = "Country";
const REGISTRY_COUNTRY: &str = "country";
const REGISTRY_LEGAL_REFERENCE: &str = "legal_agreement_reference";

pub static COMPANY_PROFILE: EntityProfile = EntityProfile {
    entity_type: EntityType::Company,
    label: "COMPANY",
    emoji: "🏭",
    local_country: LOCAL_COUNTRY,
    local_primary: "Company",
    local_secondary: None,
    registry_dataset: "companies",
    registry_country: REGISTRY_COUNTRY,
    registry_identifier: "eiti_id_company",
    registry_primary: "company_name",
    registry_secondary: &[],
    output_identifier: "eiti_id_company",
    renames: &[],
    output_schema: None,
};

pub static GOVERNMENT_PROFILE: EntityProfile = EntityProfile {
    entity_type: EntityType::Government,
    label: "GOVERNMENT",
    emoji: "🏛️",
    local_country: LOCAL_COUNTRY,
    local_primary: "Government entity",
    local_secondary: None,
    registry_dataset: "agencies",
    registry_country: REGISTRY_COUNTRY,
    registry_identifier: "eiti_id_government",
    registry_primary: "government_entity",
    registry_secondary: &[],
    output_identifier: "eiti_id_government",
    renames: &[],
    output_schema: None,
};

pub static PROJECT_OUTPUT_FIELDS: [SchemaField; 17] = [
    SchemaField { name: "rowid", kind: FieldKind::Identifier },
    SchemaField { name: "project_name", kind: FieldKind::FreeText },
    SchemaField { name: "eiti_id_project", kind: FieldKind::Identifier },
    SchemaField { name: "legal_agreement_reference", kind: FieldKind::FreeText },
    SchemaField { name: "affiliated_companies", kind: FieldKind::Categorical },
    SchemaField { name: "commodities", kind: FieldKind::Categorical },
    SchemaField { name: "status", kind: FieldKind::Categorical },
    SchemaField { name: "production_volume", kind: FieldKind::Quantity },
    SchemaField { name: "unit", kind: FieldKind::Categorical },
    SchemaField { name: "production_value", kind: FieldKind::Quantity },
    SchemaField { name: "currency", kind: FieldKind::Categorical },
    SchemaField { name: "country", kind: FieldKind::FreeText },
    SchemaField { name: "iso_alpha3_code", kind: FieldKind::Identifier },
    SchemaField { name: "eiti_id_declaration", kind: FieldKind::FreeText },
    SchemaField { name: "year", kind: FieldKind::Date },
    SchemaField { name: "start_date", kind: FieldKind::Date },
    SchemaField { name: "end_date", kind: FieldKind::Date },
];

pub static PROJECT_PROFILE: EntityProfile = EntityProfile {
    entity_type: EntityType::Project,
    label: "PROJECT",
    emoji: "⛏️",
    local_country: LOCAL_COUNTRY,
    local_primary: "Full project name",
    local_secondary: Some(LEGAL_REFERENCE_LABEL),
    registry_dataset: "projects",
    registry_country: REGISTRY_COUNTRY,
    registry_identifier: "eiti_id_project",
    registry_primary: "project_name",
    registry_secondary: &[REGISTRY_LEGAL_REFERENCE, LEGAL_REFERENCE_LABEL],
    output_identifier: "eiti_id_project",
    renames: &[
        ("Full project name", "project_name"),
        (LEGAL_REFERENCE_LABEL, REGISTRY_LEGAL_REFERENCE),
        ("ISO Code", "iso_alpha3_code"),
        ("Country", "country"),
    ],
    output_schema: Some(OutputSchema {
        fields: &PROJECT_OUTPUT_FIELDS,
    }),
};

pub fn profile_for(entity_type: EntityType) -> &'static EntityProfile {
    match entity_type {
        EntityType::Company => &COMPANY_PROFILE,
        EntityType::Government => &GOVERNMENT_PROFILE,
        EntityType::Project => &PROJECT_PROFILE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_match_entity_types() {
        for entity_type in EntityType::ALL {
            assert_eq!(profile_for(entity_type).entity_type, entity_type);
        }
    }

    #[test]
    fn test_project_schema_order() {
        let schema = PROJECT_PROFILE.output_schema.unwrap();
        assert_eq!(
            schema.column_names(),
            vec![
                "rowid", "project_name", "eiti_id_project", "legal_agreement_reference",
                "affiliated_companies", "commodities", "status", "production_volume", "unit",
                "production_value", "currency", "country", "iso_alpha3_code",
                "eiti_id_declaration", "year", "start_date", "end_date",
            ]
        );
    }

    #[test]
    fn test_field_defaults() {
        assert_eq!(FieldKind::FreeText.default_value(), Some(String::new()));
        assert_eq!(FieldKind::Date.default_value(), Some(String::new()));
        assert_eq!(FieldKind::Categorical.default_value(), Some("n/a".to_string()));
        assert_eq!(FieldKind::Identifier.default_value(), None);
    }

    #[test]
    fn test_project_requires_secondary_column() {
        assert_eq!(
            PROJECT_PROFILE.required_local_columns(),
            vec!["Country", "Full project name", LEGAL_REFERENCE_LABEL]
        );
        assert_eq!(COMPANY_PROFILE.required_local_columns(), vec!["Country", "Company"]);
    }

    #[test]
    fn test_registry_secondary_prefers_export_column() {
        assert_eq!(
            PROJECT_PROFILE.registry_secondary,
            &["legal_agreement_reference", LEGAL_REFERENCE_LABEL]
        );
        assert!(COMPANY_PROFILE.registry_secondary.is_empty());
    }
}

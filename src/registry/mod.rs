// src/registry/mod.rs
pub mod cache;
pub mod csv_file;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

use crate::config::EntityProfile;
use crate::error::ReconcileError;
use crate::models::{CanonicalEntity, EntityType, RegistryTable, Table};

pub use cache::{CacheStats, RegistryCache};
pub use csv_file::CsvRegistryProvider;
pub use http::HttpRegistryProvider;
pub use memory::InMemoryRegistry;

/// Source of canonical entities. Each result is the authoritative registry
/// slice for one (entity type, country) pair for the rest of the run.
#[async_trait]
pub trait RegistryProvider: Send + Sync {
    async fn fetch(
        &self,
        entity_type: EntityType,
        country: &str,
    ) -> Result<Arc<RegistryTable>, ReconcileError>;
}

#[async_trait]
impl<P: RegistryProvider + ?Sized> RegistryProvider for Arc<P> {
    async fn fetch(
        &self,
        entity_type: EntityType,
        country: &str,
    ) -> Result<Arc<RegistryTable>, ReconcileError> {
        (**self).fetch(entity_type, country).await
    }
}

/// Turns a raw registry download into the country's canonical table.
/// Rows without an identifier or primary name are skipped.
pub fn build_registry_table(
    profile: &EntityProfile,
    country: &str,
    raw: &Table,
) -> Result<RegistryTable, ReconcileError> {
    let entity_type = profile.entity_type;
    let required = |name: &str| {
        raw.column_index(name).ok_or_else(|| {
            ReconcileError::lookup(
                entity_type,
                country,
                format!("registry response has no '{}' column", name),
            )
        })
    };
    let country_idx = required(profile.registry_country)?;
    let identifier_idx = required(profile.registry_identifier)?;
    let primary_idx = required(profile.registry_primary)?;
    let secondary_idx = profile
        .registry_secondary
        .iter()
        .find_map(|name| raw.column_index(name));
    if secondary_idx.is_none() && !profile.registry_secondary.is_empty() {
        warn!(
            "Registry for {} has none of the columns {:?}; secondary fallback disabled",
            entity_type, profile.registry_secondary
        );
    }

    let mut skipped = 0;
    let mut entities = Vec::with_capacity(raw.len());
    for row in 0..raw.len() {
        let identifier = raw.cell(row, identifier_idx).map(str::trim).unwrap_or("");
        let primary = raw.cell(row, primary_idx).unwrap_or("");
        if identifier.is_empty() || primary.trim().is_empty() {
            skipped += 1;
            continue;
        }
        entities.push(CanonicalEntity::new(
            identifier,
            primary,
            secondary_idx.and_then(|idx| raw.cell(row, idx)).map(str::to_string),
            raw.cell(row, country_idx).unwrap_or(""),
        ));
    }
    if skipped > 0 {
        debug!("Skipped {} registry rows without identifier or name", skipped);
    }

    Ok(RegistryTable::from_entities(entity_type, country, entities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::profiles::{COMPANY_PROFILE, PROJECT_PROFILE};
    use crate::utils::constants::LEGAL_REFERENCE_LABEL;

    fn raw_companies() -> Table {
        let mut raw = Table::new(["country", "eiti_id_company", "company_name", "sector"]);
        raw.push_strs(&["Ghana", "GH-1", "Acme Mining", "Mining"]);
        raw.push_strs(&["GHANA", "GH-1", "Acme Mining Ltd", "Mining"]);
        raw.push_strs(&["Ghana", "", "No Identifier", "Oil"]);
        raw.push_strs(&["Ghana", "GH-2", "", "Oil"]);
        raw.push_strs(&["Nigeria", "NG-1", "Delta Oil", "Oil"]);
        raw.push_strs(&["ghana", "GH-3", "Beta Oil", "Oil"]);
        raw
    }

    #[test]
    fn test_build_filters_and_dedupes() {
        let table = build_registry_table(&COMPANY_PROFILE, "Ghana", &raw_companies()).unwrap();
        let ids: Vec<&str> = table.entities.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["GH-1", "GH-3"]);
        assert_eq!(table.entities[0].primary, "Acme Mining");
        assert_eq!(table.entities[1].normalized_primary, "BETA OIL");
    }

    #[test]
    fn test_missing_column_is_lookup_error() {
        let raw = Table::new(["country", "name"]);
        let err = build_registry_table(&COMPANY_PROFILE, "Ghana", &raw).unwrap_err();
        assert!(matches!(err, ReconcileError::Lookup { .. }));
        assert!(err.to_string().contains("'eiti_id_company'"));
    }

    #[test]
    fn test_secondary_read_from_export_column() {
        let mut raw = Table::new([
            "rowid",
            "project_name",
            "eiti_id_project",
            "legal_agreement_reference",
            "country",
        ]);
        raw.push_strs(&["1", "SOCIETE MINIERE SA", "GH-P-2", "LIC-2021-004", "Ghana"]);
        let table = build_registry_table(&PROJECT_PROFILE, "Ghana", &raw).unwrap();
        assert_eq!(table.entities[0].secondary.as_deref(), Some("LIC-2021-004"));
    }

    #[test]
    fn test_secondary_falls_back_to_spreadsheet_label() {
        let mut raw = Table::new(["country", "eiti_id_project", "project_name", LEGAL_REFERENCE_LABEL]);
        raw.push_strs(&["Ghana", "GH-P-1", "Tarkwa", "ML-1998-117"]);
        let table = build_registry_table(&PROJECT_PROFILE, "Ghana", &raw).unwrap();
        assert_eq!(table.entities[0].secondary.as_deref(), Some("ML-1998-117"));
    }

    #[test]
    fn test_missing_secondary_column_tolerated() {
        let mut raw = Table::new(["country", "eiti_id_project", "project_name"]);
        raw.push_strs(&["Ghana", "P-1", "Tarkwa"]);
        let table = build_registry_table(&PROJECT_PROFILE, "Ghana", &raw).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.entities[0].secondary.is_none());
    }
}

// src/registry/csv_file.rs
use async_trait::async_trait;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use super::{build_registry_table, RegistryProvider};
use crate::error::ReconcileError;
use crate::models::{EntityType, RegistryTable};
use crate::tables::read_table;

/// Registry read from a local export of one dataset, for offline runs.
pub struct CsvRegistryProvider {
    path: PathBuf,
}

impl CsvRegistryProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RegistryProvider for CsvRegistryProvider {
    async fn fetch(
        &self,
        entity_type: EntityType,
        country: &str,
    ) -> Result<Arc<RegistryTable>, ReconcileError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ReconcileError::lookup(
                entity_type,
                country,
                format!("cannot read {}: {}", self.path.display(), e),
            )
        })?;
        let raw = read_table(bytes.as_slice()).map_err(|e| {
            ReconcileError::lookup(
                entity_type,
                country,
                format!("malformed registry CSV in {}: {}", self.path.display(), e),
            )
        })?;

        let table = build_registry_table(entity_type.profile(), country, &raw)?;
        info!(
            "📂 Loaded {} registry entities for {} from {}",
            table.len(),
            table.country,
            self.path.display()
        );
        Ok(Arc::new(table))
    }
}

// src/registry/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use std::time::Instant;

use super::{build_registry_table, RegistryProvider};
use crate::config::{EntityProfile, ReconcileConfig};
use crate::error::ReconcileError;
use crate::models::{EntityType, RegistryTable};
use crate::tables::read_table;

/// Downloads registry datasets as CSV from the SOE database service.
pub struct HttpRegistryProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRegistryProvider {
    pub fn new(config: &ReconcileConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.registry_user_agent.clone())
            .timeout(config.registry_timeout())
            .build()
            .context("Failed to build registry HTTP client")?;
        Ok(Self {
            client,
            base_url: config.registry_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn dataset_url(&self, profile: &EntityProfile) -> String {
        format!("{}/{}.csv?_size=max", self.base_url, profile.registry_dataset)
    }
}

#[async_trait]
impl RegistryProvider for HttpRegistryProvider {
    async fn fetch(
        &self,
        entity_type: EntityType,
        country: &str,
    ) -> Result<Arc<RegistryTable>, ReconcileError> {
        let profile = entity_type.profile();
        let url = self.dataset_url(profile);
        let lookup_err = |message: String| ReconcileError::lookup(entity_type, country, message);
        let start = Instant::now();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| lookup_err(format!("request to {} failed: {}", url, e)))?
            .error_for_status()
            .map_err(|e| lookup_err(format!("registry returned an error status: {}", e)))?;
        let body = response
            .text()
            .await
            .map_err(|e| lookup_err(format!("failed to read registry response: {}", e)))?;

        let raw = read_table(body.as_bytes())
            .map_err(|e| lookup_err(format!("malformed registry CSV: {}", e)))?;
        let table = build_registry_table(profile, country, &raw)?;

        info!(
            "🌐 Fetched {} {} rows from {} in {:.2}s ({} for {})",
            raw.len(),
            profile.registry_dataset,
            url,
            start.elapsed().as_secs_f64(),
            table.len(),
            table.country
        );
        Ok(Arc::new(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::profiles::{GOVERNMENT_PROFILE, PROJECT_PROFILE};

    #[test]
    fn test_dataset_urls() {
        let config = ReconcileConfig {
            registry_base_url: "http://localhost:8001/eiti/".to_string(),
            ..ReconcileConfig::default()
        };
        let provider = HttpRegistryProvider::new(&config).unwrap();
        assert_eq!(
            provider.dataset_url(&GOVERNMENT_PROFILE),
            "http://localhost:8001/eiti/agencies.csv?_size=max"
        );
        assert_eq!(
            provider.dataset_url(&PROJECT_PROFILE),
            "http://localhost:8001/eiti/projects.csv?_size=max"
        );
    }
}

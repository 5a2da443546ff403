// src/models/stats_models.rs
use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;

use super::core::EntityType;

/// Counters collected over one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,
    pub entity_type: EntityType,
    pub input_rows: usize,
    pub countries: Vec<String>,
    pub registry_entities: usize,
    pub distinct_keys: usize,
    pub exact_keys: usize,
    pub exact_rows: usize,
    pub unmatched_keys: usize,
    pub proposals_offered: usize,
    pub fuzzy_confirmed: usize,
    pub minted: usize,
    pub registry_time: f64,
    pub ranking_time: f64,
    pub total_processing_time: f64,
}

impl RunStats {
    pub fn new(run_id: String, run_timestamp: NaiveDateTime, entity_type: EntityType) -> Self {
        Self {
            run_id,
            run_timestamp,
            entity_type,
            input_rows: 0,
            countries: Vec::new(),
            registry_entities: 0,
            distinct_keys: 0,
            exact_keys: 0,
            exact_rows: 0,
            unmatched_keys: 0,
            proposals_offered: 0,
            fuzzy_confirmed: 0,
            minted: 0,
            registry_time: 0.0,
            ranking_time: 0.0,
            total_processing_time: 0.0,
        }
    }

    pub fn log_summary(&self) {
        info!("📊 Reconciliation summary for run {} ({})", self.run_id, self.run_timestamp);
        info!("   Entity type: {}", self.entity_type);
        info!("   Countries: {:?}", self.countries);
        info!("   Input rows: {}", self.input_rows);
        info!("   Registry entities loaded: {}", self.registry_entities);
        info!(
            "   Distinct keys: {} ({} exact, {} needing review)",
            self.distinct_keys, self.exact_keys, self.unmatched_keys
        );
        info!("   Rows resolved by exact match: {}", self.exact_rows);
        info!(
            "   Review: {} proposals offered, {} confirmed, {} new identifiers minted",
            self.proposals_offered, self.fuzzy_confirmed, self.minted
        );
        info!(
            "   Timing: registry {:.2}s, ranking {:.2}s, total {:.2}s",
            self.registry_time, self.ranking_time, self.total_processing_time
        );
    }
}

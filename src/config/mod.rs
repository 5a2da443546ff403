// src/config/mod.rs
pub mod profiles;

use log::{info, warn};
use std::env;
use std::time::Duration;

use crate::utils::constants::{
    DEFAULT_FUZZY_THRESHOLD, DEFAULT_REGISTRY_BASE_URL, DEFAULT_REGISTRY_USER_AGENT,
};

pub use profiles::{profile_for, EntityProfile, FieldKind, OutputSchema, SchemaField};

/// Runtime settings for a reconciliation run, read from the environment.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Minimum similarity (0-100, inclusive) for a candidate to be proposed
    pub fuzzy_threshold: u8,
    /// Maximum number of ranking chunks processed at once
    pub ranking_concurrency: usize,
    /// Unmatched keys per ranking task
    pub ranking_chunk_size: usize,
    /// Candidates listed per key in the terminal reviewer
    pub review_candidates_shown: usize,
    pub registry_base_url: String,
    pub registry_user_agent: String,
    pub registry_timeout_secs: u64,
    /// Number of (entity type, country) registry tables kept in memory
    pub registry_cache_size: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            ranking_concurrency: num_cpus::get().max(1),
            ranking_chunk_size: 64,
            review_candidates_shown: 10,
            registry_base_url: DEFAULT_REGISTRY_BASE_URL.to_string(),
            registry_user_agent: DEFAULT_REGISTRY_USER_AGENT.to_string(),
            registry_timeout_secs: 60,
            registry_cache_size: 32,
        }
    }
}

impl ReconcileConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let fuzzy_threshold = match env::var("FUZZY_THRESHOLD").ok().map(|v| v.parse::<u8>()) {
            Some(Ok(value)) if value <= 100 => value,
            Some(_) => {
                warn!(
                    "Ignoring invalid FUZZY_THRESHOLD, using default {}",
                    defaults.fuzzy_threshold
                );
                defaults.fuzzy_threshold
            }
            None => defaults.fuzzy_threshold,
        };

        Self {
            fuzzy_threshold,
            ranking_concurrency: env::var("RANKING_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.ranking_concurrency),
            ranking_chunk_size: env::var("RANKING_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.ranking_chunk_size),
            review_candidates_shown: env::var("REVIEW_CANDIDATES_SHOWN")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.review_candidates_shown),
            registry_base_url: env::var("REGISTRY_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.registry_base_url),
            registry_user_agent: env::var("REGISTRY_USER_AGENT")
                .unwrap_or(defaults.registry_user_agent),
            registry_timeout_secs: env::var("REGISTRY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.registry_timeout_secs),
            registry_cache_size: env::var("REGISTRY_CACHE_SIZE")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.registry_cache_size),
        }
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }

    pub fn log_config(&self) {
        info!("⚙️  Reconciliation configuration:");
        info!("   Fuzzy threshold: {}", self.fuzzy_threshold);
        info!(
            "   Ranking: {} concurrent tasks, {} keys per task",
            self.ranking_concurrency, self.ranking_chunk_size
        );
        info!("   Candidates shown per review: {}", self.review_candidates_shown);
        info!("   Registry: {} (timeout {}s)", self.registry_base_url, self.registry_timeout_secs);
        info!("   Registry cache size: {}", self.registry_cache_size);
    }
}

// src/utils/logging.rs - Logging helpers for reconciliation runs
use log::{debug, info, warn};
use std::time::Instant;

use crate::config::EntityProfile;

#[derive(Clone)]
pub struct ReconcileLogger {
    entity_label: &'static str,
    entity_emoji: &'static str,
    start_time: Instant,
}

impl ReconcileLogger {
    pub fn new(profile: &EntityProfile) -> Self {
        Self {
            entity_label: profile.label,
            entity_emoji: profile.emoji,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, run_id: &str, rows: usize) {
        info!(
            "[{}] {} 🚀 Starting reconciliation of {} rows (run ID: {})",
            self.entity_label, self.entity_emoji, rows, run_id
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => info!(
                "[{}] {} 🔄 Phase: {} - {} [+{:.1}s]",
                self.entity_label,
                self.entity_emoji,
                phase,
                details,
                elapsed.as_secs_f32()
            ),
            None => info!(
                "[{}] {} 🔄 Phase: {} [+{:.1}s]",
                self.entity_label,
                self.entity_emoji,
                phase,
                elapsed.as_secs_f32()
            ),
        }
    }

    pub fn log_registry_loaded(&self, country: &str, count: usize) {
        if count == 0 {
            warn!(
                "[{}] {} ⚠️ Registry has no entities for {} - every key will need review",
                self.entity_label, self.entity_emoji, country
            );
        } else {
            info!(
                "[{}] {} 📊 Loaded {} registry entities for {}",
                self.entity_label, self.entity_emoji, count, country
            );
        }
    }

    pub fn log_exact_split(&self, matched_rows: usize, matched_keys: usize, unmatched_keys: usize) {
        info!(
            "[{}] {} 🎯 Exact matches: {} rows across {} distinct keys; {} distinct keys unmatched",
            self.entity_label, self.entity_emoji, matched_rows, matched_keys, unmatched_keys
        );
    }

    pub fn log_ranking_complete(&self, proposals: usize, sentinels: usize) {
        info!(
            "[{}] {} 🔍 Fuzzy ranking complete: {} proposals, {} with no potential match",
            self.entity_label, self.entity_emoji, proposals, sentinels
        );
    }

    pub fn log_review_skipped(&self) {
        info!(
            "[{}] {} ✨ All keys matched exactly - skipping review and minting",
            self.entity_label, self.entity_emoji
        );
    }

    pub fn log_decision(&self, key: &str, identifier: Option<&str>) {
        match identifier {
            Some(id) => debug!(
                "[{}] {} ✅ {} -> {}",
                self.entity_label, self.entity_emoji, key, id
            ),
            None => debug!(
                "[{}] {} ➕ {} -> no potential match",
                self.entity_label, self.entity_emoji, key
            ),
        }
    }

    pub fn log_allocation(&self, exact: usize, confirmed: usize, minted: usize) {
        info!(
            "[{}] {} 🔑 Identifiers: {} exact, {} confirmed, {} minted",
            self.entity_label, self.entity_emoji, exact, confirmed, minted
        );
    }

    pub fn log_completion(&self, rows: usize, columns: usize) {
        info!(
            "[{}] {} ✅ Output ready: {} rows x {} columns in {:.2}s",
            self.entity_label,
            self.entity_emoji,
            rows,
            columns,
            self.start_time.elapsed().as_secs_f64()
        );
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

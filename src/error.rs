// src/error.rs
use thiserror::Error;

use crate::models::{DistinctKey, EntityType};

/// Failures raised by the reconciliation stages. Per-key "no match" results
/// are outcomes, not errors, and never appear here.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid input table: {message}")]
    InputShape { message: String },

    #[error("registry lookup failed for {entity_type} entities in '{country}': {message}")]
    Lookup {
        entity_type: EntityType,
        country: String,
        message: String,
    },

    #[error("fuzzy ranking failed: {message}")]
    Ranking { message: String },

    #[error("{} key(s) still awaiting a decision: {}", .keys.len(), format_keys(.keys))]
    PendingDecisions { keys: Vec<DistinctKey> },

    #[error("decision for {key} rejected: {message}")]
    InvalidDecision { key: DistinctKey, message: String },

    #[error("identifier allocation for {key} failed: {message}")]
    Allocation { key: DistinctKey, message: String },

    #[error("row {row} ({key}) has no resolved identifier")]
    Unresolved { row: usize, key: DistinctKey },
}

impl ReconcileError {
    pub fn input_shape(message: impl Into<String>) -> Self {
        ReconcileError::InputShape {
            message: message.into(),
        }
    }

    pub fn lookup(entity_type: EntityType, country: &str, message: impl Into<String>) -> Self {
        ReconcileError::Lookup {
            entity_type,
            country: country.to_string(),
            message: message.into(),
        }
    }
}

const MAX_KEYS_IN_MESSAGE: usize = 5;

fn format_keys(keys: &[DistinctKey]) -> String {
    let mut shown: Vec<String> = keys
        .iter()
        .take(MAX_KEYS_IN_MESSAGE)
        .map(ToString::to_string)
        .collect();
    if keys.len() > MAX_KEYS_IN_MESSAGE {
        shown.push(format!("and {} more", keys.len() - MAX_KEYS_IN_MESSAGE));
    }
    shown.join(", ")
}

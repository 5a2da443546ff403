// src/review/session.rs
use std::collections::HashMap;

use crate::error::ReconcileError;
use crate::models::{Choice, Decision, DistinctKey, PendingDecision};

/// Collects one reviewer decision per unmatched key. Decisions may arrive
/// in any order and be replaced until `commit`.
#[derive(Debug, Clone, Default)]
pub struct DisambiguationSession {
    pending: Vec<PendingDecision>,
    index: HashMap<DistinctKey, usize>,
    decisions: HashMap<DistinctKey, Choice>,
}

/// Committed decisions, keyed by distinct key. `None` is "no potential match".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfirmedDecisions {
    choices: HashMap<DistinctKey, Option<String>>,
}

impl ConfirmedDecisions {
    pub fn confirmed(&self, key: &DistinctKey) -> Option<&str> {
        self.choices.get(key).and_then(|c| c.as_deref())
    }

    pub fn contains(&self, key: &DistinctKey) -> bool {
        self.choices.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn accepted_count(&self) -> usize {
        self.choices.values().filter(|c| c.is_some()).count()
    }
}

impl DisambiguationSession {
    pub fn new(pending: Vec<PendingDecision>) -> Self {
        let index = pending
            .iter()
            .enumerate()
            .map(|(i, p)| (p.key.clone(), i))
            .collect();
        Self {
            pending,
            index,
            decisions: HashMap::new(),
        }
    }

    pub fn pending(&self) -> &[PendingDecision] {
        &self.pending
    }

    pub fn get(&self, key: &DistinctKey) -> Option<&PendingDecision> {
        self.index.get(key).map(|&i| &self.pending[i])
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Keys still without a decision, in presentation order.
    pub fn undecided(&self) -> Vec<&PendingDecision> {
        self.pending
            .iter()
            .filter(|p| !self.decisions.contains_key(&p.key))
            .collect()
    }

    pub fn decided_count(&self) -> usize {
        self.decisions.len()
    }

    pub fn current(&self, key: &DistinctKey) -> Option<&Choice> {
        self.decisions.get(key)
    }

    /// Stores a decision, replacing any earlier one for the same key. An
    /// invalid decision is rejected and leaves the session unchanged.
    pub fn record(&mut self, decision: Decision) -> Result<(), ReconcileError> {
        let pending = self
            .get(&decision.key)
            .ok_or_else(|| ReconcileError::InvalidDecision {
                key: decision.key.clone(),
                message: "key is not awaiting a decision".to_string(),
            })?;

        if let Choice::Accept { identifier } = &decision.choice {
            if pending.candidate(identifier).is_none() {
                return Err(ReconcileError::InvalidDecision {
                    key: decision.key.clone(),
                    message: format!("'{}' is not one of the registry candidates", identifier),
                });
            }
        }

        self.decisions.insert(decision.key, decision.choice);
        Ok(())
    }

    /// Records `choice` for `key` and returns the chosen identifier, if any.
    pub fn resolve(
        &mut self,
        key: &DistinctKey,
        choice: Choice,
    ) -> Result<Option<String>, ReconcileError> {
        let identifier = choice.identifier().map(str::to_string);
        self.record(Decision {
            key: key.clone(),
            choice,
        })?;
        Ok(identifier)
    }

    /// Finalizes the session. Fails, listing the keys, while any key is
    /// undecided.
    pub fn commit(&self) -> Result<ConfirmedDecisions, ReconcileError> {
        let missing: Vec<DistinctKey> = self.undecided().into_iter().map(|p| p.key.clone()).collect();
        if !missing.is_empty() {
            return Err(ReconcileError::PendingDecisions { keys: missing });
        }

        let choices = self
            .decisions
            .iter()
            .map(|(key, choice)| (key.clone(), choice.identifier().map(str::to_string)))
            .collect();
        Ok(ConfirmedDecisions { choices })
    }
}

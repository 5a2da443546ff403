// src/matching/allocator.rs
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ReconcileError;
use crate::models::{DistinctKey, MatchOutcome};

type Minter = Box<dyn FnMut() -> String + Send>;

/// Assigns exactly one identifier per distinct key for the lifetime of a run.
pub struct IdentifierAllocator {
    outcomes: HashMap<DistinctKey, MatchOutcome>,
    minter: Minter,
}

impl Default for IdentifierAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierAllocator {
    /// Allocator minting random UUIDv4 identifiers.
    pub fn new() -> Self {
        Self::with_minter(|| Uuid::new_v4().to_string())
    }

    pub fn with_minter(minter: impl FnMut() -> String + Send + 'static) -> Self {
        Self {
            outcomes: HashMap::new(),
            minter: Box::new(minter),
        }
    }

    /// Resolves `key`: the exact identifier wins, then the confirmed one,
    /// otherwise a fresh identifier is minted. Repeating the call with the
    /// same inputs returns the stored outcome; conflicting inputs are an error.
    pub fn allocate(
        &mut self,
        key: &DistinctKey,
        exact: Option<&str>,
        confirmed: Option<&str>,
    ) -> Result<&MatchOutcome, ReconcileError> {
        if self.outcomes.contains_key(key) {
            let existing = &self.outcomes[key];
            let consistent = match existing {
                MatchOutcome::ExactMatch(id) => exact == Some(id.as_str()),
                MatchOutcome::FuzzyConfirmed(id) => exact.is_none() && confirmed == Some(id.as_str()),
                MatchOutcome::NoMatch(_) => exact.is_none() && confirmed.is_none(),
            };
            if !consistent {
                return Err(ReconcileError::Allocation {
                    key: key.clone(),
                    message: format!(
                        "already resolved as {:?}, got exact={:?} confirmed={:?}",
                        existing, exact, confirmed
                    ),
                });
            }
            return Ok(existing);
        }

        let outcome = match (exact, confirmed) {
            (Some(id), _) => MatchOutcome::ExactMatch(id.to_string()),
            (None, Some(id)) => MatchOutcome::FuzzyConfirmed(id.to_string()),
            (None, None) => MatchOutcome::NoMatch((self.minter)()),
        };
        Ok(self.outcomes.entry(key.clone()).or_insert(outcome))
    }

    pub fn get(&self, key: &DistinctKey) -> Option<&MatchOutcome> {
        self.outcomes.get(key)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Counts of (exact, fuzzy-confirmed, minted) outcomes.
    pub fn counts(&self) -> (usize, usize, usize) {
        self.outcomes
            .values()
            .fold((0, 0, 0), |(e, f, m), outcome| match outcome {
                MatchOutcome::ExactMatch(_) => (e + 1, f, m),
                MatchOutcome::FuzzyConfirmed(_) => (e, f + 1, m),
                MatchOutcome::NoMatch(_) => (e, f, m + 1),
            })
    }

    pub fn into_outcomes(self) -> HashMap<DistinctKey, MatchOutcome> {
        self.outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key(name: &str) -> DistinctKey {
        DistinctKey::from_raw("Ghana", name)
    }

    #[test]
    fn test_exact_wins_over_confirmed() {
        let mut allocator = IdentifierAllocator::new();
        let outcome = allocator.allocate(&key("Acme"), Some("GH-1"), Some("GH-2")).unwrap();
        assert_eq!(outcome, &MatchOutcome::ExactMatch("GH-1".into()));
    }

    #[test]
    fn test_confirmed_used_without_exact() {
        let mut allocator = IdentifierAllocator::new();
        let outcome = allocator.allocate(&key("Acme"), None, Some("GH-2")).unwrap();
        assert_eq!(outcome, &MatchOutcome::FuzzyConfirmed("GH-2".into()));
    }

    #[test]
    fn test_mint_once_per_key() {
        let mut allocator = IdentifierAllocator::new();
        let first = allocator.allocate(&key("Acme Corp"), None, None).unwrap().clone();
        let again = allocator.allocate(&key("ACME CORP"), None, None).unwrap().clone();
        assert_eq!(first, again);
        assert!(first.is_minted());
        assert!(Uuid::parse_str(first.identifier()).is_ok());
    }

    #[test]
    fn test_distinct_keys_get_distinct_minted_ids() {
        let mut allocator = IdentifierAllocator::new();
        let ids: HashSet<String> = ["Acme", "Beta", "Gamma"]
            .iter()
            .map(|n| allocator.allocate(&key(n), None, None).unwrap().identifier().to_string())
            .collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(allocator.counts(), (0, 0, 3));
    }

    #[test]
    fn test_conflicting_reallocation_rejected() {
        let mut allocator = IdentifierAllocator::new();
        allocator.allocate(&key("Acme"), None, Some("GH-2")).unwrap();
        let err = allocator.allocate(&key("Acme"), None, None).unwrap_err();
        assert!(matches!(err, ReconcileError::Allocation { .. }));
    }

    #[test]
    fn test_custom_minter() {
        let mut counter = 0;
        let mut allocator = IdentifierAllocator::with_minter(move || {
            counter += 1;
            format!("new-{}", counter)
        });
        assert_eq!(allocator.allocate(&key("A"), None, None).unwrap().identifier(), "new-1");
        assert_eq!(allocator.allocate(&key("B"), None, None).unwrap().identifier(), "new-2");
        assert_eq!(allocator.allocate(&key("A"), None, None).unwrap().identifier(), "new-1");
    }
}

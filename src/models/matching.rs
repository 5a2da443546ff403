// src/models/matching.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::matching::normalize::{normalize_country, normalize_key};

/// Unit of matching and identifier assignment: the normalized primary field,
/// qualified by the normalized country so equal names in different countries
/// never share an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DistinctKey {
    pub country: String,
    pub name: String,
}

impl DistinctKey {
    /// Builds a key from raw (un-normalized) values.
    pub fn from_raw(country: &str, name: &str) -> Self {
        Self {
            country: normalize_country(country),
            name: normalize_key(name),
        }
    }
}

impl fmt::Display for DistinctKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.country)
    }
}

/// One row of the local table, reduced to the fields the engine compares on.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRecord {
    pub row: usize,
    pub key: DistinctKey,
    pub primary_raw: String,
    pub secondary_raw: Option<String>,
    pub normalized_secondary: Option<String>,
}

/// A distinct key that had no exact registry match, with the first row's
/// values kept as its representative.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedKey {
    pub key: DistinctKey,
    pub display_name: String,
    pub secondary_raw: Option<String>,
    pub normalized_secondary: Option<String>,
    pub occurrences: usize,
}

/// A registry entity offered to the reviewer, with its primary-name score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub identifier: String,
    pub primary: String,
    pub secondary: Option<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalBasis {
    PrimaryName,
    SecondaryReference,
}

/// The ranker's suggestion for an unmatched key. Never applied without a
/// reviewer confirming it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub identifier: String,
    pub primary: String,
    pub score: u8,
    pub basis: ProposalBasis,
}

/// Everything a reviewer needs to decide one distinct key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub key: DistinctKey,
    pub display_name: String,
    pub secondary_reference: Option<String>,
    pub occurrences: usize,
    /// `None` is the "No potential match" proposal.
    pub proposal: Option<Proposal>,
    pub candidates: Vec<Candidate>,
}

impl PendingDecision {
    pub fn candidate(&self, identifier: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.identifier == identifier)
    }

    /// The choice a reviewer makes by accepting the pre-selected option.
    pub fn preselected_choice(&self) -> Choice {
        match &self.proposal {
            Some(p) => Choice::Accept {
                identifier: p.identifier.clone(),
            },
            None => Choice::NoMatch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Choice {
    Accept { identifier: String },
    NoMatch,
}

impl Choice {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Choice::Accept { identifier } => Some(identifier),
            Choice::NoMatch => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub key: DistinctKey,
    pub choice: Choice,
}

/// Final resolution of a distinct key. Exactly one per key per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "identifier", rename_all = "snake_case")]
pub enum MatchOutcome {
    ExactMatch(String),
    FuzzyConfirmed(String),
    NoMatch(String),
}

impl MatchOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            MatchOutcome::ExactMatch(id)
            | MatchOutcome::FuzzyConfirmed(id)
            | MatchOutcome::NoMatch(id) => id,
        }
    }

    pub fn is_minted(&self) -> bool {
        matches!(self, MatchOutcome::NoMatch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_key_folds_case_and_accents() {
        assert_eq!(
            DistinctKey::from_raw("Côte d'Ivoire", "Société Minière"),
            DistinctKey::from_raw("CÔTE D'IVOIRE", "SOCIETE MINIERE")
        );
        assert_ne!(
            DistinctKey::from_raw("Ghana", "Acme Corp"),
            DistinctKey::from_raw("Nigeria", "Acme Corp")
        );
    }

    #[test]
    fn test_distinct_key_ignores_padding() {
        assert_eq!(
            DistinctKey::from_raw("Ghana ", "Acme Corp "),
            DistinctKey::from_raw("Ghana", "Acme Corp")
        );
    }

    #[test]
    fn test_choice_serialization_shape() {
        let accept = serde_json::to_value(Choice::Accept {
            identifier: "GH-1".into(),
        })
        .unwrap();
        assert_eq!(accept, serde_json::json!({"action": "accept", "identifier": "GH-1"}));

        let no_match: Choice = serde_json::from_str(r#"{"action": "no_match"}"#).unwrap();
        assert_eq!(no_match, Choice::NoMatch);
    }

    #[test]
    fn test_preselected_choice_follows_proposal() {
        let mut pending = PendingDecision {
            key: DistinctKey::from_raw("Ghana", "Acme"),
            display_name: "Acme".into(),
            secondary_reference: None,
            occurrences: 1,
            proposal: None,
            candidates: Vec::new(),
        };
        assert_eq!(pending.preselected_choice(), Choice::NoMatch);

        pending.proposal = Some(Proposal {
            identifier: "GH-1".into(),
            primary: "ACME LTD".into(),
            score: 95,
            basis: ProposalBasis::PrimaryName,
        });
        assert_eq!(pending.preselected_choice().identifier(), Some("GH-1"));
    }
}

pub mod core;
pub mod matching;
pub mod stats_models;

pub use self::core::{CanonicalEntity, Cell, EntityType, RegistryTable, Table};
pub use self::matching::{
    Candidate, Choice, Decision, DistinctKey, LocalRecord, MatchOutcome, PendingDecision, Proposal,
    ProposalBasis, UnmatchedKey,
};
pub use self::stats_models::RunStats;

// src/matching/manager.rs - Coordinates one reconciliation run
use anyhow::Result;
use chrono::Utc;
use log::info;
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

use crate::config::{EntityProfile, ReconcileConfig};
use crate::error::ReconcileError;
use crate::matching::allocator::IdentifierAllocator;
use crate::matching::exact::{countries, extract_records, split};
use crate::matching::fuzzy::FuzzyCandidateRanker;
use crate::matching::merge::merge;
use crate::models::{
    DistinctKey, EntityType, LocalRecord, MatchOutcome, PendingDecision, RunStats, Table,
};
use crate::registry::RegistryProvider;
use crate::review::{run_review, DisambiguationSession, Reviewer};
use crate::utils::logging::ReconcileLogger;
use crate::utils::progress_config::ProgressConfig;

/// Result of a completed run.
#[derive(Debug)]
pub struct ReconcileOutput {
    pub table: Table,
    pub outcomes: HashMap<DistinctKey, MatchOutcome>,
    pub stats: RunStats,
}

/// Runs the automatic stages (exact split and fuzzy ranking) for one
/// entity type against a registry provider.
pub struct Reconciler<'a> {
    profile: &'static EntityProfile,
    registry: &'a dyn RegistryProvider,
    config: ReconcileConfig,
    progress: ProgressConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        entity_type: EntityType,
        registry: &'a dyn RegistryProvider,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            profile: entity_type.profile(),
            registry,
            config,
            progress: ProgressConfig::from_env(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    /// Matches `table` up to the review boundary. The returned run holds a
    /// session with one pending decision per unmatched distinct key.
    pub async fn prepare(&self, table: Table) -> Result<PreparedRun, ReconcileError> {
        let run_id = Uuid::new_v4().to_string();
        let logger = ReconcileLogger::new(self.profile);
        let mut stats = RunStats::new(
            run_id.clone(),
            Utc::now().naive_utc(),
            self.profile.entity_type,
        );
        stats.input_rows = table.len();
        logger.log_start(&run_id, table.len());

        logger.log_phase("Extracting records", None);
        let records = extract_records(&table, self.profile)?;
        let countries = countries(&records);
        stats.countries = countries.clone();

        let ranker = FuzzyCandidateRanker::new(self.config.fuzzy_threshold);
        let mut exact: HashMap<DistinctKey, String> = HashMap::new();
        let mut pending: Vec<PendingDecision> = Vec::new();

        for country in &countries {
            logger.log_phase("Loading registry", Some(country.as_str()));
            let registry_start = Instant::now();
            let registry = self.registry.fetch(self.profile.entity_type, country).await?;
            stats.registry_time += registry_start.elapsed().as_secs_f64();
            stats.registry_entities += registry.len();
            logger.log_registry_loaded(country, registry.len());

            let split = split(&records, &registry);
            logger.log_exact_split(split.matched_rows, split.matched.len(), split.unmatched.len());
            stats.exact_rows += split.matched_rows;
            exact.extend(split.matched);

            if split.unmatched.is_empty() {
                continue;
            }

            logger.log_phase("Ranking candidates", Some(country.as_str()));
            let ranking_start = Instant::now();
            let bar = self.progress.create_bar(
                split.unmatched.len() as u64,
                &format!("Ranking unmatched {} keys", self.profile.label),
            );
            let ranked = ranker
                .rank_all(
                    split.unmatched,
                    registry,
                    self.config.ranking_concurrency,
                    self.config.ranking_chunk_size,
                    bar,
                )
                .await?;
            stats.ranking_time += ranking_start.elapsed().as_secs_f64();

            let proposals = ranked.iter().filter(|(_, r)| r.proposal.is_some()).count();
            logger.log_ranking_complete(proposals, ranked.len() - proposals);

            pending.extend(ranked.into_iter().map(|(key, ranking)| PendingDecision {
                key: key.key,
                display_name: key.display_name,
                secondary_reference: key.secondary_raw,
                occurrences: key.occurrences,
                proposal: ranking.proposal,
                candidates: ranking.candidates,
            }));
        }

        stats.exact_keys = exact.len();
        stats.unmatched_keys = pending.len();
        stats.distinct_keys = exact.len() + pending.len();
        stats.proposals_offered = pending.iter().filter(|p| p.proposal.is_some()).count();

        if pending.is_empty() {
            logger.log_review_skipped();
        }

        Ok(PreparedRun {
            profile: self.profile,
            table,
            records,
            exact,
            session: DisambiguationSession::new(pending),
            allocator: IdentifierAllocator::new(),
            stats,
            logger,
        })
    }
}

/// A run paused at the review boundary.
pub struct PreparedRun {
    profile: &'static EntityProfile,
    table: Table,
    records: Vec<LocalRecord>,
    exact: HashMap<DistinctKey, String>,
    session: DisambiguationSession,
    allocator: IdentifierAllocator,
    stats: RunStats,
    logger: ReconcileLogger,
}

impl PreparedRun {
    pub fn needs_review(&self) -> bool {
        !self.session.is_empty()
    }

    pub fn pending(&self) -> &[PendingDecision] {
        self.session.pending()
    }

    pub fn session(&self) -> &DisambiguationSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DisambiguationSession {
        &mut self.session
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Replaces the identifier allocator, e.g. to make minted values
    /// predictable.
    pub fn with_allocator(mut self, allocator: IdentifierAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Commits the review, assigns one identifier per distinct key and
    /// merges them onto every row. Fails while any decision is pending.
    pub fn finish(mut self) -> Result<ReconcileOutput, ReconcileError> {
        let confirmed = self.session.commit()?;

        self.logger.log_phase("Allocating identifiers", None);
        for record in &self.records {
            let outcome = self.allocator.allocate(
                &record.key,
                self.exact.get(&record.key).map(String::as_str),
                confirmed.confirmed(&record.key),
            )?;
            if !self.exact.contains_key(&record.key) {
                self.logger
                    .log_decision(&record.key.to_string(), Some(outcome.identifier()));
            }
        }
        let (exact, confirmed_count, minted) = self.allocator.counts();
        self.logger.log_allocation(exact, confirmed_count, minted);
        self.stats.fuzzy_confirmed = confirmed_count;
        self.stats.minted = minted;

        self.logger.log_phase("Merging identifiers", None);
        let outcomes = self.allocator.into_outcomes();
        let table = merge(&self.table, &self.records, &outcomes, self.profile)?;

        self.logger.log_completion(table.len(), table.columns.len());
        self.stats.total_processing_time = self.logger.elapsed_secs();
        info!(
            "🏁 Run {} resolved {} distinct keys",
            self.stats.run_id,
            outcomes.len()
        );

        Ok(ReconcileOutput {
            table,
            outcomes,
            stats: self.stats,
        })
    }
}

/// Prepares, reviews with `reviewer` when any key is unmatched, and finishes.
pub async fn run_reconciliation(
    reconciler: &Reconciler<'_>,
    table: Table,
    reviewer: &mut dyn Reviewer,
) -> Result<ReconcileOutput> {
    let mut run = reconciler.prepare(table).await?;
    if run.needs_review() {
        run_review(run.session_mut(), reviewer)?;
    }
    Ok(run.finish()?)
}

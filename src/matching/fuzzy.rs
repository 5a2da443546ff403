// src/matching/fuzzy.rs
use futures::future::join_all;
use indicatif::ProgressBar;
use log::debug;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::error::ReconcileError;
use crate::matching::similarity::weighted_ratio;
use crate::models::{Candidate, Proposal, ProposalBasis, RegistryTable, UnmatchedKey};

/// Proposal plus the full scored candidate list for one unmatched key.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// `None` is the "no potential match" sentinel.
    pub proposal: Option<Proposal>,
    /// Every registry entity of the country, best primary score first.
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyCandidateRanker {
    threshold: u8,
}

impl FuzzyCandidateRanker {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.min(100),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Scores `key` against every entity in `registry`. The primary name is
    /// tried first; the secondary reference only when no primary score
    /// reaches the threshold.
    pub fn rank(&self, key: &UnmatchedKey, registry: &RegistryTable) -> Ranking {
        let scores: Vec<u8> = registry
            .entities
            .iter()
            .map(|e| weighted_ratio(&key.key.name, &e.normalized_primary))
            .collect();

        // strict comparison keeps the first entity on ties
        let mut best_primary: Option<(usize, u8)> = None;
        for (idx, &score) in scores.iter().enumerate() {
            if best_primary.map_or(true, |(_, best)| score > best) {
                best_primary = Some((idx, score));
            }
        }

        let mut proposal = best_primary
            .filter(|(_, score)| *score >= self.threshold)
            .map(|(idx, score)| {
                let entity = &registry.entities[idx];
                Proposal {
                    identifier: entity.identifier.clone(),
                    primary: entity.primary.clone(),
                    score,
                    basis: ProposalBasis::PrimaryName,
                }
            });

        if proposal.is_none() {
            proposal = key
                .normalized_secondary
                .as_deref()
                .and_then(|secondary| self.best_secondary(secondary, registry));
        }

        let mut candidates: Vec<Candidate> = registry
            .entities
            .iter()
            .zip(&scores)
            .map(|(entity, &score)| Candidate {
                identifier: entity.identifier.clone(),
                primary: entity.primary.clone(),
                secondary: entity.secondary.clone(),
                score,
            })
            .collect();
        // sort_by is stable, so equal scores stay in registry order
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(
            "Ranked {}: best primary {:?}, proposal {:?}",
            key.key,
            best_primary.map(|(_, s)| s),
            proposal.as_ref().map(|p| (&p.identifier, p.score, p.basis))
        );

        Ranking {
            proposal,
            candidates,
        }
    }

    fn best_secondary(&self, secondary: &str, registry: &RegistryTable) -> Option<Proposal> {
        if secondary.trim().is_empty() {
            return None;
        }
        let mut best: Option<Proposal> = None;
        for entity in &registry.entities {
            let Some(other) = entity.normalized_secondary.as_deref() else {
                continue;
            };
            let score = weighted_ratio(secondary, other);
            if score < self.threshold {
                continue;
            }
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(Proposal {
                    identifier: entity.identifier.clone(),
                    primary: entity.primary.clone(),
                    score,
                    basis: ProposalBasis::SecondaryReference,
                });
            }
        }
        best
    }

    /// Ranks `keys` on blocking worker tasks, at most `concurrency` chunks
    /// at a time. Results come back in the order of `keys`.
    pub async fn rank_all(
        &self,
        keys: Vec<UnmatchedKey>,
        registry: Arc<RegistryTable>,
        concurrency: usize,
        chunk_size: usize,
        progress: Option<ProgressBar>,
    ) -> Result<Vec<(UnmatchedKey, Ranking)>, ReconcileError> {
        let total = keys.len();
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

        let tasks = keys.chunks(chunk_size.max(1)).map(|chunk| {
            let chunk = chunk.to_vec();
            let semaphore = Arc::clone(&semaphore);
            let registry = Arc::clone(&registry);
            let progress = progress.clone();
            let ranker = *self;

            async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ReconcileError::Ranking {
                        message: format!("worker pool closed: {}", e),
                    })?;

                tokio::task::spawn_blocking(move || {
                    chunk
                        .into_iter()
                        .map(|key| {
                            let ranking = ranker.rank(&key, &registry);
                            if let Some(pb) = &progress {
                                pb.inc(1);
                            }
                            (key, ranking)
                        })
                        .collect::<Vec<_>>()
                })
                .await
                .map_err(|e| ReconcileError::Ranking {
                    message: format!("ranking task failed: {}", e),
                })
            }
        });

        let results = join_all(tasks).await;

        let mut ranked = Vec::with_capacity(total);
        for result in results {
            ranked.extend(result?);
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("Ranked {} keys for {}", total, registry.country));
        }
        Ok(ranked)
    }
}

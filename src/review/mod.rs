// src/review/mod.rs
pub mod batch;
pub mod session;
pub mod terminal;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::models::{Choice, Decision, PendingDecision};

pub use batch::{write_pending, BatchReviewer};
pub use session::{ConfirmedDecisions, DisambiguationSession};
pub use terminal::TerminalReviewer;

/// Front end that answers pending decisions, one key at a time.
pub trait Reviewer {
    fn review(&mut self, pending: &PendingDecision) -> Result<Choice>;

    /// Called once every key is decided; returned decisions replace earlier
    /// ones. An empty result ends the review.
    fn revise(&mut self, _session: &DisambiguationSession) -> Result<Vec<Decision>> {
        Ok(Vec::new())
    }
}

/// Drives `reviewer` until every key in `session` has a decision. Returns
/// the number of decisions recorded.
pub fn run_review(session: &mut DisambiguationSession, reviewer: &mut dyn Reviewer) -> Result<usize> {
    let queue: Vec<PendingDecision> = session.undecided().into_iter().cloned().collect();
    if queue.is_empty() {
        return Ok(0);
    }
    info!("📝 {} keys awaiting review", queue.len());

    let mut recorded = 0;
    for pending in &queue {
        let choice = reviewer
            .review(pending)
            .with_context(|| format!("Review of {} failed", pending.key))?;
        debug!("Decision for {}: {:?}", pending.key, choice);
        session.record(Decision {
            key: pending.key.clone(),
            choice,
        })?;
        recorded += 1;
    }

    loop {
        let revisions = reviewer.revise(session)?;
        if revisions.is_empty() {
            break;
        }
        for decision in revisions {
            info!("✏️  Revised decision for {}", decision.key);
            session.record(decision)?;
            recorded += 1;
        }
    }
    Ok(recorded)
}

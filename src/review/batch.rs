// src/review/batch.rs
use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::Reviewer;
use crate::models::{Candidate, Choice, DistinctKey, PendingDecision, Proposal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchAction {
    Accept,
    NoMatch,
}

/// One entry of a decisions file. Country and name may be given raw or
/// normalized; other fields (as written by `write_pending`) are ignored.
#[derive(Debug, Deserialize)]
struct DecisionEntry {
    country: String,
    name: String,
    #[serde(default)]
    action: Option<BatchAction>,
    #[serde(default)]
    identifier: Option<String>,
}

#[derive(Debug, Serialize)]
struct PendingEntry<'a> {
    country: &'a str,
    name: &'a str,
    occurrences: usize,
    secondary_reference: Option<&'a str>,
    proposal: Option<&'a Proposal>,
    candidates: &'a [Candidate],
    action: Option<BatchAction>,
    identifier: Option<&'a str>,
}

/// Answers pending decisions from a pre-approved decisions file. A key the
/// file does not decide is an error.
pub struct BatchReviewer {
    source: String,
    decisions: HashMap<DistinctKey, (Option<BatchAction>, Option<String>)>,
}

impl BatchReviewer {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open decisions file {}", path.display()))?;
        let entries: Vec<DecisionEntry> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse decisions file {}", path.display()))?;
        let reviewer = Self::from_entries(path.display().to_string(), entries);
        info!(
            "📄 Loaded {} decisions from {}",
            reviewer.decisions.len(),
            reviewer.source
        );
        Ok(reviewer)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<DecisionEntry> =
            serde_json::from_str(json).context("Failed to parse decisions JSON")?;
        Ok(Self::from_entries("inline JSON".to_string(), entries))
    }

    fn from_entries(source: String, entries: Vec<DecisionEntry>) -> Self {
        let mut decisions = HashMap::new();
        for entry in entries {
            let key = DistinctKey::from_raw(&entry.country, &entry.name);
            if decisions
                .insert(key.clone(), (entry.action, entry.identifier))
                .is_some()
            {
                warn!("Decisions file lists {} more than once; using the last entry", key);
            }
        }
        Self { source, decisions }
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

impl Reviewer for BatchReviewer {
    fn review(&mut self, pending: &PendingDecision) -> Result<Choice> {
        let (action, identifier) = self
            .decisions
            .get(&pending.key)
            .ok_or_else(|| anyhow!("{} has no decision in {}", pending.key, self.source))?;

        match action {
            Some(BatchAction::NoMatch) => Ok(Choice::NoMatch),
            Some(BatchAction::Accept) => match identifier.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => Ok(Choice::Accept {
                    identifier: id.to_string(),
                }),
                _ => bail!("{} is accepted in {} without an identifier", pending.key, self.source),
            },
            None => bail!("{} has no action in {}", pending.key, self.source),
        }
    }
}

/// Writes pending decisions as a JSON decisions template. Every entry's
/// `action` is left empty for the reviewer to fill in.
pub fn write_pending(path: &Path, pending: &[PendingDecision]) -> Result<()> {
    let entries: Vec<PendingEntry> = pending
        .iter()
        .map(|p| PendingEntry {
            country: &p.key.country,
            name: &p.display_name,
            occurrences: p.occurrences,
            secondary_reference: p.secondary_reference.as_deref(),
            proposal: p.proposal.as_ref(),
            candidates: &p.candidates,
            action: None,
            identifier: None,
        })
        .collect();

    let file = File::create(path)
        .with_context(|| format!("Failed to create pending decisions file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &entries)
        .with_context(|| format!("Failed to write pending decisions to {}", path.display()))?;
    info!("💾 Wrote {} pending decisions to {}", entries.len(), path.display());
    Ok(())
}

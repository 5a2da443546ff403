// src/review/terminal.rs
use anyhow::{bail, Result};
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use super::{DisambiguationSession, Reviewer};
use crate::matching::normalize::normalize;
use crate::models::{Candidate, Choice, Decision, PendingDecision, ProposalBasis};
use crate::utils::constants::NO_POTENTIAL_MATCH;

/// Interactive reviewer on a line-oriented terminal.
///
/// For each key the proposal is pre-selected: Enter takes it, a number picks
/// a candidate from the full list, `n` (or `0`) declares no potential match
/// and `/text` lists candidates whose name contains `text`.
pub struct TerminalReviewer<R, W> {
    input: R,
    output: W,
    shown: usize,
    reviewed: usize,
}

impl TerminalReviewer<StdinLock<'static>, Stdout> {
    pub fn stdio(shown: usize) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), shown)
    }
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    pub fn new(input: R, output: W, shown: usize) -> Self {
        Self {
            input,
            output,
            shown: shown.max(1),
            reviewed: 0,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed before the review was finished");
        }
        Ok(line.trim().to_string())
    }

    fn print_candidates<'a>(
        &mut self,
        candidates: impl Iterator<Item = (usize, &'a Candidate)>,
        preselected: Option<&str>,
    ) -> Result<()> {
        for (idx, candidate) in candidates {
            let marker = if preselected == Some(candidate.identifier.as_str()) { "*" } else { " " };
            write!(
                self.output,
                "  {}{:>3}. {} [{}] ({})",
                marker,
                idx + 1,
                candidate.primary,
                candidate.identifier,
                candidate.score
            )?;
            if let Some(secondary) = &candidate.secondary {
                write!(self.output, " ref: {}", secondary)?;
            }
            writeln!(self.output)?;
        }
        Ok(())
    }

    fn show(&mut self, pending: &PendingDecision) -> Result<()> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "🔎 [{}] \"{}\" ({}) - {} row(s)",
            self.reviewed, pending.display_name, pending.key.country, pending.occurrences
        )?;
        if let Some(reference) = &pending.secondary_reference {
            writeln!(self.output, "   Reference: {}", reference)?;
        }
        match &pending.proposal {
            Some(p) => {
                let basis = match p.basis {
                    ProposalBasis::PrimaryName => "name",
                    ProposalBasis::SecondaryReference => "reference",
                };
                writeln!(
                    self.output,
                    "   Proposal: {} [{}] (score {} on {})",
                    p.primary, p.identifier, p.score, basis
                )?;
            }
            None => writeln!(self.output, "   Proposal: {}", NO_POTENTIAL_MATCH)?,
        }

        let preselected = pending.proposal.as_ref().map(|p| p.identifier.as_str());
        let marker = if preselected.is_none() { "*" } else { " " };
        writeln!(self.output, "  {}  0. {}", marker, NO_POTENTIAL_MATCH)?;
        self.print_candidates(pending.candidates.iter().enumerate().take(self.shown), preselected)?;
        if pending.candidates.len() > self.shown {
            writeln!(
                self.output,
                "       ... {} more, type /text to search",
                pending.candidates.len() - self.shown
            )?;
        }
        Ok(())
    }

    fn prompt(&mut self, pending: &PendingDecision) -> Result<Choice> {
        self.show(pending)?;
        let preselected = pending.preselected_choice();

        loop {
            write!(
                self.output,
                "Choice [Enter = preselected, 0-{}, n = no match, /text = search]: ",
                pending.candidates.len()
            )?;
            self.output.flush()?;

            let answer = self.read_answer()?;
            if answer.is_empty() {
                return Ok(preselected);
            }
            if answer.eq_ignore_ascii_case("n") || answer == "0" {
                return Ok(Choice::NoMatch);
            }
            if let Some(query) = answer.strip_prefix('/') {
                let query = normalize(query.trim());
                let matches: Vec<(usize, &Candidate)> = pending
                    .candidates
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| normalize(&c.primary).contains(&query))
                    .collect();
                if matches.is_empty() {
                    writeln!(self.output, "   No candidates contain \"{}\"", query)?;
                } else {
                    self.print_candidates(matches.into_iter(), preselected.identifier())?;
                }
                continue;
            }
            match answer.parse::<usize>() {
                Ok(n) if n >= 1 && n <= pending.candidates.len() => {
                    return Ok(Choice::Accept {
                        identifier: pending.candidates[n - 1].identifier.clone(),
                    });
                }
                _ => writeln!(self.output, "❌ Invalid choice: {}", answer)?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Reviewer for TerminalReviewer<R, W> {
    fn review(&mut self, pending: &PendingDecision) -> Result<Choice> {
        self.reviewed += 1;
        self.prompt(pending)
    }

    fn revise(&mut self, session: &DisambiguationSession) -> Result<Vec<Decision>> {
        writeln!(self.output)?;
        writeln!(self.output, "📋 Decisions:")?;
        for (idx, pending) in session.pending().iter().enumerate() {
            let label = match session.current(&pending.key) {
                Some(Choice::Accept { identifier }) => pending
                    .candidate(identifier)
                    .map(|c| format!("{} [{}]", c.primary, c.identifier))
                    .unwrap_or_else(|| identifier.clone()),
                Some(Choice::NoMatch) => NO_POTENTIAL_MATCH.to_string(),
                None => "(undecided)".to_string(),
            };
            writeln!(self.output, "  {:>3}. {} -> {}", idx + 1, pending.display_name, label)?;
        }

        loop {
            write!(self.output, "Number to revise, Enter to commit: ")?;
            self.output.flush()?;
            let answer = self.read_answer()?;
            if answer.is_empty() {
                return Ok(Vec::new());
            }
            match answer.parse::<usize>() {
                Ok(n) if n >= 1 && n <= session.len() => {
                    let pending = &session.pending()[n - 1];
                    let choice = self.prompt(pending)?;
                    return Ok(vec![Decision {
                        key: pending.key.clone(),
                        choice,
                    }]);
                }
                _ => writeln!(self.output, "❌ Invalid choice: {}", answer)?,
            }
        }
    }
}

//! Decision log shared by the stringing and assignment passes.
//!
//! Each greedy pass records what it accepted and what it turned down so a
//! caller can audit why a panel ended up where it did.

use std::fmt;

use serde::Serialize;

/// Pass that made a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Build,
    Salvage,
    SameRoof,
    SimilarRoof,
    Straggler,
    Rebalance,
    Mppt,
    Inverter,
}

/// Whether the candidate action was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub phase: Phase,
    pub verdict: Verdict,
    pub detail: String,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self.verdict {
            Verdict::Accepted => "accept",
            Verdict::Rejected => "reject",
        };
        write!(f, "[{:?}] {verdict}: {}", self.phase, self.detail)
    }
}

/// Append-only list of decisions in the order they were made.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DecisionLog {
    entries: Vec<Decision>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, phase: Phase, detail: impl Into<String>) {
        self.push(phase, Verdict::Accepted, detail.into());
    }

    pub fn reject(&mut self, phase: Phase, detail: impl Into<String>) {
        self.push(phase, Verdict::Rejected, detail.into());
    }

    fn push(&mut self, phase: Phase, verdict: Verdict, detail: String) {
        self.entries.push(Decision {
            phase,
            verdict,
            detail,
        });
    }

    /// Moves every entry of `other` onto the end of this log.
    pub fn append(&mut self, other: &mut DecisionLog) {
        self.entries.append(&mut other.entries);
    }

    pub fn entries(&self) -> &[Decision] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries recorded by one pass.
    pub fn by_phase(&self, phase: Phase) -> impl Iterator<Item = &Decision> {
        self.entries.iter().filter(move |d| d.phase == phase)
    }
}

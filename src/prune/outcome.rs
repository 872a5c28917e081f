//! Per-member results of a prune run

use crate::gitlab::{Group, Member};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum RemovalResult {
    Skipped,
    Removed,
    Failed(String),
}

/// What happened to one member of one group. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    pub group: Group,
    pub member: Member,
    pub result: RemovalResult,
}

impl RemovalOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.result, RemovalResult::Failed(_))
    }
}

/// A group whose member list could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFailure {
    pub group: Group,
    pub error: String,
}

/// Everything recorded during one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub outcomes: Vec<RemovalOutcome>,
    pub group_failures: Vec<GroupFailure>,
}

impl PruneReport {
    pub fn removed(&self) -> usize {
        self.count(|r| matches!(r, RemovalResult::Removed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, RemovalResult::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, RemovalResult::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&RemovalResult) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.result)).count()
    }

    pub fn has_failures(&self) -> bool {
        !self.group_failures.is_empty() || self.outcomes.iter().any(RemovalOutcome::is_failed)
    }

    pub fn outcomes_for(&self, group_id: u64) -> impl Iterator<Item = &RemovalOutcome> {
        self.outcomes.iter().filter(move |o| o.group.id == group_id)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RemovalOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    pub(crate) fn absorb(&mut self, other: PruneReport) {
        self.outcomes.extend(other.outcomes);
        self.group_failures.extend(other.group_failures);
    }
}

impl fmt::Display for PruneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Removed {}, skipped {}, failed {} ({} group(s) could not be read)",
            self.removed(),
            self.skipped(),
            self.failed(),
            self.group_failures.len()
        )?;

        for failure in &self.group_failures {
            writeln!(f, "  group {}: {}", failure.group, failure.error)?;
        }
        for outcome in self.failures() {
            if let RemovalResult::Failed(error) = &outcome.result {
                writeln!(
                    f,
                    "  {} in group {}: {}",
                    outcome.member, outcome.group, error
                )?;
            }
        }
        Ok(())
    }
}

//! Per-operation outcomes of a sync run.

use std::fmt;

use serde::Serialize;

use crate::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Lookup,
}

impl OperationKind {
    fn verb(self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Lookup => "look up",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            OperationKind::Create => "created",
            OperationKind::Update => "updated",
            OperationKind::Delete => "deleted",
            OperationKind::Lookup => "found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    /// Create hit an existing uid; recovery continues in a later round.
    Conflict,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationOutcome {
    pub kind: OperationKind,
    /// Part of conflict recovery rather than the original plan.
    pub recovered: bool,
    pub event: Event,
    pub status: OutcomeStatus,
}

impl OperationOutcome {
    pub fn new(kind: OperationKind, event: Event, status: OutcomeStatus) -> Self {
        OperationOutcome {
            kind,
            recovered: false,
            event,
            status,
        }
    }

    pub fn recovered(mut self) -> Self {
        self.recovered = true;
        self
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = &self.event;
        match (&self.status, self.recovered) {
            (OutcomeStatus::Succeeded, false) => {
                write!(f, "Successfully {} event {event}", self.kind.past_tense())
            }
            (OutcomeStatus::Succeeded, true) => {
                write!(f, "Successfully {} the existing event for {event}", self.kind.past_tense())
            }
            (OutcomeStatus::Conflict, _) => write!(
                f,
                "Failed to {} event {event} because it already exists - will try and update the existing event",
                self.kind.verb()
            ),
            (OutcomeStatus::Failed(reason), false) => {
                write!(f, "Failed to {} event {event}: {reason}", self.kind.verb())
            }
            (OutcomeStatus::Failed(reason), true) if self.kind == OperationKind::Lookup => {
                write!(f, "Failed to find the existing event for {event}: {reason}")
            }
            (OutcomeStatus::Failed(reason), true) => write!(
                f,
                "Failed to {} the existing event for {event}: {reason}",
                self.kind.verb()
            ),
        }
    }
}

/// Everything that happened during one sync run, in round then queue order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub outcomes: Vec<OperationOutcome>,
    /// Batches submitted to the remote.
    pub rounds: usize,
}

impl SyncReport {
    pub fn push(&mut self, outcome: OperationOutcome) {
        self.outcomes.push(outcome);
    }

    /// True when no operation in any round failed.
    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(OperationOutcome::is_failure)
    }

    pub fn succeeded(&self, kind: OperationKind) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.kind == kind && o.status == OutcomeStatus::Succeeded)
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}

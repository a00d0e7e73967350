use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::DiffKind;
use crate::event::Event;

/// One planned change, with the remote event before and the payload after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDiff {
    pub kind: DiffKind,
    pub old: Option<Event>,
    pub new: Option<Event>,
}

impl fmt::Display for EventDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.event() {
            Some(event) => write!(f, "{}: {}", self.kind, event),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl EventDiff {
    pub fn create(new: Event) -> Self {
        EventDiff {
            kind: DiffKind::Create,
            old: None,
            new: Some(new),
        }
    }

    pub fn update(old: Event, new: Event) -> Self {
        EventDiff {
            kind: DiffKind::Update,
            old: Some(old),
            new: Some(new),
        }
    }

    pub fn delete(old: Event) -> Self {
        EventDiff {
            kind: DiffKind::Delete,
            old: Some(old),
            new: None,
        }
    }

    /// Get the event (prefer new, fallback to old)
    pub fn event(&self) -> Option<&Event> {
        self.new.as_ref().or(self.old.as_ref())
    }

    /// Summary change of an update, if the title differs.
    pub fn summary_change(&self) -> Option<(&str, &str)> {
        match (&self.old, &self.new) {
            (Some(old), Some(new)) if old.summary != new.summary => {
                Some((old.summary.as_str(), new.summary.as_str()))
            }
            _ => None,
        }
    }
}

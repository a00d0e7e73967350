//! Planning of the create/update/delete sets for one sync run.

use serde::Serialize;
use tracing::warn;

use crate::diff::matching::EventMatches;
use crate::diff::merge::merge_summary;
use crate::diff::{DiffKind, EventDiff};
use crate::event::Event;

/// Update of an existing remote event.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedUpdate {
    /// Remote id of the event being overwritten.
    pub id: String,
    /// The event as it currently exists on the remote.
    pub existing: Event,
    /// Payload that replaces it.
    pub event: Event,
}

/// Changes needed to bring a remote calendar in line with the targets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncPlan {
    pub create: Vec<Event>,
    /// One entry per remote id, in target order.
    pub update: Vec<PlannedUpdate>,
    pub delete: Vec<Event>,
}

impl SyncPlan {
    /// Plan the changes that turn `existing` into `targets`.
    ///
    /// Every target gets its summary recorded as the generated one. Matched
    /// events are always updated; if the remote summary was edited by hand
    /// since the last sync, the payload summary is a merge of the edit and the
    /// newly generated summary. Unmatched remote events are deleted unless
    /// they are already cancelled.
    pub fn compute(existing: &[Event], mut targets: Vec<Event>) -> Self {
        for target in &mut targets {
            target.record_generated_summary();
        }

        let matches = EventMatches::compute(existing, &targets);

        let create = matches
            .unmatched_targets
            .iter()
            .map(|&target| target.clone())
            .collect();

        let mut update = Vec::with_capacity(matches.matched.len());
        for (existing, target) in matches.matched {
            let Some(id) = existing.id.clone() else {
                warn!("Skipping update of {existing}: remote event has no id");
                continue;
            };

            let mut payload = target.clone();
            payload.id = Some(id.clone());

            let edited_from = existing
                .generated_summary()
                .filter(|_| existing.has_manual_summary_edit());
            if let Some(previous) = edited_from {
                payload.summary = merge_summary(previous, &existing.summary, &target.summary);
            }

            update.push(PlannedUpdate {
                id,
                existing: existing.clone(),
                event: payload,
            });
        }

        let delete = matches
            .unmatched_existing
            .into_iter()
            .filter(|existing| !existing.is_cancelled())
            .filter(|existing| {
                if existing.id.is_none() {
                    warn!("Skipping delete of {existing}: remote event has no id");
                }
                existing.id.is_some()
            })
            .cloned()
            .collect();

        SyncPlan {
            create,
            update,
            delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    /// (created, updated, deleted)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.create.len(), self.update.len(), self.delete.len())
    }

    /// Planned changes in execution order: deletes, updates, creates.
    pub fn diffs(&self) -> Vec<EventDiff> {
        let deletes = self.delete.iter().cloned().map(EventDiff::delete);
        let updates = self
            .update
            .iter()
            .map(|u| EventDiff::update(u.existing.clone(), u.event.clone()));
        let creates = self.create.iter().cloned().map(EventDiff::create);

        deletes.chain(updates).chain(creates).collect()
    }

    pub fn count(&self, kind: DiffKind) -> usize {
        match kind {
            DiffKind::Create => self.create.len(),
            DiffKind::Update => self.update.len(),
            DiffKind::Delete => self.delete.len(),
        }
    }
}

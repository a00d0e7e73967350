//! Round-based execution of a [`SyncPlan`] against a remote store.
//!
//! Every round submits the whole work queue as one batch and waits for all
//! results. Handling a result may queue follow-up work (a create that hit an
//! existing uid needs a lookup, a successful lookup needs an update), which
//! becomes the next round. Execution stops when a round queues nothing new,
//! or after [`MAX_ROUNDS`].

use tracing::{debug, warn};

use crate::constants::MAX_ROUNDS;
use crate::diff::SyncPlan;
use crate::event::Event;
use crate::remote::store::{Batch, EventQuery, Operation, RemoteError, RemoteStore, Reply};
use crate::sync::report::{OperationKind, OperationOutcome, OutcomeStatus, SyncReport};

/// A unit of work waiting for the next round.
#[derive(Debug, Clone)]
enum Task {
    Delete { id: String, event: Event },
    Update { id: String, event: Event },
    Create { event: Event },
    /// Find the event whose uid made `event`'s create fail.
    Lookup { uid: String, event: Event },
    /// Overwrite the event found by a lookup with the original create payload.
    RecoveredUpdate { id: String, event: Event },
}

impl Task {
    fn operation(&self) -> Operation {
        match self {
            Task::Delete { id, .. } => Operation::Delete { id: id.clone() },
            Task::Update { id, event } | Task::RecoveredUpdate { id, event } => {
                Operation::Update {
                    id: id.clone(),
                    event: event.clone(),
                }
            }
            Task::Create { event } => Operation::Insert {
                event: event.clone(),
            },
            Task::Lookup { uid, .. } => Operation::List {
                query: EventQuery::by_uid(uid.as_str()).show_deleted(true),
            },
        }
    }

    fn kind(&self) -> OperationKind {
        match self {
            Task::Delete { .. } => OperationKind::Delete,
            Task::Update { .. } | Task::RecoveredUpdate { .. } => OperationKind::Update,
            Task::Create { .. } => OperationKind::Create,
            Task::Lookup { .. } => OperationKind::Lookup,
        }
    }

    fn is_recovery(&self) -> bool {
        matches!(self, Task::Lookup { .. } | Task::RecoveredUpdate { .. })
    }

    fn into_event(self) -> Event {
        match self {
            Task::Delete { event, .. }
            | Task::Update { event, .. }
            | Task::Create { event }
            | Task::Lookup { event, .. }
            | Task::RecoveredUpdate { event, .. } => event,
        }
    }

    fn outcome(self, status: OutcomeStatus) -> OperationOutcome {
        let kind = self.kind();
        let recovered = self.is_recovery();
        let outcome = OperationOutcome::new(kind, self.into_event(), status);
        if recovered { outcome.recovered() } else { outcome }
    }

    /// Record the result of this task and queue whatever follows from it.
    fn resolve(
        self,
        result: Result<Reply, RemoteError>,
        report: &mut SyncReport,
        next: &mut Vec<Task>,
    ) {
        match (self, result) {
            (Task::Create { event }, Err(e)) if e.is_conflict() => {
                debug!("Create of {event} conflicted, looking up the existing event");
                report.push(OperationOutcome::new(
                    OperationKind::Create,
                    event.clone(),
                    OutcomeStatus::Conflict,
                ));
                match event.uid().map(str::to_string) {
                    Some(uid) => next.push(Task::Lookup { uid, event }),
                    // An empty uid filter would list the whole calendar
                    None => {
                        warn!("Cannot recover {event}: it has no uid");
                        let reason = "the event has no uid to look up".to_string();
                        report.push(
                            OperationOutcome::new(
                                OperationKind::Lookup,
                                event,
                                OutcomeStatus::Failed(reason),
                            )
                            .recovered(),
                        );
                    }
                }
            }
            (Task::Lookup { uid, event }, Ok(Reply::Events(found))) => match single_id(&found) {
                Ok(id) => next.push(Task::RecoveredUpdate { id, event }),
                Err(reason) => {
                    warn!("Cannot recover {event}: {reason}");
                    let task = Task::Lookup { uid, event };
                    report.push(task.outcome(OutcomeStatus::Failed(reason)));
                }
            },
            (task @ Task::Lookup { .. }, Ok(reply)) => {
                let reason = format!("Unexpected reply to lookup: {reply:?}");
                report.push(task.outcome(OutcomeStatus::Failed(reason)));
            }
            (task, Ok(_)) => report.push(task.outcome(OutcomeStatus::Succeeded)),
            (task, Err(e)) => report.push(task.outcome(OutcomeStatus::Failed(e.to_string()))),
        }
    }
}

/// Remote id of the single event a conflict lookup must find.
fn single_id(found: &[Event]) -> Result<String, String> {
    match found {
        [event] => event
            .id
            .clone()
            .ok_or_else(|| "the existing event has no id".to_string()),
        [] => Err("no event with this uid exists".to_string()),
        many => Err(format!("{} events share this uid", many.len())),
    }
}

/// Tasks of a plan in submission order: deletes, updates, creates.
fn initial_tasks(plan: SyncPlan) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(plan.delete.len() + plan.update.len() + plan.create.len());

    for event in plan.delete {
        // The planner only deletes events that carry an id
        if let Some(id) = event.id.clone() {
            tasks.push(Task::Delete { id, event });
        }
    }
    tasks.extend(
        plan.update
            .into_iter()
            .map(|u| Task::Update { id: u.id, event: u.event }),
    );
    tasks.extend(plan.create.into_iter().map(|event| Task::Create { event }));

    tasks
}

/// Apply `plan` to `store`, reporting the outcome of every operation.
///
/// Remote failures never abort the run: each one is recorded against the
/// operation it belongs to and the remaining operations go ahead.
pub async fn execute<S: RemoteStore + ?Sized>(store: &S, plan: SyncPlan) -> SyncReport {
    let mut report = SyncReport::default();
    let mut queue = initial_tasks(plan);

    while !queue.is_empty() {
        if report.rounds == MAX_ROUNDS {
            warn!("Giving up on {} operations after {MAX_ROUNDS} rounds", queue.len());
            let reason = format!("Gave up after {MAX_ROUNDS} rounds");
            for task in queue {
                report.push(task.outcome(OutcomeStatus::Failed(reason.clone())));
            }
            break;
        }
        report.rounds += 1;

        let mut batch = Batch::new();
        let ids: Vec<_> = queue.iter().map(|task| batch.queue(task.operation())).collect();
        debug!(round = report.rounds, operations = batch.len(), "Submitting batch");

        let mut next = Vec::new();
        match store.execute(batch).await {
            Ok(mut results) => {
                for (task, id) in queue.into_iter().zip(ids) {
                    let result = results.remove(&id).unwrap_or_else(|| {
                        Err(RemoteError::new(None, "No result returned for operation"))
                    });
                    task.resolve(result, &mut report, &mut next);
                }
            }
            Err(e) => {
                warn!("Batch round {} failed: {e}", report.rounds);
                for task in queue {
                    report.push(task.outcome(OutcomeStatus::Failed(e.to_string())));
                }
            }
        }

        debug!(round = report.rounds, queued = next.len(), "Round complete");
        queue = next;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::PlannedUpdate;
    use crate::event::EventStatus;
    use crate::testing::{FakeStore, event, remote_event};

    fn create_plan(events: Vec<Event>) -> SyncPlan {
        SyncPlan {
            create: events,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_conflict_with_tombstone_is_recovered_as_update() {
        let mut tombstone = remote_event("a@d", "evt-1", "Old", Some("Old"));
        tombstone.status = EventStatus::Cancelled;
        let store = FakeStore::with_events(vec![tombstone]);

        let mut target = event("a@d", "New");
        target.record_generated_summary();
        let report = execute(&store, create_plan(vec![target])).await;

        assert!(report.is_success());
        assert_eq!(report.rounds, 3);
        assert_eq!(report.succeeded(OperationKind::Update), 1);
        assert_eq!(report.succeeded(OperationKind::Create), 0);

        let statuses: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| (o.kind, o.recovered, o.status.clone()))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (OperationKind::Create, false, OutcomeStatus::Conflict),
                (OperationKind::Update, true, OutcomeStatus::Succeeded),
            ]
        );

        let stored = store.events();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id.as_deref(), Some("evt-1"));
        assert_eq!(stored[0].summary, "New");
        assert_eq!(stored[0].status, EventStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_ambiguous_lookup_fails_only_that_event() {
        let store = FakeStore::with_events(vec![
            remote_event("dup@d", "evt-1", "One", None),
            remote_event("dup@d", "evt-2", "Two", None),
        ]);

        let report = execute(
            &store,
            create_plan(vec![event("dup@d", "Dup"), event("fresh@d", "Fresh")]),
        )
        .await;

        assert!(!report.is_success());
        assert_eq!(report.succeeded(OperationKind::Create), 1);

        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].kind, OperationKind::Lookup);
        assert_eq!(
            failed[0].status,
            OutcomeStatus::Failed("2 events share this uid".into())
        );
        assert_eq!(report.rounds, 2);
    }

    #[tokio::test]
    async fn test_generic_failures_are_not_retried() {
        let store = FakeStore::default();
        store.fail_operations_on("evt-404", RemoteError::new(Some(404), "Not Found"));

        let plan = SyncPlan {
            delete: vec![remote_event("gone@d", "evt-404", "Gone", None)],
            update: vec![PlannedUpdate {
                id: "evt-404".into(),
                existing: remote_event("x@d", "evt-404", "X", None),
                event: event("x@d", "X"),
            }],
            create: vec![],
        };
        let report = execute(&store, plan).await;

        assert_eq!(report.rounds, 1);
        assert_eq!(report.failed().count(), 2);
        assert_eq!(
            report.outcomes[0].to_string(),
            format!(
                "Failed to delete event {}: Not Found (404)",
                remote_event("gone@d", "evt-404", "Gone", None)
            )
        );
    }

    #[tokio::test]
    async fn test_round_order_is_delete_update_create() {
        let store = FakeStore::with_events(vec![
            remote_event("old@d", "evt-1", "Old", None),
            remote_event("keep@d", "evt-2", "Keep", None),
        ]);

        let plan = SyncPlan::compute(
            &store.events(),
            vec![event("new@d", "New"), event("keep@d", "Keep")],
        );
        let report = execute(&store, plan).await;

        let kinds: Vec<_> = report.outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![OperationKind::Delete, OperationKind::Update, OperationKind::Create]
        );
        assert_eq!(report.rounds, 1);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_transport_failure_fails_every_queued_operation() {
        let store = FakeStore::default();
        store.fail_next_round();

        let report = execute(&store, create_plan(vec![event("a@d", "A"), event("b@d", "B")])).await;

        assert_eq!(report.rounds, 1);
        assert_eq!(report.failed().count(), 2);
        assert!(store.events().is_empty());
    }

    #[tokio::test]
    async fn test_failed_lookup_is_reported_against_the_event() {
        let store = FakeStore::with_events(vec![remote_event("a@d", "evt-1", "Old", None)]);
        store.fail_lookups_of("a@d", RemoteError::new(Some(500), "Backend Error"));

        let target = event("a@d", "New");
        let report = execute(&store, create_plan(vec![target.clone()])).await;

        assert_eq!(report.rounds, 2);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].kind, OperationKind::Lookup);
        assert_eq!(
            failed[0].to_string(),
            format!("Failed to find the existing event for {target}: Backend Error (500)")
        );
        assert_eq!(store.events()[0].summary, "Old");
    }

    #[tokio::test]
    async fn test_lookup_finding_nothing_fails_without_update() {
        let store = FakeStore::with_events(vec![remote_event("a@d", "evt-1", "Old", None)]);
        store.hide_from_lookups("a@d");

        let report = execute(&store, create_plan(vec![event("a@d", "New")])).await;

        assert_eq!(report.rounds, 2);
        assert_eq!(store.batch_sizes(), vec![1, 1]);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(
            failed[0].status,
            OutcomeStatus::Failed("no event with this uid exists".into())
        );
    }

    #[tokio::test]
    async fn test_failed_recovered_update() {
        let mut tombstone = remote_event("a@d", "evt-1", "Old", None);
        tombstone.status = EventStatus::Cancelled;
        let store = FakeStore::with_events(vec![tombstone]);
        store.fail_operations_on("evt-1", RemoteError::new(Some(403), "Forbidden"));

        let target = event("a@d", "New");
        let report = execute(&store, create_plan(vec![target.clone()])).await;

        assert_eq!(report.rounds, 3);
        assert_eq!(report.succeeded(OperationKind::Update), 0);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!((failed[0].kind, failed[0].recovered), (OperationKind::Update, true));
        assert_eq!(
            failed[0].to_string(),
            format!("Failed to update the existing event for {target}: Forbidden (403)")
        );
    }

    #[test]
    fn test_conflict_without_uid_is_not_looked_up() {
        let mut anonymous = event("a@d", "A");
        anonymous.uid = None;

        let mut report = SyncReport::default();
        let mut next = Vec::new();
        Task::Create { event: anonymous }.resolve(
            Err(RemoteError::new(Some(409), "duplicate")),
            &mut report,
            &mut next,
        );

        assert!(next.is_empty());
        let statuses: Vec<_> = report.outcomes.iter().map(|o| (o.kind, o.is_failure())).collect();
        assert_eq!(
            statuses,
            vec![(OperationKind::Create, false), (OperationKind::Lookup, true)]
        );
    }

    #[tokio::test]
    async fn test_empty_plan_submits_nothing() {
        let store = FakeStore::default();
        let report = execute(&store, SyncPlan::default()).await;

        assert_eq!(report.rounds, 0);
        assert!(report.outcomes.is_empty());
        assert!(report.is_success());
    }
}

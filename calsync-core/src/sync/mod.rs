//! Sync runs: fetch the remote state, plan against the targets, execute.

pub mod executor;
pub mod report;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::date_range::DateRange;
use crate::diff::SyncPlan;
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;
use crate::remote::store::{EventQuery, RemoteStore};

pub use report::{OperationKind, OperationOutcome, OutcomeStatus, SyncReport};

/// Events calsync owns in `range`: cancelled ones included, foreign uids left out.
pub async fn fetch_existing<S: RemoteStore + ?Sized>(
    store: &S,
    range: &DateRange,
    domain: &str,
) -> CalSyncResult<Vec<Event>> {
    let window = range.window()?;
    let query = EventQuery::in_window(&window).show_deleted(true);

    let listed = store.list_events(&query).await?;
    let total = listed.len();
    let owned: Vec<Event> = listed
        .into_iter()
        .filter(|e| e.belongs_to_domain(domain))
        .collect();

    debug!(
        "Listed {total} events between {} and {}, {} belong to {domain}",
        window.from_rfc3339(),
        window.to_rfc3339(),
        owned.len()
    );
    Ok(owned)
}

/// Every target needs a unique uid. Uids outside `domain` are allowed but
/// will not be seen by the next run's fetch, so they get a warning.
pub fn validate_targets(targets: &[Event], domain: &str) -> CalSyncResult<()> {
    let mut seen = HashSet::with_capacity(targets.len());

    for target in targets {
        let Some(uid) = target.uid() else {
            return Err(CalSyncError::InvalidTarget(format!("{target} has no uid")));
        };
        if !seen.insert(uid) {
            return Err(CalSyncError::InvalidTarget(format!(
                "uid {uid} is used by more than one event"
            )));
        }
        if !target.belongs_to_domain(domain) {
            warn!("{target} is outside of @{domain}, later runs will not find it");
        }
    }

    Ok(())
}

/// Work out what a sync would change, without changing anything.
pub async fn plan<S: RemoteStore + ?Sized>(
    store: &S,
    range: &DateRange,
    domain: &str,
    targets: Vec<Event>,
) -> CalSyncResult<SyncPlan> {
    validate_targets(&targets, domain)?;
    let existing = fetch_existing(store, range, domain).await?;
    Ok(SyncPlan::compute(&existing, targets))
}

/// Bring the remote calendar in line with `targets`.
///
/// Only a failure to list the current state is an `Err`; failures of single
/// operations are part of the returned report.
pub async fn sync<S: RemoteStore + ?Sized>(
    store: &S,
    range: &DateRange,
    domain: &str,
    targets: Vec<Event>,
) -> CalSyncResult<SyncReport> {
    let plan = plan(store, range, domain, targets).await?;

    let (created, updated, deleted) = plan.counts();
    info!("Creating {created} events");
    info!("Updating {updated} events");
    info!("Deleting {deleted} events");

    Ok(executor::execute(store, plan).await)
}

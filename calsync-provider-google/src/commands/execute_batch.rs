use std::future::Future;

use anyhow::Result;
use calsync_core::event::Event;
use calsync_core::remote::protocol::ExecuteBatch;
use calsync_core::remote::store::{Operation, OperationResult, QueuedOperation, RemoteError, Reply};
use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::api::CalendarApi;
use crate::error::{is_gone, remote_error};
use crate::google_event::{FromGoogle, ToGoogle};

/// Requests of one round that may be in flight at the same time.
const MAX_IN_FLIGHT: usize = 10;

/// Run every operation of the round, at most [`MAX_IN_FLIGHT`] at a time.
/// Failures are reported per operation; only a failure to connect fails the
/// whole round.
pub async fn handle(cmd: ExecuteBatch) -> Result<Vec<OperationResult>> {
    let api = super::connect(&cmd.remote_config).await?;

    debug!(
        "Executing {} operations on {}",
        cmd.operations.len(),
        api.calendar_id()
    );

    Ok(run_bounded(cmd.operations, |queued| run(&api, queued)).await)
}

/// Outputs in input order.
async fn run_bounded<T, F, Fut>(items: Vec<T>, f: F) -> Vec<Fut::Output>
where
    F: FnMut(T) -> Fut,
    Fut: Future,
{
    stream::iter(items).map(f).buffered(MAX_IN_FLIGHT).collect().await
}

async fn run(api: &CalendarApi, queued: QueuedOperation) -> OperationResult {
    let result = match queued.operation {
        Operation::Insert { event } => insert(api, &event).await,
        Operation::Update { id, event } => update(api, &id, &event).await,
        Operation::Delete { id } => delete(api, &id).await,
        Operation::List { query } => super::list_events::list(api, &query)
            .await
            .map(Reply::Events),
    };

    OperationResult {
        id: queued.id,
        result,
    }
}

async fn insert(api: &CalendarApi, event: &Event) -> Result<Reply, RemoteError> {
    let body = event.to_google().map_err(remote_error)?;
    let created = api.insert(&body).await?;

    Event::from_google(created)
        .map(Reply::Event)
        .map_err(|e| remote_error(format!("{e:#}")))
}

async fn update(api: &CalendarApi, id: &str, event: &Event) -> Result<Reply, RemoteError> {
    let body = event.to_google().map_err(remote_error)?;
    let updated = api.update(id, &body).await?;

    Event::from_google(updated)
        .map(Reply::Event)
        .map_err(|e| remote_error(format!("{e:#}")))
}

async fn delete(api: &CalendarApi, id: &str) -> Result<Reply, RemoteError> {
    match api.delete(id).await {
        Ok(()) => Ok(Reply::Deleted),
        Err(e) if is_gone(&e) => {
            debug!("Event {id} was already deleted");
            Ok(Reply::Deleted)
        }
        Err(e) => Err(e),
    }
}

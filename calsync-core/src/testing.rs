//! Test helpers: event builders and an in-memory remote store.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::error::{CalSyncError, CalSyncResult};
use crate::event::{Event, EventStatus, EventTime};
use crate::remote::store::{
    Batch, BatchResults, CONFLICT, EventQuery, Operation, RemoteError, RemoteStore, Reply,
};

/// A target event on 2025-03-20, 09:00 to 10:00 UTC.
pub fn event(uid: &str, summary: &str) -> Event {
    Event::new(
        uid,
        summary,
        EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap()),
        EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 20, 10, 0, 0).unwrap()),
    )
}

/// An event as listed by a remote, optionally carrying a generated summary.
pub fn remote_event(uid: &str, id: &str, summary: &str, generated: Option<&str>) -> Event {
    let mut e = event(uid, summary);
    e.id = Some(id.to_string());
    if let Some(generated) = generated {
        e.summary = generated.to_string();
        e.record_generated_summary();
        e.summary = summary.to_string();
    }
    e
}

#[derive(Default)]
struct FakeState {
    events: Vec<Event>,
    next_id: usize,
    failing_ids: HashMap<String, RemoteError>,
    failing_lookups: HashMap<String, RemoteError>,
    hidden_uids: HashSet<String>,
    fail_next_round: bool,
    batches: Vec<usize>,
}

/// In-memory remote calendar.
///
/// Deleted events stay behind as cancelled tombstones, inserting a uid that
/// is already stored (tombstones included) fails with 409, and the
/// operations of a batch are applied in reverse queue order.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

impl FakeStore {
    pub fn with_events(events: Vec<Event>) -> Self {
        let store = FakeStore::default();
        store.state.lock().unwrap().events = events;
        store
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    /// Every update or delete of `id` fails with `error`.
    pub fn fail_operations_on(&self, id: &str, error: RemoteError) {
        self.state
            .lock()
            .unwrap()
            .failing_ids
            .insert(id.to_string(), error);
    }

    /// Listing `uid` inside a batch fails with `error`.
    pub fn fail_lookups_of(&self, uid: &str, error: RemoteError) {
        self.state
            .lock()
            .unwrap()
            .failing_lookups
            .insert(uid.to_string(), error);
    }

    /// Listing `uid` inside a batch finds nothing, though inserts still conflict.
    pub fn hide_from_lookups(&self, uid: &str) {
        self.state.lock().unwrap().hidden_uids.insert(uid.to_string());
    }

    /// The next batch fails as a whole, as if the connection dropped.
    pub fn fail_next_round(&self) {
        self.state.lock().unwrap().fail_next_round = true;
    }

    /// Sizes of the batches submitted so far.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().batches.clone()
    }
}

impl FakeState {
    fn position(&self, id: &str) -> Result<usize, RemoteError> {
        if let Some(error) = self.failing_ids.get(id) {
            return Err(error.clone());
        }
        self.events
            .iter()
            .position(|e| e.id.as_deref() == Some(id))
            .ok_or_else(|| RemoteError::new(Some(404), "Not Found"))
    }

    fn apply(&mut self, operation: Operation) -> Result<Reply, RemoteError> {
        match operation {
            Operation::Insert { mut event } => {
                if self.events.iter().any(|e| e.uid.is_some() && e.uid == event.uid) {
                    return Err(RemoteError::new(
                        Some(CONFLICT),
                        "The requested identifier already exists.",
                    ));
                }
                self.next_id += 1;
                event.id = Some(format!("fake-{}", self.next_id));
                self.events.push(event.clone());
                Ok(Reply::Event(event))
            }
            Operation::Update { id, mut event } => {
                let index = self.position(&id)?;
                event.id = Some(id);
                self.events[index] = event.clone();
                Ok(Reply::Event(event))
            }
            Operation::Delete { id } => {
                let index = self.position(&id)?;
                let stored = &mut self.events[index];
                if stored.is_cancelled() {
                    return Err(RemoteError::new(Some(410), "Resource has been deleted"));
                }
                stored.status = EventStatus::Cancelled;
                Ok(Reply::Deleted)
            }
            Operation::List { query } => {
                if let Some(uid) = &query.uid {
                    if let Some(error) = self.failing_lookups.get(uid) {
                        return Err(error.clone());
                    }
                    if self.hidden_uids.contains(uid) {
                        return Ok(Reply::Events(Vec::new()));
                    }
                }
                Ok(Reply::Events(self.list(&query)))
            }
        }
    }

    fn list(&self, query: &EventQuery) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn list_events(&self, query: &EventQuery) -> CalSyncResult<Vec<Event>> {
        Ok(self.state.lock().unwrap().list(query))
    }

    async fn execute(&self, batch: Batch) -> CalSyncResult<BatchResults> {
        let mut state = self.state.lock().unwrap();
        state.batches.push(batch.len());

        if state.fail_next_round {
            state.fail_next_round = false;
            return Err(CalSyncError::Provider("connection reset by peer".into()));
        }

        let mut results = BatchResults::new();
        for queued in batch.into_operations().into_iter().rev() {
            results.insert(queued.id, state.apply(queued.operation));
        }
        Ok(results)
    }
}

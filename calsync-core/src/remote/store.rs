//! Abstraction over a remote calendar that accepts batches of operations.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date_range::TimeWindow;
use crate::error::CalSyncResult;
use crate::event::Event;

/// HTTP-style status a remote uses for "this uid already exists".
pub const CONFLICT: u16 = 409;

/// Filter for listing remote events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_min: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_max: Option<DateTime<Utc>>,
    /// Only events with this uid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Include cancelled events (tombstones).
    #[serde(default)]
    pub show_deleted: bool,
}

impl EventQuery {
    pub fn in_window(window: &TimeWindow) -> Self {
        EventQuery {
            time_min: Some(window.from),
            time_max: Some(window.to),
            ..Default::default()
        }
    }

    pub fn by_uid(uid: impl Into<String>) -> Self {
        EventQuery {
            uid: Some(uid.into()),
            ..Default::default()
        }
    }

    pub fn show_deleted(mut self, show_deleted: bool) -> Self {
        self.show_deleted = show_deleted;
        self
    }

    /// Whether `event` passes this filter.
    pub fn matches(&self, event: &Event) -> bool {
        if !self.show_deleted && event.is_cancelled() {
            return false;
        }
        if let Some(uid) = &self.uid {
            if event.uid.as_ref() != Some(uid) {
                return false;
            }
        }

        // Overlap with [time_min, time_max)
        let start = event.start.to_utc();
        let end = event.end.to_utc().or(start);
        if let (Some(time_min), Some(end)) = (self.time_min, end) {
            if end <= time_min {
                return false;
            }
        }
        if let (Some(time_max), Some(start)) = (self.time_max, start) {
            if start >= time_max {
                return false;
            }
        }
        true
    }
}

/// A single request against the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Insert { event: Event },
    Update { id: String, event: Event },
    Delete { id: String },
    List { query: EventQuery },
}

/// Successful outcome of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reply", content = "data", rename_all = "snake_case")]
pub enum Reply {
    Event(Event),
    Events(Vec<Event>),
    Deleted,
}

/// Error reported by the remote for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// HTTP-style status code, when the remote gave one.
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        RemoteError {
            code,
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.code == Some(CONFLICT)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

pub type OperationId = usize;

/// An operation queued under an id, so its result can be found again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub id: OperationId,
    pub operation: Operation,
}

/// Result of one queued operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub id: OperationId,
    pub result: Result<Reply, RemoteError>,
}

/// Operations submitted to the remote together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    operations: Vec<QueuedOperation>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an operation and return the id its result will carry.
    pub fn queue(&mut self, operation: Operation) -> OperationId {
        let id = self.operations.len();
        self.operations.push(QueuedOperation { id, operation });
        id
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn into_operations(self) -> Vec<QueuedOperation> {
        self.operations
    }
}

/// Results of a batch, keyed by operation id. Arrival order carries no meaning.
pub type BatchResults = HashMap<OperationId, Result<Reply, RemoteError>>;

/// A remote calendar.
///
/// `execute` is one round trip: it returns once every queued operation has a
/// result. The remote may run the operations of a batch in any order.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List events right away, outside of any batch.
    async fn list_events(&self, query: &EventQuery) -> CalSyncResult<Vec<Event>>;

    /// Submit a batch. An `Err` means the whole round failed to run.
    async fn execute(&self, batch: Batch) -> CalSyncResult<BatchResults>;
}

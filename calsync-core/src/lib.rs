//! Core library for calsync.
//!
//! Reconciles a list of target events against a remote calendar:
//! - `diff` matches events by uid, merges manual title edits and plans changes
//! - `sync` fetches remote state and executes the plan in batched rounds
//! - `remote` talks to provider binaries over a JSON protocol

pub mod config;
pub mod constants;
pub mod date_range;
pub mod diff;
pub mod error;
pub mod event;
pub mod remote;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CalendarProfile, SyncConfig};
pub use date_range::{DateRange, TimeWindow};
pub use diff::{DiffKind, EventDiff, SyncPlan};
pub use error::{CalSyncError, CalSyncResult};
pub use event::{Event, EventStatus, EventTime};
pub use remote::Remote;
pub use remote::store::RemoteStore;
pub use sync::{OperationKind, OperationOutcome, OutcomeStatus, SyncReport};

//! Matching, title merging and planning of remote changes.

mod diff_kind;
mod event_diff;
pub mod matching;
pub mod merge;
mod plan;

pub use diff_kind::DiffKind;
pub use event_diff::EventDiff;
pub use matching::EventMatches;
pub use merge::merge_summary;
pub use plan::{PlannedUpdate, SyncPlan};

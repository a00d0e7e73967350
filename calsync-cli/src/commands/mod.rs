pub mod calendars;
pub mod plan;
pub mod sync;

/// Number of days synced when no end date is given.
pub const DEFAULT_SYNC_DAYS: u64 = 90;

/// Upper bound on executor rounds: submit, resolve conflicts, apply recovered updates.
pub const MAX_ROUNDS: usize = 3;

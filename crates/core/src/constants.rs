/// Primary key of the singleton goal row.
pub const GOAL_ID: i32 = 1;

/// Minor units (cents) per major currency unit.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Default lifetime of a remembered webhook event id.
pub const DEFAULT_DEDUP_TTL_SECS: u64 = 24 * 60 * 60;

/// Default upper bound on remembered webhook event ids.
pub const DEFAULT_DEDUP_CAPACITY: usize = 10_000;

//! Goal change events.
//!
//! Provides the notifier trait that goal mutations publish through, and the
//! implementations used in the server and in tests. Viewers subscribe to the
//! notifier to receive snapshots as they change.

mod broadcast;
mod sink;

pub use broadcast::*;
pub use sink::*;

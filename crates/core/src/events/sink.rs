//! Goal change notifier trait and test implementations.

use std::sync::{Arc, Mutex};

use futures::stream::{self, BoxStream, StreamExt};

use crate::goals::GoalRecord;

/// Fans out goal snapshots to live viewers.
///
/// # Design Rules
///
/// - `publish()` must be fast and non-blocking (no network calls, no DB writes)
/// - Delivery is best-effort: a viewer that is not subscribed at publish time
///   misses the snapshot and catches up through its initial read
/// - Dropping a stream returned by `subscribe()` deregisters that viewer
pub trait GoalChangeNotifier: Send + Sync {
    /// Broadcast a new snapshot to every current subscriber.
    fn publish(&self, snapshot: GoalRecord);

    /// Stream of snapshots published after this call.
    fn subscribe(&self) -> BoxStream<'static, GoalRecord>;
}

/// No-op implementation for contexts that don't need live updates.
#[derive(Clone, Default)]
pub struct NoOpGoalChangeNotifier;

impl GoalChangeNotifier for NoOpGoalChangeNotifier {
    fn publish(&self, _snapshot: GoalRecord) {}

    fn subscribe(&self) -> BoxStream<'static, GoalRecord> {
        stream::pending().boxed()
    }
}

/// Mock notifier for testing - collects published snapshots.
#[derive(Clone, Default)]
pub struct MockGoalChangeNotifier {
    published: Arc<Mutex<Vec<GoalRecord>>>,
}

impl MockGoalChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected snapshots.
    pub fn published(&self) -> Vec<GoalRecord> {
        self.published.lock().unwrap().clone()
    }

    /// Returns the number of collected snapshots.
    pub fn len(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    /// Returns true if nothing has been published.
    pub fn is_empty(&self) -> bool {
        self.published.lock().unwrap().is_empty()
    }
}

impl GoalChangeNotifier for MockGoalChangeNotifier {
    fn publish(&self, snapshot: GoalRecord) {
        self.published.lock().unwrap().push(snapshot);
    }

    fn subscribe(&self) -> BoxStream<'static, GoalRecord> {
        stream::pending().boxed()
    }
}

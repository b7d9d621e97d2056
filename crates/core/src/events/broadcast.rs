//! In-process broadcast notifier.
//!
//! Suitable for a single-instance deployment. Viewers connected to another
//! instance would not see these publishes; a multi-instance setup needs an
//! external pub/sub behind the same trait.

use std::sync::{Arc, Mutex};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast;

use super::GoalChangeNotifier;
use crate::goals::GoalRecord;

/// Lightweight broadcast bus that fans out goal snapshots to any connected viewers.
///
/// Snapshots go out in strictly increasing `version` order. Callers publish
/// after their write completes, which can race; a snapshot no newer than the
/// last one sent is dropped.
#[derive(Clone)]
pub struct BroadcastGoalNotifier {
    sender: broadcast::Sender<GoalRecord>,
    last_sent_version: Arc<Mutex<Option<i64>>>,
}

impl BroadcastGoalNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            last_sent_version: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of currently subscribed viewers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl GoalChangeNotifier for BroadcastGoalNotifier {
    fn publish(&self, snapshot: GoalRecord) {
        // Check and send under one lock so two publishers cannot interleave.
        let mut last_sent = self
            .last_sent_version
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if matches!(*last_sent, Some(last) if snapshot.version <= last) {
            log::debug!(
                "Dropping stale goal snapshot v{} (last sent {:?})",
                snapshot.version,
                *last_sent
            );
            return;
        }
        *last_sent = Some(snapshot.version);
        // No subscribers is not an error; the snapshot is simply dropped.
        let _ = self.sender.send(snapshot);
    }

    fn subscribe(&self) -> BoxStream<'static, GoalRecord> {
        let receiver = self.sender.subscribe();
        stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(snapshot) => return Some((snapshot, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // A newer snapshot is still queued, so skipping is lossless for viewers.
                        log::debug!("Goal subscriber lagged, skipped {} snapshots", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

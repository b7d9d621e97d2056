//! Bounded-lifetime memory of applied webhook event ids.
//!
//! Ko-fi redelivers a notification when it does not get a 2xx in time. The
//! same id seen again within the TTL is acknowledged without another increment.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

pub struct SeenEventIds {
    entries: DashMap<String, Instant>,
    ttl: Duration,
    capacity: usize,
}

impl SeenEventIds {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Records `event_id` as in flight. Returns `false` when the id was
    /// already claimed within the TTL.
    pub fn try_claim(&self, event_id: &str) -> bool {
        let now = Instant::now();
        if !self.entries.contains_key(event_id) && self.entries.len() >= self.capacity {
            self.make_room(now);
        }

        match self.entries.entry(event_id.to_string()) {
            Entry::Occupied(mut existing) => {
                if now.duration_since(*existing.get()) >= self.ttl {
                    existing.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
        }
    }

    /// Claims `event_id` for as long as the returned guard lives. Dropping the
    /// guard without [`ClaimGuard::commit`] releases the id again, so an
    /// increment that failed or was cancelled can be redelivered.
    pub fn claim(&self, event_id: &str) -> Option<ClaimGuard<'_>> {
        self.try_claim(event_id).then(|| ClaimGuard {
            seen: self,
            event_id: event_id.to_string(),
            committed: false,
        })
    }

    /// Forgets a claim so a redelivery of the event is applied.
    pub fn release(&self, event_id: &str) {
        self.entries.remove(event_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self, now: Instant) {
        self.entries
            .retain(|_, seen_at| now.duration_since(*seen_at) < self.ttl);

        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| *entry.value())
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    log::warn!("Webhook dedup set full, evicting oldest event id");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

/// An in-flight claim on an event id.
pub struct ClaimGuard<'a> {
    seen: &'a SeenEventIds,
    event_id: String,
    committed: bool,
}

impl ClaimGuard<'_> {
    /// Keeps the id remembered for the rest of its TTL.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            log::debug!("Releasing uncommitted claim on webhook event {}", self.event_id);
            self.seen.release(&self.event_id);
        }
    }
}

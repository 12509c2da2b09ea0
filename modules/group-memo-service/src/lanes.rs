//! Channel lane serialization
//!
//! Mutating memo commands hold their channel's lane for the duration of the
//! command, so a mutation and the list it renders afterwards are never
//! interleaved with another mutation in the same channel. Different channels
//! never wait on each other.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Holding a lane longer than this is logged
const LANE_HOLD_WARNING_SECS: u64 = 10;

/// Guard that releases the channel lane when dropped
pub struct ChannelLaneGuard {
    channel_id: String,
    _permit: OwnedSemaphorePermit,
    acquired_at: Instant,
    manager: Arc<ChannelLaneManager>,
}

impl Drop for ChannelLaneGuard {
    fn drop(&mut self) {
        let held = self.acquired_at.elapsed();
        if held.as_secs() > LANE_HOLD_WARNING_SECS {
            log::warn!(
                "Channel {} lane held for {} seconds (unusually long)",
                self.channel_id,
                held.as_secs()
            );
        }
        self.manager
            .last_used
            .insert(self.channel_id.clone(), Instant::now());
    }
}

/// One single-permit semaphore per channel
pub struct ChannelLaneManager {
    lanes: DashMap<String, Arc<Semaphore>>,
    last_used: DashMap<String, Instant>,
}

impl ChannelLaneManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lanes: DashMap::new(),
            last_used: DashMap::new(),
        })
    }

    /// Wait for exclusive access to a channel's memo list.
    pub async fn acquire(self: &Arc<Self>, channel_id: &str) -> ChannelLaneGuard {
        loop {
            let semaphore = self.get_or_create_lane(channel_id);
            if let Some(guard) = self.enter_lane(channel_id, semaphore).await {
                return guard;
            }
            log::debug!("Channel {} lane was pruned while waiting, retrying", channel_id);
        }
    }

    /// Take the permit of `semaphore`, then make sure it is still the
    /// channel's lane. A lane pruned in between is no longer exclusive.
    async fn enter_lane(
        self: &Arc<Self>,
        channel_id: &str,
        semaphore: Arc<Semaphore>,
    ) -> Option<ChannelLaneGuard> {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("Semaphore should not be closed");

        let current = self
            .lanes
            .get(channel_id)
            .is_some_and(|lane| Arc::ptr_eq(lane.value(), &semaphore));
        if !current {
            return None;
        }

        Some(ChannelLaneGuard {
            channel_id: channel_id.to_string(),
            _permit: permit,
            acquired_at: Instant::now(),
            manager: Arc::clone(self),
        })
    }

    #[cfg(test)]
    pub fn is_channel_busy(&self, channel_id: &str) -> bool {
        self.lanes
            .get(channel_id)
            .map(|s| s.available_permits() == 0)
            .unwrap_or(false)
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Drop lanes that are free and have been idle longer than `idle_for`.
    pub fn prune_idle_lanes(&self, idle_for: Duration) {
        let now = Instant::now();
        let stale: Vec<String> = self
            .last_used
            .iter()
            .filter(|e| now.duration_since(*e.value()) > idle_for)
            .map(|e| e.key().clone())
            .collect();

        for key in stale {
            // Only remove if not currently in use
            let removed = self
                .lanes
                .remove_if(&key, |_, lane| lane.available_permits() > 0)
                .is_some();
            if removed {
                self.last_used.remove(&key);
            }
        }
    }

    fn get_or_create_lane(&self, channel_id: &str) -> Arc<Semaphore> {
        self.lanes
            .entry(channel_id.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone()
    }
}

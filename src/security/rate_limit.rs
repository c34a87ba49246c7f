//! Per-client sliding-window rate limiting.
//!
//! Each client key owns the timestamps of its requests inside the trailing
//! window. Stale timestamps are pruned lazily when that key is checked
//! again. Every check records a timestamp, including checks that end up
//! rejected, so a client hammering past its ceiling keeps paying for it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Default lookback window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

/// Default ceiling per client key per window.
pub const DEFAULT_MAX_REQUESTS: usize = 30;

/// Outcome of one rate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Timestamps held for the key after this check, this one included.
    pub count: usize,
    /// How long until one more request would be accepted. `None` when allowed.
    pub retry_after: Option<Duration>,
}

/// Sliding-window limiter keyed by client identity.
///
/// The map is sharded, so the prune/append/count sequence for one key runs
/// under that key's shard guard without serializing unrelated keys.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    log: DashMap<String, VecDeque<u64>>,
    window_ms: u64,
    max_requests: usize,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            log: DashMap::new(),
            window_ms: window.as_millis() as u64,
            max_requests,
        }
    }

    /// Record a request for `key` at the current wall-clock time.
    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, now_millis())
    }

    /// Record a request for `key` at `now_ms` (milliseconds since the epoch).
    pub fn check_at(&self, key: &str, now_ms: u64) -> RateDecision {
        let cutoff = now_ms.saturating_sub(self.window_ms);

        let mut entry = self.log.entry(key.to_owned()).or_default();
        let timestamps = entry.value_mut();
        prune(timestamps, cutoff);
        timestamps.push_back(now_ms);

        let count = timestamps.len();
        if count <= self.max_requests {
            return RateDecision {
                allowed: true,
                count,
                retry_after: None,
            };
        }

        // The oldest timestamp that must expire before the key drops back
        // under the ceiling.
        let blocking = timestamps
            .get(count - self.max_requests)
            .copied()
            .unwrap_or(now_ms);
        let reopens_at = blocking + self.window_ms;
        RateDecision {
            allowed: false,
            count,
            retry_after: Some(Duration::from_millis(reopens_at.saturating_sub(now_ms))),
        }
    }

    /// Number of timestamps currently held for `key`, without pruning.
    pub fn recorded(&self, key: &str) -> usize {
        self.log.get(key).map(|t| t.len()).unwrap_or(0)
    }

    /// Number of client keys currently held in memory.
    pub fn tracked_keys(&self) -> usize {
        self.log.len()
    }

    /// Drop keys whose timestamps have all left the window.
    pub fn sweep(&self) -> usize {
        self.sweep_at(now_millis())
    }

    /// Drop keys whose timestamps have all left the window as of `now_ms`.
    ///
    /// Returns the number of keys removed.
    pub fn sweep_at(&self, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(self.window_ms);
        let before = self.log.len();
        self.log.retain(|_, timestamps| {
            prune(timestamps, cutoff);
            !timestamps.is_empty()
        });
        before.saturating_sub(self.log.len())
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX_REQUESTS)
    }
}

/// Periodically sweep stale keys until shutdown is signalled.
pub fn spawn_sweeper(
    limiter: Arc<SlidingWindowLimiter>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = limiter.sweep();
                    tracing::debug!(
                        removed,
                        remaining = limiter.tracked_keys(),
                        "Swept idle rate limit keys"
                    );
                    crate::observability::metrics::set_tracked_clients(limiter.tracked_keys());
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate limit sweeper stopping");
                    break;
                }
            }
        }
    })
}

/// Timestamps are chronological, so stale ones sit at the front.
fn prune(timestamps: &mut VecDeque<u64>, cutoff: u64) {
    while timestamps.front().is_some_and(|&ts| ts <= cutoff) {
        timestamps.pop_front();
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

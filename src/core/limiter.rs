use std::time::{Duration, Instant};
use tracing::debug;

/// Fixed interval gate in front of the network.
///
/// `try_acquire` takes `&mut self`, so the check and the timestamp update are
/// a single step for whoever owns the limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_acquired: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_acquired: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_acquired(&self) -> Option<Instant> {
        self.last_acquired
    }

    /// Returns true and records `now` if at least `interval` has passed since
    /// the last successful acquisition. Leaves state untouched otherwise.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_acquired {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.interval {
                debug!(?elapsed, interval = ?self.interval, "Rate limit gate closed");
                return false;
            }
        }
        // Never move the timestamp backwards
        self.last_acquired = Some(self.last_acquired.map_or(now, |last| last.max(now)));
        true
    }
}

use crate::cache::WindowStore;
use crate::clock::{Clock, SystemClock};
use crate::errors::Result;
use crate::rate_limit::limiter::{Decision, Limiter};
use crate::rate_limit::policy::MethodQuota;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Sliding window limiter over a plain key-value store.
///
/// Each key maps to the timestamps of its accepted requests. A check reads
/// the list, drops entries at least `window` old, and either rejects (list
/// full, nothing written) or appends `now` and writes the list back with a
/// TTL of one window. The read-modify-write is not atomic: two requests
/// racing at the quota boundary can both be admitted.
pub struct SlidingWindowLimiter {
    store: Arc<dyn WindowStore>,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowLimiter {
    pub fn new(store: Arc<dyn WindowStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn WindowStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Timestamps under `key` still inside the window ending at `now`
    async fn live_timestamps(&self, key: &str, window: Duration, now: f64) -> Result<Vec<f64>> {
        let window = window.as_secs_f64();
        let stored = self.store.get(key).await?.unwrap_or_default();

        Ok(stored.into_iter().filter(|t| now - t < window).collect())
    }

    /// Get current count without recording a request
    pub async fn current_count(&self, key: &str, window: Duration) -> Result<u64> {
        let now = self.clock.now();
        Ok(self.live_timestamps(key, window, now).await?.len() as u64)
    }

    /// Forget every recorded request for a key
    pub async fn reset(&self, key: &str) -> Result<()> {
        self.store.delete(key).await?;

        tracing::info!(key = %key, "Rate limit reset");

        Ok(())
    }
}

#[async_trait]
impl Limiter for SlidingWindowLimiter {
    async fn admit(&self, key: &str, quota: &MethodQuota) -> Result<Decision> {
        let now = self.clock.now();
        let mut timestamps = self.live_timestamps(key, quota.window, now).await?;
        let current = timestamps.len() as u64;

        if current >= quota.max_requests {
            let oldest = timestamps.iter().copied().fold(now, f64::min);
            let remaining = (oldest + quota.window.as_secs_f64() - now).max(0.0);

            tracing::debug!(key = %key, current = %current, "Sliding window full");

            return Ok(Decision::reject(
                quota.max_requests,
                current,
                Duration::try_from_secs_f64(remaining).unwrap_or(quota.window),
            ));
        }

        timestamps.push(now);
        self.store.set(key, &timestamps, quota.window).await?;

        Ok(Decision::allow(quota.max_requests, current + 1))
    }
}

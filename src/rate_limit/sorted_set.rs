use crate::clock::{Clock, SystemClock};
use crate::errors::Result;
use crate::rate_limit::limiter::{Decision, Limiter};
use crate::rate_limit::policy::MethodQuota;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::{aio::ConnectionManager, Script};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Prune, count and conditionally record in one server-side step.
// Scores are timestamps; an entry stays live while score > now - window.
static ADMIT_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local key = KEYS[1]
        local now = ARGV[1]
        local window_start = ARGV[2]
        local limit = tonumber(ARGV[3])
        local member = ARGV[4]
        local ttl = tonumber(ARGV[5])

        redis.call('ZREMRANGEBYSCORE', key, '-inf', window_start)

        local current = redis.call('ZCARD', key)

        if current < limit then
            redis.call('ZADD', key, now, member)
            redis.call('EXPIRE', key, ttl)
            return {1, current + 1, ''}
        end

        local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
        local oldest_score = ''
        if #oldest > 0 then
            oldest_score = oldest[2]
        end

        return {0, current, oldest_score}
        "#,
    )
});

/// Sliding window limiter using an atomic Redis sorted-set script.
///
/// Same admission rule as [`SlidingWindowLimiter`](super::SlidingWindowLimiter)
/// but without its boundary race, since Redis runs the script serially.
pub struct AtomicRedisLimiter {
    redis: ConnectionManager,
    clock: Arc<dyn Clock>,
    sequence: AtomicU64,
}

impl AtomicRedisLimiter {
    pub fn new(redis: ConnectionManager) -> Self {
        Self::with_clock(redis, Arc::new(SystemClock))
    }

    pub fn with_clock(redis: ConnectionManager, clock: Arc<dyn Clock>) -> Self {
        Self {
            redis,
            clock,
            sequence: AtomicU64::new(0),
        }
    }

    /// Unique set member so requests in the same microsecond are not merged
    fn member(&self, now: f64) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{:.6}-{}-{}", now, std::process::id(), seq)
    }

    pub async fn reset(&self, key: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        let _: () = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;

        tracing::info!(key = %key, "Rate limit reset");

        Ok(())
    }
}

fn expire_seconds(window: Duration) -> u64 {
    window
        .as_secs()
        .saturating_add(u64::from(window.subsec_nanos() > 0))
        .max(1)
}

#[async_trait]
impl Limiter for AtomicRedisLimiter {
    async fn admit(&self, key: &str, quota: &MethodQuota) -> Result<Decision> {
        let now = self.clock.now();
        let window = quota.window.as_secs_f64();
        let window_start = now - window;

        let mut conn = self.redis.clone();
        let (allowed, current, oldest): (i64, u64, String) = ADMIT_SCRIPT
            .key(key)
            .arg(format!("{:.6}", now))
            .arg(format!("{:.6}", window_start))
            .arg(quota.max_requests)
            .arg(self.member(now))
            .arg(expire_seconds(quota.window))
            .invoke_async(&mut conn)
            .await?;

        tracing::debug!(
            key = %key,
            allowed = %(allowed == 1),
            current = %current,
            "Rate limit check result"
        );

        if allowed == 1 {
            return Ok(Decision::allow(quota.max_requests, current));
        }

        let oldest = oldest.parse::<f64>().unwrap_or(now);
        let remaining = (oldest + window - now).max(0.0);

        Ok(Decision::reject(
            quota.max_requests,
            current,
            Duration::try_from_secs_f64(remaining).unwrap_or(quota.window),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedisConfig;

    async fn limiter() -> AtomicRedisLimiter {
        let config = RedisConfig {
            enabled: true,
            url: "redis://localhost:6379".to_string(),
        };
        let redis = crate::cache::create_client(&config).await.unwrap();
        AtomicRedisLimiter::new(redis)
    }

    #[test]
    fn test_expire_seconds() {
        assert_eq!(expire_seconds(Duration::from_secs(60)), 60);
        assert_eq!(expire_seconds(Duration::from_millis(100)), 1);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_atomic_limit_exceeded() {
        let limiter = limiter().await;
        let key = "test:sorted_set:exceeded";
        let quota = MethodQuota::new(3, Duration::from_secs(60));

        limiter.reset(key).await.unwrap();

        for i in 1..=3 {
            let decision = limiter.admit(key, &quota).await.unwrap();
            assert!(decision.allowed, "Request {} should be allowed", i);
            assert_eq!(decision.current, i);
        }

        let decision = limiter.admit(key, &quota).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.current, 3);
        assert!(decision.retry_after_secs().is_some());

        limiter.reset(key).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_atomic_concurrent_checks_respect_quota() {
        let limiter = Arc::new(limiter().await);
        let key = "test:sorted_set:concurrent";
        let quota = MethodQuota::new(5, Duration::from_secs(60));

        limiter.reset(key).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.admit(key, &quota).await.unwrap().allowed
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 5);

        limiter.reset(key).await.unwrap();
    }
}

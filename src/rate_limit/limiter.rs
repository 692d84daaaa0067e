use crate::errors::Result;
use crate::rate_limit::policy::MethodQuota;
use async_trait::async_trait;
use std::time::Duration;

/// Admission decision for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// The quota (max requests per window)
    pub limit: u64,
    /// Requests recorded in the window after this decision
    pub current: u64,
    /// Time until the oldest recorded request leaves the window (rejections only)
    pub retry_after: Option<Duration>,
}

impl Decision {
    pub fn allow(limit: u64, current: u64) -> Self {
        Self {
            allowed: true,
            limit,
            current,
            retry_after: None,
        }
    }

    pub fn reject(limit: u64, current: u64, retry_after: Duration) -> Self {
        Self {
            allowed: false,
            limit,
            current,
            retry_after: Some(retry_after),
        }
    }

    /// Whole seconds for a `Retry-After` header, never below one
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after
            .map(|d| d.as_secs().saturating_add(u64::from(d.subsec_nanos() > 0)).max(1))
    }
}

/// Admission control over a keyed request window
#[async_trait]
pub trait Limiter: Send + Sync {
    /// Decide whether one more request under `key` fits in `quota`,
    /// recording it when it does
    async fn admit(&self, key: &str, quota: &MethodQuota) -> Result<Decision>;
}

use crate::config::RateLimitConfig;
use crate::errors::{AppError, Result};
use axum::http::Method;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Longest window a quota may use, one day
pub const MAX_WINDOW_SECONDS: u64 = 86_400;

/// What to do with a request when the window store cannot be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Admit the request as if no history existed
    #[default]
    Open,
    /// Answer 503
    Closed,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Open => "open",
            FailurePolicy::Closed => "closed",
        }
    }
}

/// Which admission algorithm backs the limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Read, prune, append and write back a timestamp list
    #[default]
    SlidingLog,
    /// Single server-side script over a Redis sorted set
    AtomicSortedSet,
}

/// Quota applied to one HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodQuota {
    pub max_requests: u64,
    pub window: Duration,
}

impl MethodQuota {
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Immutable rate limiting policy, built once at startup
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    quotas: HashMap<Method, MethodQuota>,
    exempt_prefixes: Vec<String>,
    trust_forwarded_header: bool,
    on_cache_error: FailurePolicy,
    key_prefix: String,
    emit_retry_after: bool,
}

impl RateLimitPolicy {
    /// Build and validate a policy from configuration
    pub fn from_config(config: &RateLimitConfig) -> Result<Self> {
        let mut quotas = HashMap::with_capacity(config.methods.len());

        for (name, quota) in &config.methods {
            let method = Method::from_bytes(name.to_ascii_uppercase().as_bytes())
                .map_err(|_| AppError::InvalidPolicy(format!("unknown HTTP method {:?}", name)))?;

            if quota.max_requests == 0 {
                return Err(AppError::InvalidPolicy(format!(
                    "{} quota must allow at least one request",
                    method
                )));
            }
            if quota.window_seconds == 0 || quota.window_seconds > MAX_WINDOW_SECONDS {
                return Err(AppError::InvalidPolicy(format!(
                    "{} window must be between 1 and {} seconds",
                    method, MAX_WINDOW_SECONDS
                )));
            }

            quotas.insert(
                method,
                MethodQuota::new(quota.max_requests, Duration::from_secs(quota.window_seconds)),
            );
        }

        if let Some(prefix) = config.exempt_prefixes.iter().find(|p| !p.starts_with('/')) {
            return Err(AppError::InvalidPolicy(format!(
                "exempt prefix {:?} must start with '/'",
                prefix
            )));
        }

        if config.key_prefix.is_empty() {
            return Err(AppError::InvalidPolicy("key prefix must not be empty".to_string()));
        }

        Ok(Self {
            quotas,
            exempt_prefixes: config.exempt_prefixes.clone(),
            trust_forwarded_header: config.trust_forwarded_header,
            on_cache_error: config.on_cache_error,
            key_prefix: config.key_prefix.clone(),
            emit_retry_after: config.emit_retry_after,
        })
    }

    /// Paths under an exempt prefix bypass limiting entirely
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Quota for a method, `None` when the method is never limited
    pub fn quota_for(&self, method: &Method) -> Option<MethodQuota> {
        self.quotas.get(method).copied()
    }

    pub fn cache_key(&self, method: &Method, client: &str) -> String {
        format!("{}:{}:{}", self.key_prefix, method, client)
    }

    pub fn trust_forwarded_header(&self) -> bool {
        self.trust_forwarded_header
    }

    pub fn on_cache_error(&self) -> FailurePolicy {
        self.on_cache_error
    }

    pub fn emit_retry_after(&self) -> bool {
        self.emit_retry_after
    }
}

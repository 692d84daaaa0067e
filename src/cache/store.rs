use crate::errors::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache holding request timestamp sequences with expiry.
///
/// Single-key `get` and `set` must be safe to call concurrently; nothing
/// stronger is assumed. Callers treat a missing or expired key as an
/// empty sequence.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Fetch the stored sequence, `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<f64>>>;

    /// Overwrite the sequence; it expires `ttl` after this write
    async fn set(&self, key: &str, timestamps: &[f64], ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Backend reachability probe
    async fn ping(&self) -> Result<()>;
}

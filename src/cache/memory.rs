use crate::cache::store::WindowStore;
use crate::clock::{Clock, SystemClock};
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

struct Entry {
    timestamps: Vec<f64>,
    expires_at: f64,
}

/// Process-local window store.
///
/// Expiry is judged against the injected clock, so a store sharing a
/// `ManualClock` with the limiter expires entries exactly when the test
/// advances time. Expired entries are dropped on read and by `purge_expired`.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Remove every expired entry, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<f64>>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.timestamps.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, timestamps: &[f64], ttl: Duration) -> Result<()> {
        let expires_at = self.clock.now() + ttl.as_secs_f64();
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                timestamps: timestamps.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

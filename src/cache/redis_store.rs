use crate::cache::store::WindowStore;
use crate::{config::RedisConfig, errors::Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::time::Duration;

/// Create a Redis client and connection manager
pub async fn create_client(config: &RedisConfig) -> Result<ConnectionManager> {
    tracing::info!("Creating Redis client");

    let client = Client::open(config.url.as_str())?;

    let manager = ConnectionManager::new(client).await?;

    tracing::info!("Redis client connected");

    Ok(manager)
}

/// Health check for Redis connection
pub async fn health_check(manager: &mut ConnectionManager) -> Result<()> {
    let _: String = redis::cmd("PING").query_async(manager).await?;
    Ok(())
}

/// Window store backed by Redis string keys holding JSON arrays
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

/// Redis expiries are whole seconds; round up so a window is never cut short
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
    secs.max(1)
}

#[async_trait]
impl WindowStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<f64>>> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn.get(key).await?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, timestamps: &[f64], ttl: Duration) -> Result<()> {
        let mut conn = self.manager.clone();
        let value = serde_json::to_string(timestamps)?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        health_check(&mut conn).await
    }
}

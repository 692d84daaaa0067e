use crate::cache::WindowStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub cache: ComponentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: String,
    pub backend: String,
    pub message: Option<String>,
}

pub struct HealthChecker {
    store: Arc<dyn WindowStore>,
    backend: &'static str,
}

impl HealthChecker {
    pub fn new(store: Arc<dyn WindowStore>, backend: &'static str) -> Self {
        Self { store, backend }
    }

    /// Liveness check - is the service running?
    pub async fn liveness(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: HealthChecks {
                cache: ComponentStatus {
                    status: "unknown".to_string(),
                    backend: self.backend.to_string(),
                    message: None,
                },
            },
        }
    }

    /// Readiness check - can the limiter reach its window store?
    pub async fn readiness(&self) -> HealthStatus {
        let cache = self.check_cache().await;
        let status = if cache.status == "ok" { "ok" } else { "degraded" };

        HealthStatus {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: HealthChecks { cache },
        }
    }

    async fn check_cache(&self) -> ComponentStatus {
        match self.store.ping().await {
            Ok(_) => ComponentStatus {
                status: "ok".to_string(),
                backend: self.backend.to_string(),
                message: None,
            },
            Err(e) => ComponentStatus {
                status: "error".to_string(),
                backend: self.backend.to_string(),
                message: Some(format!("Cache check failed: {}", e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    #[tokio::test]
    async fn test_memory_store_is_ready() {
        let checker = HealthChecker::new(Arc::new(MemoryStore::new()), "memory");

        let status = checker.readiness().await;
        assert_eq!(status.status, "ok");
        assert_eq!(status.checks.cache.backend, "memory");

        let status = checker.liveness().await;
        assert_eq!(status.checks.cache.status, "unknown");
    }
}

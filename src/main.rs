use parco_shield::{
    api::create_router,
    cache::{create_client, MemoryStore, RedisStore, WindowStore},
    config::Config,
    observability::{init_tracing, HealthChecker},
    rate_limit::{Algorithm, AtomicRedisLimiter, Limiter, SlidingWindowLimiter},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config.observability);

    tracing::info!("Starting Parco Shield");
    tracing::info!("Configuration loaded: {:?}", config.server);

    if config.rate_limit.trust_forwarded_header {
        tracing::warn!("Trusting X-Forwarded-For; clients can spoof it unless a proxy rewrites it");
    }

    let (store, limiter, backend): (Arc<dyn WindowStore>, Arc<dyn Limiter>, &'static str) =
        if config.redis.enabled {
            let manager = create_client(&config.redis).await?;
            tracing::info!("Redis connection established");

            let store: Arc<dyn WindowStore> = Arc::new(RedisStore::new(manager.clone()));
            let limiter: Arc<dyn Limiter> = match config.rate_limit.algorithm {
                Algorithm::AtomicSortedSet => Arc::new(AtomicRedisLimiter::new(manager)),
                Algorithm::SlidingLog => Arc::new(SlidingWindowLimiter::new(store.clone())),
            };
            (store, limiter, "redis")
        } else {
            let memory = Arc::new(MemoryStore::new());
            spawn_purge_task(
                memory.clone(),
                Duration::from_secs(config.rate_limit.purge_interval_seconds.max(1)),
            );

            let store: Arc<dyn WindowStore> = memory;
            let limiter: Arc<dyn Limiter> = Arc::new(SlidingWindowLimiter::new(store.clone()));
            (store, limiter, "memory")
        };

    tracing::info!(
        backend = backend,
        algorithm = ?config.rate_limit.algorithm,
        on_cache_error = ?config.rate_limit.on_cache_error,
        "Rate limiter ready"
    );

    let health_checker = Arc::new(HealthChecker::new(store, backend));
    let app = create_router(&config, limiter, health_checker)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

/// Drop expired windows so idle clients do not accumulate in memory
fn spawn_purge_task(store: Arc<MemoryStore>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Purged expired rate windows");
            }
        }
    });
}

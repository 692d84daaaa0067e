use crate::{
    api::health,
    config::Config,
    errors::Result,
    observability::HealthChecker,
    rate_limit::{rate_limit_middleware, Limiter, RateLimitPolicy, RateLimitState},
    security_headers::{security_headers_middleware, SecurityHeaders},
};
use axum::{middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub health_checker: Arc<HealthChecker>,
}

/// Assemble the site router.
///
/// Layer order, outermost first: security headers, trace, rate limit.
/// Security headers therefore also land on 429 and 503 responses.
pub fn create_router(
    config: &Config,
    limiter: Arc<dyn Limiter>,
    health_checker: Arc<HealthChecker>,
) -> Result<Router> {
    let policy = RateLimitPolicy::from_config(&config.rate_limit)?;
    let rate_limit_state = Arc::new(RateLimitState::new(
        policy,
        limiter,
        config.i18n.default_language,
    ));
    let security_headers = Arc::new(SecurityHeaders::from_config(&config.security_headers)?);

    let state = AppState { health_checker };

    let mut router = Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    if config.observability.metrics_enabled {
        router = router.route("/metrics", get(health::metrics));
    }

    let router = router
        .nest_service("/static", ServeDir::new(&config.server.static_dir))
        .nest_service("/media", ServeDir::new(&config.server.media_dir))
        .fallback_service(ServeDir::new(&config.server.public_dir))
        .with_state(state)
        .layer(from_fn_with_state(rate_limit_state, rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(
            security_headers,
            security_headers_middleware,
        ));

    Ok(router)
}

use crate::errors::AppError;
use crate::observability::MetricsRecorder;
use crate::rate_limit::client_ip::resolve_client_ip;
use crate::rate_limit::limiter::{Decision, Limiter};
use crate::rate_limit::messages::Language;
use crate::rate_limit::policy::{FailurePolicy, RateLimitPolicy};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state of the rate limiting middleware
pub struct RateLimitState {
    pub policy: RateLimitPolicy,
    pub limiter: Arc<dyn Limiter>,
    pub default_language: Language,
}

impl RateLimitState {
    pub fn new(
        policy: RateLimitPolicy,
        limiter: Arc<dyn Limiter>,
        default_language: Language,
    ) -> Self {
        Self {
            policy,
            limiter,
            default_language,
        }
    }
}

/// Per-method, per-client admission control.
///
/// Exempt paths and unlimited methods pass straight through. The peer
/// address comes from `ConnectInfo` when the server provides it.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimitState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.policy.is_exempt(request.uri().path()) {
        MetricsRecorder::record_exempt();
        return next.run(request).await;
    }

    let method = request.method().clone();
    let Some(quota) = state.policy.quota_for(&method) else {
        return next.run(request).await;
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = resolve_client_ip(
        request.headers(),
        peer,
        state.policy.trust_forwarded_header(),
    );
    let key = state.policy.cache_key(&method, &client);

    match state.limiter.admit(&key, &quota).await {
        Ok(decision) if decision.allowed => {
            tracing::debug!(
                client = %client,
                method = %method,
                current = %decision.current,
                limit = %decision.limit,
                "Request admitted"
            );
            MetricsRecorder::record_admitted(method.as_str());
            next.run(request).await
        }
        Ok(decision) => {
            tracing::warn!(
                client = %client,
                method = %method,
                limit = %decision.limit,
                current = %decision.current,
                "Rate limit exceeded"
            );
            MetricsRecorder::record_rejected(method.as_str());
            too_many_requests(&state, request.headers(), &decision)
        }
        Err(e) => {
            let policy = state.policy.on_cache_error();
            MetricsRecorder::record_cache_error(policy.as_str());

            match policy {
                FailurePolicy::Open => {
                    tracing::warn!(
                        error = %e,
                        client = %client,
                        "Rate limit store unavailable, admitting request"
                    );
                    next.run(request).await
                }
                FailurePolicy::Closed => {
                    tracing::error!(
                        error = %e,
                        client = %client,
                        "Rate limit store unavailable, refusing request"
                    );
                    AppError::ServiceUnavailable.into_response()
                }
            }
        }
    }
}

/// 429 with a localized plain-text body
fn too_many_requests(
    state: &RateLimitState,
    headers: &HeaderMap,
    decision: &Decision,
) -> Response {
    let language = Language::negotiate(headers, state.default_language);

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CONTENT_LANGUAGE, language.code()),
        ],
        language.too_many_requests(),
    )
        .into_response();

    if state.policy.emit_retry_after() {
        if let Some(seconds) = decision.retry_after_secs() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
    }

    response
}

use crate::config::SecurityHeadersConfig;
use crate::errors::{AppError, Result};
use axum::extract::{Request, State};
use axum::http::{
    header::{self, HeaderName, HeaderValue},
    HeaderMap,
};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

/// Fixed header set stamped on every response
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| AppError::Configuration(format!("invalid {} header value", name)))
}

impl SecurityHeaders {
    pub fn from_config(config: &SecurityHeadersConfig) -> Result<Self> {
        let mut headers = vec![
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
            (
                header::X_FRAME_OPTIONS,
                header_value("X-Frame-Options", &config.frame_options)?,
            ),
            (
                header::X_XSS_PROTECTION,
                HeaderValue::from_static("1; mode=block"),
            ),
            (
                header::REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ),
        ];

        if let Some(csp) = &config.content_security_policy {
            headers.push((
                header::CONTENT_SECURITY_POLICY,
                header_value("Content-Security-Policy", csp)?,
            ));
        }

        if let Some(hsts) = &config.strict_transport_security {
            headers.push((
                header::STRICT_TRANSPORT_SECURITY,
                header_value("Strict-Transport-Security", hsts)?,
            ));
        }

        Ok(Self { headers })
    }

    /// Insert every header, replacing values set by inner handlers
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }
}

pub async fn security_headers_middleware(
    State(headers): State<Arc<SecurityHeaders>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    headers.apply(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_set() {
        let headers = SecurityHeaders::from_config(&SecurityHeadersConfig::default()).unwrap();
        let mut map = HeaderMap::new();
        headers.apply(&mut map);

        assert_eq!(map[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(map[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(map[header::X_XSS_PROTECTION], "1; mode=block");
        assert_eq!(map[header::REFERRER_POLICY], "strict-origin-when-cross-origin");
        assert!(map.get(header::CONTENT_SECURITY_POLICY).is_none());
        assert!(map.get(header::STRICT_TRANSPORT_SECURITY).is_none());
    }

    #[test]
    fn test_optional_headers_and_override() {
        let config = SecurityHeadersConfig {
            frame_options: "DENY".to_string(),
            content_security_policy: Some("default-src 'self'".to_string()),
            strict_transport_security: Some("max-age=31536000".to_string()),
        };
        let headers = SecurityHeaders::from_config(&config).unwrap();

        let mut map = HeaderMap::new();
        map.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("ALLOWALL"));
        headers.apply(&mut map);

        assert_eq!(map[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(map[header::CONTENT_SECURITY_POLICY], "default-src 'self'");
        assert_eq!(map[header::STRICT_TRANSPORT_SECURITY], "max-age=31536000");
        assert_eq!(map.get_all(header::X_FRAME_OPTIONS).iter().count(), 1);
    }

    #[test]
    fn test_invalid_value_rejected() {
        let config = SecurityHeadersConfig {
            frame_options: "SAME\nORIGIN".to_string(),
            ..SecurityHeadersConfig::default()
        };
        assert!(SecurityHeaders::from_config(&config).is_err());
    }
}

use axum::http::HeaderMap;
use std::net::SocketAddr;

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the identity a request is counted against.
///
/// With `trust_forwarded_header` set, the first entry of `X-Forwarded-For`
/// wins. That header is client-controlled unless a reverse proxy rewrites
/// it, so trust must stay off for directly exposed deployments.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_header: bool,
) -> String {
    if trust_forwarded_header {
        if let Some(ip) = forwarded_for(headers) {
            return ip;
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = value.split(',').next()?.trim();

    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.7:51234".parse().unwrap())
    }

    #[test]
    fn test_first_forwarded_entry_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 5.6.6.7"));

        assert_eq!(resolve_client_ip(&headers, peer(), true), "1.2.3.4");
    }

    #[test]
    fn test_forwarded_header_ignored_when_untrusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 5.6.6.7"));

        assert_eq!(resolve_client_ip(&headers, peer(), false), "10.0.0.7");
    }

    #[test]
    fn test_peer_address_without_header() {
        let headers = HeaderMap::new();
        assert_eq!(resolve_client_ip(&headers, peer(), true), "10.0.0.7");
    }

    #[test]
    fn test_blank_forwarded_entry_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" , 5.6.6.7"));

        assert_eq!(resolve_client_ip(&headers, peer(), true), "10.0.0.7");
    }

    #[test]
    fn test_ipv6_peer() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "[2001:db8::1]:443".parse().unwrap();
        assert_eq!(resolve_client_ip(&headers, Some(peer), false), "2001:db8::1");
    }

    #[test]
    fn test_unknown_client() {
        let headers = HeaderMap::new();
        assert_eq!(resolve_client_ip(&headers, None, false), UNKNOWN_CLIENT);
    }
}

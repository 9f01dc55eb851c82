//! Client address resolution for push sessions

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Address reported for a viewer
///
/// The first `X-Forwarded-For` entry wins when a proxy sets one; otherwise the
/// transport peer address is used.
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

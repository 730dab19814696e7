//! Client address extraction.

use std::net::IpAddr;

use axum::http::HeaderMap;

/// Key used when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort client address for rate limiting and audit records.
///
/// Order: first `X-Forwarded-For` entry, `X-Real-IP`, then the socket peer.
/// A header value that is not an IP address is skipped. Only deploy behind a
/// proxy that overwrites these headers.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    header("x-forwarded-for")
        .or_else(|| header("x-real-ip"))
        .or(direct_ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
}

//! Client identity resolution
//!
//! Normalizes the identity the limiter keys on: proxy-forwarded headers are
//! preferred over the peer address, and any port suffix is stripped so one
//! client is not split across ephemeral ports.

use std::net::SocketAddr;

/// Resolves the client identity from proxy headers, falling back to the peer
/// address of the connection.
pub fn resolve_client_ip(
    real_ip: Option<&str>,
    forwarded_for: Option<&str>,
    peer: SocketAddr,
) -> String {
    if let Some(ip) = real_ip.map(str::trim).filter(|s| !s.is_empty()) {
        return strip_port(ip);
    }

    // X-Forwarded-For lists one hop per entry; the first is the client.
    if let Some(first) = forwarded_for
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return strip_port(first);
    }

    peer.ip().to_string()
}

fn strip_port(addr: &str) -> String {
    match addr.parse::<SocketAddr>() {
        Ok(sock) => sock.ip().to_string(),
        Err(_) => addr.to_string(),
    }
}

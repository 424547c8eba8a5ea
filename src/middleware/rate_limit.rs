//! Rate limiting middleware
//!
//! Admission control in front of the provisioning endpoint. A rejected
//! request is answered immediately; no handler work happens for it.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::warn;

use crate::handlers::TokenResponse;
use crate::limiter::resolve_client_ip;
use crate::server::AppState;

pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let identity = client_identity(request.headers(), peer);

    if !state.limiter.allow(&identity) {
        warn!("Rate limit exceeded for {}", identity);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(TokenResponse::failure(
                "Too many requests, please retry later",
            )),
        )
            .into_response();
    }

    next.run(request).await
}

fn client_identity(headers: &HeaderMap, peer: SocketAddr) -> String {
    let real_ip = headers.get("x-real-ip").and_then(|v| v.to_str().ok());
    let forwarded_for = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok());
    resolve_client_ip(real_ip, forwarded_for, peer)
}

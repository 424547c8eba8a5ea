//! Request logging middleware

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::info;

/// Log each request with its method, path, and response status.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    info!("{} {} -> {}", method, path, response.status());
    response
}

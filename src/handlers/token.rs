//! Token endpoint handlers

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, info};
use serde_json::json;

use crate::handlers::responses::TokenResponse;
use crate::rpc::PublishRequest;
use crate::server::AppState;
use crate::template::{self, TokenRequest};
use crate::toolchain;

/// Provisions a working copy of the token template, renders the request
/// into it, compiles it, and returns the compiled artifacts.
pub async fn add_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return bad_request("Invalid request format");
    };

    if request.symbol.trim().is_empty() || request.name.trim().is_empty() {
        return bad_request("Symbol and Name fields must not be empty");
    }

    let project_dir =
        match template::provision_project(&request, &state.config.template, state.clock.as_ref()) {
            Ok(dir) => dir,
            Err(e) => {
                error!("Template provisioning failed: {}", e);
                return internal_error(format!("Template processing failed: {}", e));
            }
        };

    let build_output = match toolchain::build_project(&project_dir, &state.config.toolchain).await {
        Ok(output) => output,
        Err(e) => {
            error!("Build failed for {}: {}", project_dir.display(), e);
            return internal_error(format!("Build failed: {}", e));
        }
    };

    let artifacts = match toolchain::parse_build_output(&build_output) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!("Unusable build output for {}: {}", project_dir.display(), e);
            return internal_error(format!("Failed to parse build output: {}", e));
        }
    };

    info!(
        "Compiled token {} in {}",
        request.symbol,
        project_dir.display()
    );

    let body = TokenResponse::success(
        "Token added and compiled successfully",
        json!({
            "request": request,
            "compile_output": build_output,
            "modules": artifacts.modules,
            "dependencies": artifacts.dependencies,
        }),
    );
    (StatusCode::OK, Json(body)).into_response()
}

/// Relays a publish request to the upstream RPC endpoint and forwards its
/// response verbatim.
pub async fn publish_token(
    State(state): State<AppState>,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return bad_request("Invalid request format");
    };

    match state.rpc.publish(&request).await {
        Ok(upstream) => {
            let status =
                StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                [("content-type", "application/json")],
                upstream.body,
            )
                .into_response()
        }
        Err(e) => {
            error!("Publish relay failed: {}", e);
            internal_error(format!("Forwarding publish request failed: {}", e))
        }
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(TokenResponse::failure(message))).into_response()
}

fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(TokenResponse::failure(message)),
    )
        .into_response()
}

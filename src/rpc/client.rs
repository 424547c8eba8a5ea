//! Upstream RPC client
//!
//! Wraps the publish parameters in a JSON-RPC 2.0 `unsafe_publish` call and
//! relays it to the configured endpoint, retrying transport failures. The
//! upstream response is handed back raw so the HTTP layer can forward it
//! verbatim.

use serde::{Deserialize, Serialize};
use serde_json::json;

use log::warn;

use crate::config::RpcConfig;
use crate::error::RpcError;

/// Publish parameters supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub sender: String,
    pub compiled_modules: Vec<serde_json::Value>,
    pub dependencies: Vec<serde_json::Value>,
    pub gas_budget: String,
}

/// Raw upstream response for verbatim relay.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    retry_count: u32,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(RpcError::ClientBuild)?;

        Ok(Self {
            http,
            url: config.url.clone(),
            retry_count: config.retry_count,
        })
    }

    /// Builds the JSON-RPC 2.0 payload for an `unsafe_publish` call.
    pub fn publish_payload(request: &PublishRequest) -> serde_json::Value {
        json!({
            "jsonrpc": "2.0",
            "id": "1",
            "method": "unsafe_publish",
            "params": [
                request.sender,
                request.compiled_modules,
                request.dependencies,
                null,
                request.gas_budget,
            ],
        })
    }

    /// Relays a publish request upstream.
    ///
    /// Only transport failures are retried; any response the endpoint
    /// returns, error or not, is passed through for the caller to relay.
    pub async fn publish(&self, request: &PublishRequest) -> Result<UpstreamResponse, RpcError> {
        let payload = Self::publish_payload(request);
        let mut attempt = 0;

        loop {
            match self.http.post(&self.url).json(&payload).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response
                        .bytes()
                        .await
                        .map_err(RpcError::Transport)?
                        .to_vec();
                    return Ok(UpstreamResponse { status, body });
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > self.retry_count {
                        return Err(RpcError::Transport(e));
                    }
                    warn!(
                        "Publish relay attempt {}/{} failed: {}",
                        attempt, self.retry_count, e
                    );
                }
            }
        }
    }
}

//! JSON-RPC relay
//!
//! Forwards publish requests to the configured upstream RPC endpoint.

pub mod client;

pub use client::{PublishRequest, RpcClient, UpstreamResponse};

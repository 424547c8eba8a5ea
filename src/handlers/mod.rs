//! HTTP API handlers
//!
//! Request decoding, validation, and response shaping for the token API.

pub mod responses;
pub mod token;

pub use responses::TokenResponse;
pub use token::{add_token, publish_token};

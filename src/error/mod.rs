//! Error handling
//!
//! Defines error types and handling for the token forge server.

pub mod types;

pub use types::*;

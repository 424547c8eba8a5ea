//! Server system
//!
//! Owns the HTTP surface, shared application state, and background task
//! startup.

pub mod core;

pub use core::{AppState, Server};

//! Server middleware
//!
//! Provides request logging and rate limiting middleware.

pub mod logging;
pub mod rate_limit;

pub use logging::log_requests;
pub use rate_limit::rate_limit;

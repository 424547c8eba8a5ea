//! Working directory cleanup
//!
//! Reclaims ephemeral template working directories left behind by
//! provisioning requests.

pub mod sweeper;

pub use sweeper::RetentionSweeper;

//! Template provisioning
//!
//! Materializes a per-request working copy of the token contract template
//! project and renders the request fields into its source.

pub mod provision;

pub use provision::{
    OUTPUT_SOURCE, TEMPLATE_SOURCE, TokenRequest, WORK_DIR_PREFIX, provision_project,
    render_token_source,
};

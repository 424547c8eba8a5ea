//! Move build toolchain
//!
//! Drives the external build binary over a provisioned working copy and
//! extracts the compiled artifacts from its output.

pub mod build;

pub use build::{CompiledArtifacts, build_project, parse_build_output};

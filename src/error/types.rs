//! Error types
//!
//! Defines domain-specific error types for each module of the server.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Template provisioning errors
#[derive(Debug)]
pub enum TemplateError {
    MissingParentDir(PathBuf),
    CopyTemplate(io::Error),
    ReadTemplate(PathBuf, io::Error),
    WriteSource(PathBuf, io::Error),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::MissingParentDir(p) => {
                write!(f, "Template path has no parent directory: {}", p.display())
            }
            TemplateError::CopyTemplate(e) => write!(f, "Failed to copy template project: {}", e),
            TemplateError::ReadTemplate(p, e) => {
                write!(f, "Failed to read template source {}: {}", p.display(), e)
            }
            TemplateError::WriteSource(p, e) => {
                write!(f, "Failed to write generated source {}: {}", p.display(), e)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Move build toolchain errors
#[derive(Debug)]
pub enum ToolchainError {
    Spawn(String, io::Error),
    BuildFailed { status: ExitStatus, output: String },
    MissingArtifacts,
    MalformedArtifacts(serde_json::Error),
}

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolchainError::Spawn(binary, e) => {
                write!(f, "Failed to run build binary {}: {}", binary, e)
            }
            ToolchainError::BuildFailed { status, output } => {
                write!(f, "Build failed ({}), output: {}", status, output)
            }
            ToolchainError::MissingArtifacts => {
                write!(f, "No artifact JSON found in build output")
            }
            ToolchainError::MalformedArtifacts(e) => {
                write!(f, "Failed to parse artifact JSON: {}", e)
            }
        }
    }
}

impl std::error::Error for ToolchainError {}

/// RPC relay errors
#[derive(Debug)]
pub enum RpcError {
    ClientBuild(reqwest::Error),
    Transport(reqwest::Error),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::ClientBuild(e) => write!(f, "Failed to build HTTP client: {}", e),
            RpcError::Transport(e) => write!(f, "RPC request failed: {}", e),
        }
    }
}

impl std::error::Error for RpcError {}

//! Build invocation and artifact parsing

use std::path::Path;

use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use crate::config::ToolchainConfig;
use crate::error::ToolchainError;

/// Compiled modules and dependencies dumped by the build toolchain.
#[derive(Debug, Deserialize, PartialEq)]
pub struct CompiledArtifacts {
    pub modules: Vec<String>,
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub digest: Vec<u8>,
}

/// Runs `<binary> move build --dump-bytecode-as-base64` inside the working
/// project directory and returns the combined output.
pub async fn build_project(
    project_dir: &Path,
    config: &ToolchainConfig,
) -> Result<String, ToolchainError> {
    debug!(
        "Building project {} with {}",
        project_dir.display(),
        config.binary_path
    );

    let output = Command::new(&config.binary_path)
        .args(["move", "build", "--dump-bytecode-as-base64"])
        .current_dir(project_dir)
        .output()
        .await
        .map_err(|e| ToolchainError::Spawn(config.binary_path.clone(), e))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(ToolchainError::BuildFailed {
            status: output.status,
            output: combined,
        });
    }

    Ok(combined)
}

/// Extracts the artifact JSON from the build output.
///
/// The toolchain prints progress noise before the artifact dump, so parsing
/// starts at the first `{` and expects the JSON object to run to the end of
/// the output.
pub fn parse_build_output(output: &str) -> Result<CompiledArtifacts, ToolchainError> {
    let start = output.find('{').ok_or(ToolchainError::MissingArtifacts)?;

    serde_json::from_str(output[start..].trim()).map_err(ToolchainError::MalformedArtifacts)
}

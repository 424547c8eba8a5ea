//! Working copy provisioning
//!
//! Each provisioning request copies the pristine template project into a
//! sibling directory named `token_tmp_<unix-seconds>`, then renders the
//! request fields over the placeholder tokens in the template source. The
//! working copies are reclaimed later by the retention sweeper, never
//! deleted here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::TemplateConfig;
use crate::error::TemplateError;

/// Prefix of ephemeral working directories; shared with the retention
/// sweeper, which recognizes working copies by it.
pub const WORK_DIR_PREFIX: &str = "token_tmp";

/// Pristine template source, read from the template project.
pub const TEMPLATE_SOURCE: &str = "token_template.move";

/// Rendered source written into the working copy.
pub const OUTPUT_SOURCE: &str = "token.move";

/// Fields a client supplies for a new token contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub icon: String,
    pub symbol: String,
    pub decimal: u8,
    pub name: String,
    #[serde(default)]
    pub custom_info: String,
    #[serde(default)]
    pub description: String,
}

/// Copies the template project into a fresh working directory and writes the
/// rendered contract source into it. Returns the working project directory,
/// ready for the build toolchain.
pub fn provision_project(
    request: &TokenRequest,
    config: &TemplateConfig,
    clock: &dyn Clock,
) -> Result<PathBuf, TemplateError> {
    let template_dir = config.template_path();
    let parent = template_dir
        .parent()
        .ok_or_else(|| TemplateError::MissingParentDir(template_dir.clone()))?;

    let work_dir = parent.join(format!("{}_{}", WORK_DIR_PREFIX, clock.unix_seconds()));
    copy_project(&template_dir, &work_dir).map_err(TemplateError::CopyTemplate)?;

    let template_source = template_dir.join("sources").join(TEMPLATE_SOURCE);
    let template_content = fs::read_to_string(&template_source)
        .map_err(|e| TemplateError::ReadTemplate(template_source.clone(), e))?;

    let rendered = render_token_source(&template_content, request);

    let sources_dir = work_dir.join("sources");
    fs::create_dir_all(&sources_dir)
        .map_err(|e| TemplateError::WriteSource(sources_dir.clone(), e))?;
    let output = sources_dir.join(OUTPUT_SOURCE);
    fs::write(&output, rendered).map_err(|e| TemplateError::WriteSource(output.clone(), e))?;

    Ok(work_dir)
}

/// Substitutes the request fields over the template placeholders.
///
/// An empty description falls back to the token name. The custom info is
/// spliced into a string literal in the generated source, so its quotes are
/// escaped.
pub fn render_token_source(template: &str, request: &TokenRequest) -> String {
    let description = if request.description.is_empty() {
        request.name.as_str()
    } else {
        request.description.as_str()
    };
    let custom_info = request.custom_info.replace('"', "\\\"");

    template
        .replace("DECIMALTMP", &request.decimal.to_string())
        .replace("SYMBOLTMP", &request.symbol)
        .replace("NAMETMP", &request.name)
        .replace("DESCRIPTIONTMP", description)
        .replace("JSONTMP", &custom_info)
}

/// Recursively copies the template project, leaving out build artifacts and
/// the pristine template source.
fn copy_project(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = entry.file_name();

        if file_type.is_dir() && name == "build" {
            continue;
        }
        if !file_type.is_dir() && name == TEMPLATE_SOURCE {
            continue;
        }

        let dst_path = dst.join(&name);
        if file_type.is_dir() {
            copy_project(&entry.path(), &dst_path)?;
        } else {
            fs::copy(entry.path(), &dst_path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const NOW: u64 = 1_700_000_000;

    fn request() -> TokenRequest {
        TokenRequest {
            icon: "https://example.org/icon.png".to_string(),
            symbol: "FAST".to_string(),
            decimal: 9,
            name: "Fast Token".to_string(),
            custom_info: r#"{"site":"example.org"}"#.to_string(),
            description: "A very fast token".to_string(),
        }
    }

    /// Lays out a minimal template project in an isolated scratch directory.
    fn scratch_template(tag: &str) -> TemplateConfig {
        let parent = std::env::temp_dir().join(format!("forge-tmpl-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&parent);
        let template_dir = parent.join("token_template");
        fs::create_dir_all(template_dir.join("sources")).unwrap();
        fs::create_dir_all(template_dir.join("build")).unwrap();

        fs::write(
            template_dir.join("sources").join(TEMPLATE_SOURCE),
            "module token::token {\n\
             const DECIMALS: u8 = DECIMALTMP;\n\
             const SYMBOL: vector<u8> = b\"SYMBOLTMP\";\n\
             const NAME: vector<u8> = b\"NAMETMP\";\n\
             const DESCRIPTION: vector<u8> = b\"DESCRIPTIONTMP\";\n\
             const INFO: vector<u8> = b\"JSONTMP\";\n\
             }\n",
        )
        .unwrap();
        fs::write(template_dir.join("Move.toml"), "[package]\nname = \"token\"\n").unwrap();
        fs::write(template_dir.join("build").join("stale.mv"), "stale").unwrap();

        TemplateConfig {
            path: template_dir.to_string_lossy().to_string(),
        }
    }

    #[test]
    fn renders_all_placeholders() {
        let rendered = render_token_source(
            "DECIMALTMP SYMBOLTMP NAMETMP DESCRIPTIONTMP JSONTMP",
            &request(),
        );
        assert_eq!(
            rendered,
            "9 FAST Fast Token A very fast token {\\\"site\\\":\\\"example.org\\\"}"
        );
    }

    #[test]
    fn empty_description_falls_back_to_name() {
        let mut request = request();
        request.description = String::new();

        let rendered = render_token_source("DESCRIPTIONTMP", &request);
        assert_eq!(rendered, "Fast Token");
    }

    #[test]
    fn provisions_a_timestamped_working_copy() {
        let config = scratch_template("provision");
        let clock = ManualClock::at_unix(NOW);

        let work_dir = provision_project(&request(), &config, &clock).unwrap();

        assert_eq!(
            work_dir.file_name().unwrap().to_str().unwrap(),
            format!("{}_{}", WORK_DIR_PREFIX, NOW)
        );
        assert!(work_dir.join("Move.toml").exists());

        let generated = fs::read_to_string(work_dir.join("sources").join(OUTPUT_SOURCE)).unwrap();
        assert!(generated.contains("const DECIMALS: u8 = 9;"));
        assert!(generated.contains("b\"FAST\""));
        assert!(generated.contains("{\\\"site\\\":\\\"example.org\\\"}"));
    }

    #[test]
    fn working_copy_excludes_build_dir_and_pristine_source() {
        let config = scratch_template("exclude");
        let clock = ManualClock::at_unix(NOW);

        let work_dir = provision_project(&request(), &config, &clock).unwrap();

        assert!(!work_dir.join("build").exists());
        assert!(!work_dir.join("sources").join(TEMPLATE_SOURCE).exists());
        assert!(work_dir.join("sources").join(OUTPUT_SOURCE).exists());
    }

    #[test]
    fn missing_template_project_fails() {
        let config = TemplateConfig {
            path: std::env::temp_dir()
                .join("forge-tmpl-nonexistent")
                .join("token_template")
                .to_string_lossy()
                .to_string(),
        };
        let clock = ManualClock::at_unix(NOW);

        assert!(provision_project(&request(), &config, &clock).is_err());
    }
}

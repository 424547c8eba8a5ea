//! Retention sweeper
//!
//! Provisioning copies the template project into a sibling
//! `token_tmp_<unix-seconds>` directory and never deletes it synchronously.
//! The sweeper scans the template's parent directory on a fixed interval and
//! removes working directories whose encoded timestamp has aged past the
//! retention threshold. Everything that does not match the naming convention
//! is left alone.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::clock::Clock;
use crate::template::WORK_DIR_PREFIX;

pub struct RetentionSweeper {
    parent_dir: PathBuf,
    retention: Duration,
    clock: Arc<dyn Clock>,
}

impl RetentionSweeper {
    /// Creates a sweeper over the parent directory of the template project,
    /// where the working copies are materialized.
    pub fn new(template_path: &Path, retention: Duration, clock: Arc<dyn Clock>) -> Self {
        let parent_dir = template_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        Self {
            parent_dir,
            retention,
            clock,
        }
    }

    /// Runs one sweep pass and returns the number of directories removed.
    ///
    /// Failures are local: an unreadable entry, an unparsable timestamp or a
    /// failed removal is logged and the pass moves on. An unreadable parent
    /// directory ends the pass early; the next pass retries.
    pub fn sweep(&self) -> usize {
        let entries = match fs::read_dir(&self.parent_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(
                    "Cleanup pass: failed to read {}: {}",
                    self.parent_dir.display(),
                    e
                );
                return 0;
            }
        };

        let now = self.clock.unix_seconds();
        let threshold = self.retention.as_secs();
        let mut removed = 0;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Cleanup pass: failed to read directory entry: {}", e);
                    continue;
                }
            };

            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }

            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(timestamp) = parse_timestamp(name) else {
                continue;
            };

            let age = now.saturating_sub(timestamp);
            if age > threshold {
                let path = entry.path();
                match fs::remove_dir_all(&path) {
                    Ok(()) => {
                        info!(
                            "Cleanup pass: removed expired directory {} (age {}s)",
                            name, age
                        );
                        removed += 1;
                    }
                    Err(e) => {
                        error!("Cleanup pass: failed to remove {}: {}", path.display(), e);
                    }
                }
            }
        }

        if removed > 0 {
            info!("Cleanup pass complete: removed {} directories", removed);
        } else {
            debug!("Cleanup pass complete: nothing to remove");
        }

        removed
    }
}

/// Extracts the creation timestamp from a `token_tmp_<seconds>` name.
///
/// The timestamp segment must be pure decimal digits; anything else means
/// the entry is not one of ours. A name that carries the prefix but a
/// malformed timestamp is logged, since it points at a naming bug.
fn parse_timestamp(name: &str) -> Option<u64> {
    let suffix = name.strip_prefix(WORK_DIR_PREFIX)?.strip_prefix('_')?;

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        warn!("Cleanup pass: unparsable timestamp in {}, skipping", name);
        return None;
    }

    match suffix.parse() {
        Ok(timestamp) => Some(timestamp),
        Err(e) => {
            warn!("Cleanup pass: failed to parse timestamp in {}: {}", name, e);
            None
        }
    }
}

//! `--dump`: save the raw JSON of fetched issues next to the rendered output.

use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::jira::api_types::issue_key;

/// Directory the issues are written to, relative to the working directory
pub const DUMP_DIR: &str = "jira_issue_details";

/// Write each issue to `<dir>/issue-<KEY>.json`.
///
/// A failure on one issue is logged and does not stop the others.
/// Returns how many files were written.
pub fn dump_issues(dir: &Path, issues: &[Value]) -> Result<usize> {
  std::fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create dump directory {}: {}", dir.display(), e))?;

  let mut written = 0;
  for issue in issues {
    let key = issue_key(issue).unwrap_or("<unknown>");
    match dump_issue(dir, issue) {
      Ok(path) => {
        info!("Saved details for issue {} to {}", key, path.display());
        written += 1;
      }
      Err(e) => error!("Could not save details for issue {}: {}", key, e),
    }
  }

  Ok(written)
}

fn dump_issue(dir: &Path, issue: &Value) -> Result<PathBuf> {
  let key = issue_key(issue).ok_or_else(|| eyre!("issue has no key"))?;
  let path = dir.join(format!("issue-{}.json", key));

  let json = serde_json::to_string_pretty(issue)?;
  std::fs::write(&path, json).map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;

  Ok(path)
}

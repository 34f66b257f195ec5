//! Subcommand workflows.
//!
//! Each command writes its user-facing report to `out` and logs the details
//! through `tracing`. With `dry_run` only read calls reach the tracker.

mod create;
mod list;
mod update;

pub use create::{create, CreateArgs};
pub use list::{list, ListArgs};
pub use update::{update, UpdateArgs};

use color_eyre::{eyre::eyre, Result};

use crate::jira::types::Transition;

/// Find the transition named `status`, or the one leading to status `status`.
fn find_transition<'a>(transitions: &'a [Transition], status: &str) -> Result<&'a Transition> {
  transitions
    .iter()
    .find(|t| t.name == status)
    .or_else(|| transitions.iter().find(|t| t.to_status == status))
    .ok_or_else(|| {
      let available: Vec<&str> = transitions.iter().map(|t| t.name.as_str()).collect();
      eyre!(
        "Status {} not found in available statuses ({})",
        status,
        available.join(", ")
      )
    })
}

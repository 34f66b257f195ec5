use clap::{ArgGroup, Args};
use color_eyre::{eyre::eyre, Result};
use std::io::Write;
use tracing::{debug, info};

use crate::jira::api_types::issue_key;
use crate::jira::Tracker;

use super::find_transition;

#[derive(Args, Debug, Clone, Default)]
#[command(group(ArgGroup::new("target").required(true).args(["issue", "query"])))]
pub struct UpdateArgs {
  /// Ticket (or comma separated list of tickets) to update
  #[arg(long)]
  pub issue: Option<String>,

  /// Jira Query Language (JQL) query selecting the issues to update
  #[arg(long)]
  pub query: Option<String>,

  /// New status of the ticket
  #[arg(long)]
  pub status: Option<String>,

  /// Comment to add
  #[arg(long)]
  pub comment: Option<String>,
}

/// Transition and/or comment every selected issue. Returns the number of issues.
pub async fn update<T: Tracker>(
  tracker: &T,
  args: &UpdateArgs,
  dry_run: bool,
  out: &mut impl Write,
) -> Result<usize> {
  if args.status.is_none() && args.comment.is_none() {
    return Err(eyre!("Nothing to update, pass --status and/or --comment"));
  }

  let keys = match (&args.issue, &args.query) {
    (Some(list), _) => split_keys(list),
    (None, Some(query)) => {
      debug!("Searching issues to update: {}", query);
      tracker
        .search_issues(query)
        .await?
        .iter()
        .filter_map(|issue| issue_key(issue).map(String::from))
        .collect()
    }
    (None, None) => return Err(eyre!("Pass --issue or --query to select issues")),
  };

  if keys.is_empty() {
    writeln!(out, "No issues selected")?;
    return Ok(0);
  }

  for key in &keys {
    if let Some(status) = &args.status {
      let transitions = tracker.transitions(key).await?;
      let transition = find_transition(&transitions, status)?;
      if dry_run {
        writeln!(
          out,
          "Would transition {} to {} (transition {})",
          key, status, transition.id
        )?;
      } else {
        tracker.transition_issue(key, &transition.id).await?;
        info!("Transitioned {} with transition {}", key, transition.id);
        writeln!(out, "Transitioned {} to {}", key, status)?;
      }
    }

    if let Some(comment) = &args.comment {
      if dry_run {
        writeln!(out, "Would comment on {}", key)?;
      } else {
        tracker.add_comment(key, comment).await?;
        writeln!(out, "Commented on {}", key)?;
      }
    }
  }

  Ok(keys.len())
}

/// Split "A-1, A-2,,A-3" into issue keys.
fn split_keys(list: &str) -> Vec<String> {
  list
    .split(',')
    .map(str::trim)
    .filter(|k| !k.is_empty())
    .map(String::from)
    .collect()
}

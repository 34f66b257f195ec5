use clap::Args;
use color_eyre::Result;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::dump::dump_issues;
use crate::jira::cached_client::CachedJiraClient;
use crate::jira::Tracker;
use crate::template::TemplateRenderer;

/// Issues shown when no query is given
pub const DEFAULT_QUERY: &str =
  "assignee = currentUser() AND sprint in openSprints() ORDER BY priority DESC";

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
  /// Jira Query Language (JQL) string (default: my issues in open sprints)
  #[arg(long)]
  pub query: Option<String>,
}

/// Search issues and render them through the template.
///
/// When `dump_dir` is set the raw issues are also saved there.
pub async fn list<T: Tracker>(
  client: &mut CachedJiraClient<T>,
  args: &ListArgs,
  template: &Path,
  dump_dir: Option<&Path>,
  out: &mut impl Write,
) -> Result<usize> {
  let renderer = TemplateRenderer::new(template)?;

  // Keep the sprint cache warm so `create --sprint` stays fast
  let sprints = client.sprints().await?;
  debug!("{} sprints known", sprints.len());

  let query = args.query.as_deref().unwrap_or(DEFAULT_QUERY);
  debug!("Searching issues: {}", query);
  let issues = client.tracker().search_issues(query).await?;

  let rendered = renderer.render(json!({ "issues": issues, "query": query }))?;
  writeln!(out, "{}", rendered)?;

  if let Some(dir) = dump_dir {
    dump_issues(dir, &issues)?;
  }

  Ok(issues.len())
}

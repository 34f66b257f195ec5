use clap::{Args, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use serde_json::{json, Map, Value};
use std::fmt;
use std::io::Write;
use tracing::{debug, info};

use crate::config::Config;
use crate::editor::resolve_description;
use crate::jira::cached_client::CachedJiraClient;
use crate::jira::types::User;
use crate::jira::Tracker;

use super::find_transition;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum IssueType {
  #[default]
  #[value(name = "Task")]
  Task,
  #[value(name = "Bug")]
  Bug,
  #[value(name = "Epic")]
  Epic,
}

impl fmt::Display for IssueType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      IssueType::Task => "Task",
      IssueType::Bug => "Bug",
      IssueType::Epic => "Epic",
    };
    f.write_str(name)
  }
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
  /// Project of a new ticket
  #[arg(long)]
  pub project: String,

  /// Summary of a new ticket
  #[arg(long)]
  pub summary: String,

  /// Description text; if it starts with '@' it is read from that file, if omitted $EDITOR is opened
  #[arg(long)]
  pub description: Option<String>,

  /// Assignee of a new ticket (defaults to unassigned)
  #[arg(long)]
  pub assignee: Option<String>,

  /// Component of a new ticket (repeatable, set to "" to ignore the project defaults)
  #[arg(long)]
  pub component: Option<Vec<String>>,

  /// Label of a new ticket (repeatable, set to "" to ignore the project defaults)
  #[arg(long)]
  pub label: Option<Vec<String>>,

  /// Status to move the ticket to (a transition from the initial status must exist)
  #[arg(long)]
  pub status: Option<String>,

  /// Issue type
  #[arg(long = "type", value_enum, default_value_t = IssueType::Task)]
  pub issue_type: IssueType,

  /// Parent epic to put this ticket under
  #[arg(long)]
  pub epic: Option<String>,

  /// How many story points to add
  #[arg(long)]
  pub story_points: Option<u32>,

  /// Sprint to add the ticket to (name or id)
  #[arg(long)]
  pub sprint: Option<String>,
}

/// Create an issue and apply assignee, status, custom fields and sprint.
///
/// Everything that can be validated up front (assignee, sprint, custom field
/// ids) is resolved before the issue is created. Returns the new issue key,
/// or `None` on a dry run.
pub async fn create<T: Tracker>(
  client: &mut CachedJiraClient<T>,
  config: &Config,
  args: &CreateArgs,
  dry_run: bool,
  out: &mut impl Write,
) -> Result<Option<String>> {
  let assignee = match &args.assignee {
    Some(query) => Some(find_assignee(client.tracker(), query).await?),
    None => None,
  };
  let sprint = match &args.sprint {
    Some(wanted) => Some(client.find_sprint(wanted).await?),
    None => None,
  };
  let customization = custom_field_values(config, args)?;
  let description = resolve_description(args.description.as_deref())?;
  let fields = issue_fields(config, args, description)?;

  if dry_run {
    writeln!(out, "Would create issue with fields {}", Value::Object(fields))?;
    if let Some(user) = &assignee {
      writeln!(out, "Would assign to {} ({})", user.display_name, user.name)?;
    }
    if let Some(status) = &args.status {
      writeln!(out, "Would transition to {} status", status)?;
    }
    if !customization.is_empty() {
      writeln!(out, "Would configure custom fields {}", Value::Object(customization))?;
    }
    if let Some(sprint) = &sprint {
      writeln!(out, "Would add to sprint {} ({})", sprint.name, sprint.id)?;
    }
    return Ok(None);
  }

  let tracker = client.tracker();
  let created = tracker.create_issue(fields).await?;
  info!("Created issue {} (id {})", created.key, created.id);
  writeln!(out, "Created {}", created.key)?;
  let key = created.key;

  if let Some(user) = assignee {
    let mut update = Map::new();
    update.insert(
      "assignee".to_string(),
      json!({
        "name": user.name,
        "accountId": user.key,
        "displayName": user.display_name,
      }),
    );
    tracker.update_issue(&key, update).await?;
    writeln!(out, "Assigned to {} ({})", user.display_name, user.name)?;
  }

  if let Some(status) = &args.status {
    let transitions = tracker.transitions(&key).await?;
    let transition = find_transition(&transitions, status)?;
    tracker.transition_issue(&key, &transition.id).await?;
    writeln!(
      out,
      "Transitioned to {} status (transition {})",
      status, transition.id
    )?;
  }

  if !customization.is_empty() {
    let summary = Value::Object(customization.clone());
    tracker.update_issue(&key, customization).await?;
    writeln!(out, "Configured custom fields {}", summary)?;
  }

  if let Some(sprint) = sprint {
    tracker.add_to_sprint(sprint.id, &key).await?;
    writeln!(out, "Added to sprint {} ({})", sprint.name, sprint.id)?;
  }

  writeln!(out, "Link is {}", tracker.permalink(&key))?;

  Ok(Some(key))
}

/// The single active user matching `query`.
async fn find_assignee<T: Tracker>(tracker: &T, query: &str) -> Result<User> {
  let mut users = tracker.search_users(query).await?;
  debug!("{} users match {}", users.len(), query);

  match users.len() {
    1 => Ok(users.remove(0)),
    0 => Err(eyre!("No active user matches {}", query)),
    _ => {
      let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
      Err(eyre!(
        "Assignee {} is ambiguous, it matches: {}",
        query,
        names.join(", ")
      ))
    }
  }
}

/// Fields sent with the create request.
fn issue_fields(config: &Config, args: &CreateArgs, description: String) -> Result<Map<String, Value>> {
  let mut fields = Map::new();
  fields.insert("project".to_string(), json!({ "key": args.project }));
  fields.insert("summary".to_string(), json!(args.summary));
  fields.insert("description".to_string(), json!(description));
  fields.insert(
    "issuetype".to_string(),
    json!({ "name": args.issue_type.to_string() }),
  );

  let defaults = config.project_defaults(&args.project);

  let components = match &args.component {
    Some(given) => Some(non_empty(given)),
    None => defaults.and_then(|d| d.components.clone()),
  };
  if let Some(components) = components {
    let named: Vec<Value> = components.iter().map(|c| json!({ "name": c })).collect();
    fields.insert("components".to_string(), Value::Array(named));
  }

  let labels = match &args.label {
    Some(given) => Some(non_empty(given)),
    None => defaults.and_then(|d| d.labels.clone()),
  };
  if let Some(labels) = labels {
    fields.insert("labels".to_string(), json!(labels));
  }

  if args.issue_type == IssueType::Epic {
    let field = config
      .defaults
      .custom_fields
      .epic_name
      .as_ref()
      .ok_or_else(|| eyre!("defaults.custom_fields.epic_name must be configured to create epics"))?;
    fields.insert(field.clone(), json!(args.summary));
  }

  Ok(fields)
}

/// Epic link and story points, keyed by their custom field ids.
fn custom_field_values(config: &Config, args: &CreateArgs) -> Result<Map<String, Value>> {
  let custom_fields = &config.defaults.custom_fields;
  let mut values = Map::new();

  if let Some(epic) = &args.epic {
    let field = custom_fields
      .epic
      .as_ref()
      .ok_or_else(|| eyre!("defaults.custom_fields.epic must be configured to use --epic"))?;
    values.insert(field.clone(), json!(epic));
  }

  if let Some(points) = args.story_points {
    let field = custom_fields.story_points.as_ref().ok_or_else(|| {
      eyre!("defaults.custom_fields.story_points must be configured to use --story-points")
    })?;
    values.insert(field.clone(), json!(points));
  }

  Ok(values)
}

fn non_empty(values: &[String]) -> Vec<String> {
  values.iter().filter(|v| !v.is_empty()).cloned().collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{CustomFields, Defaults, ProjectDefaults, ServerConfig};
  use crate::jira::fake::FakeTracker;
  use crate::jira::types::Transition;
  use std::collections::{BTreeMap, HashMap};
  use tempfile::TempDir;

  fn config() -> Config {
    Config {
      server: ServerConfig {
        url: "https://jira.test".to_string(),
        auth: Default::default(),
      },
      boards_list: Vec::new(),
      defaults: Defaults {
        projects: BTreeMap::from([(
          "PERF".to_string(),
          ProjectDefaults {
            components: Some(vec!["Tooling".to_string()]),
            labels: Some(vec!["perf".to_string()]),
          },
        )]),
        custom_fields: CustomFields {
          epic_name: Some("customfield_1".to_string()),
          epic: Some("customfield_2".to_string()),
          story_points: Some("customfield_3".to_string()),
        },
      },
    }
  }

  fn args() -> CreateArgs {
    CreateArgs {
      project: "PERF".to_string(),
      summary: "Measure cache".to_string(),
      description: Some("Details".to_string()),
      ..Default::default()
    }
  }

  fn client(dir: &TempDir) -> CachedJiraClient<FakeTracker> {
    let tracker = FakeTracker {
      boards: vec![FakeTracker::board(1, "Perf board")],
      sprints: HashMap::from([(1, vec![FakeTracker::sprint(1, 11, "Perf 11", "active")])]),
      users: vec![
        User {
          name: "jdoe".to_string(),
          key: "JIRAUSER1".to_string(),
          display_name: "Jane Doe".to_string(),
        },
        User {
          name: "jsmith".to_string(),
          key: "JIRAUSER2".to_string(),
          display_name: "John Smith".to_string(),
        },
      ],
      transitions: vec![Transition {
        id: "21".to_string(),
        name: "Start Progress".to_string(),
        to_status: "In Progress".to_string(),
      }],
      ..Default::default()
    };
    CachedJiraClient::with_cache_path(tracker, Vec::new(), dir.path().join("sprints.json"))
  }

  #[test]
  fn test_fields_use_project_defaults() {
    let fields = issue_fields(&config(), &args(), "Details".to_string()).unwrap();

    assert_eq!(fields["project"], json!({"key": "PERF"}));
    assert_eq!(fields["issuetype"], json!({"name": "Task"}));
    assert_eq!(fields["components"], json!([{"name": "Tooling"}]));
    assert_eq!(fields["labels"], json!(["perf"]));
    assert!(!fields.contains_key("customfield_1"));
  }

  #[test]
  fn test_explicit_values_drop_empty_entries() {
    let args = CreateArgs {
      component: Some(vec!["".to_string(), "Docs".to_string()]),
      label: Some(vec!["".to_string()]),
      ..args()
    };

    let fields = issue_fields(&config(), &args, String::new()).unwrap();

    assert_eq!(fields["components"], json!([{"name": "Docs"}]));
    assert_eq!(fields["labels"], json!([]));
  }

  #[test]
  fn test_project_without_defaults_omits_components() {
    let args = CreateArgs {
      project: "OTHER".to_string(),
      ..args()
    };

    let fields = issue_fields(&config(), &args, String::new()).unwrap();

    assert!(!fields.contains_key("components"));
    assert!(!fields.contains_key("labels"));
  }

  #[test]
  fn test_epic_sets_epic_name() {
    let args = CreateArgs {
      issue_type: IssueType::Epic,
      ..args()
    };

    let fields = issue_fields(&config(), &args, String::new()).unwrap();
    assert_eq!(fields["customfield_1"], json!("Measure cache"));

    let mut unconfigured = config();
    unconfigured.defaults.custom_fields.epic_name = None;
    assert!(issue_fields(&unconfigured, &args, String::new()).is_err());
  }

  #[test]
  fn test_custom_field_values() {
    let args = CreateArgs {
      epic: Some("PERF-100".to_string()),
      story_points: Some(3),
      ..args()
    };

    let values = custom_field_values(&config(), &args).unwrap();
    assert_eq!(values["customfield_2"], json!("PERF-100"));
    assert_eq!(values["customfield_3"], json!(3));

    let mut unconfigured = config();
    unconfigured.defaults.custom_fields.story_points = None;
    assert!(custom_field_values(&unconfigured, &args).is_err());
  }

  #[tokio::test]
  async fn test_create_applies_everything() {
    let dir = TempDir::new().unwrap();
    let mut client = client(&dir);
    let args = CreateArgs {
      assignee: Some("jdoe".to_string()),
      status: Some("In Progress".to_string()),
      story_points: Some(5),
      sprint: Some("Perf 11".to_string()),
      ..args()
    };
    let mut out = Vec::new();

    let key = create(&mut client, &config(), &args, false, &mut out)
      .await
      .unwrap();

    assert_eq!(key.as_deref(), Some("PERF-1"));
    let tracker = client.tracker();
    assert_eq!(tracker.calls_to("create_issue").len(), 1);
    assert_eq!(
      tracker.calls_to("update_issue"),
      vec![
        r#"update_issue PERF-1 {"assignee":{"accountId":"JIRAUSER1","displayName":"Jane Doe","name":"jdoe"}}"#.to_string(),
        r#"update_issue PERF-1 {"customfield_3":5}"#.to_string(),
      ]
    );
    assert_eq!(tracker.calls_to("transition_issue"), vec!["transition_issue PERF-1 21"]);
    assert_eq!(tracker.calls_to("add_to_sprint"), vec!["add_to_sprint 11 PERF-1"]);

    let report = String::from_utf8(out).unwrap();
    assert!(report.contains("Assigned to Jane Doe (jdoe)"));
    assert!(report.contains("Link is https://jira.test/browse/PERF-1"));
  }

  #[tokio::test]
  async fn test_ambiguous_assignee_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let mut client = client(&dir);
    let args = CreateArgs {
      assignee: Some("j".to_string()),
      ..args()
    };
    let mut out = Vec::new();

    let err = create(&mut client, &config(), &args, false, &mut out)
      .await
      .unwrap_err();

    assert!(err.to_string().contains("ambiguous"));
    assert!(client.tracker().calls_to("create_issue").is_empty());
  }

  #[tokio::test]
  async fn test_dry_run_only_reads() {
    let dir = TempDir::new().unwrap();
    let mut client = client(&dir);
    let args = CreateArgs {
      assignee: Some("jsmith".to_string()),
      sprint: Some("11".to_string()),
      ..args()
    };
    let mut out = Vec::new();

    let key = create(&mut client, &config(), &args, true, &mut out)
      .await
      .unwrap();

    assert!(key.is_none());
    let tracker = client.tracker();
    assert!(tracker.calls_to("create_issue").is_empty());
    assert!(tracker.calls_to("update_issue").is_empty());
    assert!(tracker.calls_to("add_to_sprint").is_empty());
    let report = String::from_utf8(out).unwrap();
    assert!(report.contains("Would create issue"));
    assert!(report.contains("Would add to sprint Perf 11 (11)"));
  }
}

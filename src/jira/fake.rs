//! In-memory tracker for tests.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use super::types::{Board, CreatedIssue, Sprint, Transition, User};
use super::Tracker;

/// Serves canned data and records every call by name.
#[derive(Default)]
pub struct FakeTracker {
  pub boards: Vec<Board>,
  pub sprints: HashMap<u64, Vec<Sprint>>,
  pub issues: Vec<Value>,
  pub users: Vec<User>,
  pub transitions: Vec<Transition>,
  pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeTracker {
  pub fn board(id: u64, name: &str) -> Board {
    Board {
      id,
      name: name.to_string(),
      board_type: "scrum".to_string(),
    }
  }

  pub fn sprint(board_id: u64, id: u64, name: &str, state: &str) -> Sprint {
    Sprint {
      board_id,
      id,
      name: name.to_string(),
      state: state.to_string(),
    }
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  /// Calls whose name starts with `prefix`
  pub fn calls_to(&self, prefix: &str) -> Vec<String> {
    self
      .calls()
      .into_iter()
      .filter(|c| c.starts_with(prefix))
      .collect()
  }

  fn record(&self, call: String) {
    self.calls.lock().unwrap().push(call);
  }
}

#[async_trait]
impl Tracker for FakeTracker {
  async fn search_issues(&self, jql: &str) -> Result<Vec<Value>> {
    self.record(format!("search_issues {}", jql));
    Ok(self.issues.clone())
  }

  async fn boards(&self, name: Option<&str>) -> Result<Vec<Board>> {
    self.record(format!("boards {}", name.unwrap_or("*")));
    Ok(
      self
        .boards
        .iter()
        .filter(|b| name.map_or(true, |n| b.name.contains(n)))
        .cloned()
        .collect(),
    )
  }

  async fn sprints(&self, board_id: u64) -> Result<Vec<Sprint>> {
    self.record(format!("sprints {}", board_id));
    Ok(self.sprints.get(&board_id).cloned().unwrap_or_default())
  }

  async fn search_users(&self, query: &str) -> Result<Vec<User>> {
    self.record(format!("search_users {}", query));
    Ok(
      self
        .users
        .iter()
        .filter(|u| u.name.contains(query) || u.display_name.contains(query))
        .cloned()
        .collect(),
    )
  }

  async fn create_issue(&self, fields: Map<String, Value>) -> Result<CreatedIssue> {
    let project = fields
      .get("project")
      .and_then(|p| p.get("key"))
      .and_then(Value::as_str)
      .ok_or_else(|| eyre!("project is required"))?
      .to_string();
    self.record(format!("create_issue {}", Value::Object(fields)));
    Ok(CreatedIssue {
      id: "10001".to_string(),
      key: format!("{}-1", project),
    })
  }

  async fn update_issue(&self, key: &str, fields: Map<String, Value>) -> Result<()> {
    self.record(format!("update_issue {} {}", key, Value::Object(fields)));
    Ok(())
  }

  async fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
    self.record(format!("transitions {}", key));
    Ok(self.transitions.clone())
  }

  async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
    self.record(format!("transition_issue {} {}", key, transition_id));
    Ok(())
  }

  async fn add_comment(&self, key: &str, body: &str) -> Result<()> {
    self.record(format!("add_comment {} {}", key, body));
    Ok(())
  }

  async fn add_to_sprint(&self, sprint_id: u64, key: &str) -> Result<()> {
    self.record(format!("add_to_sprint {} {}", sprint_id, key));
    Ok(())
  }

  fn permalink(&self, key: &str) -> String {
    format!("https://jira.test/browse/{}", key)
  }
}

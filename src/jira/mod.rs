pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod types;

use async_trait::async_trait;
use color_eyre::Result;
use serde_json::{Map, Value};

use types::{Board, CreatedIssue, Sprint, Transition, User};

/// Operations the commands need from the issue tracker.
///
/// [`client::JiraClient`] talks to a real server; tests use an in-memory fake.
#[async_trait]
pub trait Tracker: Send + Sync {
  /// Every issue matching `jql`, as raw JSON objects
  async fn search_issues(&self, jql: &str) -> Result<Vec<Value>>;

  /// Scrum boards, optionally only those whose name matches
  async fn boards(&self, name: Option<&str>) -> Result<Vec<Board>>;

  async fn sprints(&self, board_id: u64) -> Result<Vec<Sprint>>;

  /// Active users matching `query`
  async fn search_users(&self, query: &str) -> Result<Vec<User>>;

  async fn create_issue(&self, fields: Map<String, Value>) -> Result<CreatedIssue>;

  async fn update_issue(&self, key: &str, fields: Map<String, Value>) -> Result<()>;

  async fn transitions(&self, key: &str) -> Result<Vec<Transition>>;

  async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()>;

  async fn add_comment(&self, key: &str, body: &str) -> Result<()>;

  async fn add_to_sprint(&self, sprint_id: u64, key: &str) -> Result<()>;

  /// Browser link for an issue
  fn permalink(&self, key: &str) -> String;
}

#[cfg(test)]
pub mod fake;

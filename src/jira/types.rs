use serde::{Deserialize, Serialize};

/// Sprint as stored in the sprint cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
  pub board_id: u64,
  pub id: u64,
  pub name: String,
  pub state: String, // "active", "future" or "closed"
}

impl Sprint {
  pub fn is_active(&self) -> bool {
    self.state.eq_ignore_ascii_case("active")
  }
}

/// Board summary
#[derive(Debug, Clone)]
pub struct Board {
  pub id: u64,
  pub name: String,
  pub board_type: String, // "scrum" or "kanban"
}

/// User account
#[derive(Debug, Clone)]
pub struct User {
  pub name: String,
  pub key: String,
  pub display_name: String,
}

/// Workflow transition available for an issue
#[derive(Debug, Clone)]
pub struct Transition {
  pub id: String,
  pub name: String,
  /// Name of the status the transition leads to
  pub to_status: String,
}

/// Key of a freshly created issue
#[derive(Debug, Clone)]
pub struct CreatedIssue {
  pub id: String,
  pub key: String,
}

//! Serde-deserializable types matching Jira API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;
use serde_json::Value;

use super::types::{Board, CreatedIssue, Transition, User};

// ============================================================================
// Pagination envelopes
// ============================================================================

/// `/search` response. Issues stay raw so templates and dumps see every field.
#[derive(Debug, Deserialize)]
pub struct ApiSearchResponse {
  #[serde(default)]
  pub issues: Vec<Value>,
  #[serde(default)]
  pub total: u64,
}

/// Agile API page (`/board`, `/board/{id}/sprint`)
#[derive(Debug, Deserialize)]
pub struct ApiPage<T> {
  #[serde(default = "Vec::new")]
  pub values: Vec<T>,
  #[serde(rename = "isLast", default)]
  pub is_last: bool,
}

// ============================================================================
// Agile entities
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiBoard {
  pub id: u64,
  pub name: String,
  #[serde(rename = "type", default)]
  pub board_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiSprint {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub state: String,
}

// ============================================================================
// Users, transitions and created issues
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiUser {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub key: String,
  #[serde(rename = "displayName", default)]
  pub display_name: String,
  #[serde(default = "default_active")]
  pub active: bool,
}

fn default_active() -> bool {
  true
}

#[derive(Debug, Deserialize)]
pub struct ApiStatusRef {
  #[serde(default)]
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiTransition {
  pub id: String,
  pub name: String,
  pub to: Option<ApiStatusRef>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTransitionsResponse {
  #[serde(default)]
  pub transitions: Vec<ApiTransition>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCreatedIssue {
  pub id: String,
  pub key: String,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiBoard> for Board {
  fn from(board: ApiBoard) -> Self {
    Board {
      id: board.id,
      name: board.name,
      board_type: board.board_type,
    }
  }
}

impl From<ApiUser> for User {
  fn from(user: ApiUser) -> Self {
    User {
      name: user.name,
      key: user.key,
      display_name: user.display_name,
    }
  }
}

impl From<ApiTransition> for Transition {
  fn from(t: ApiTransition) -> Self {
    Transition {
      id: t.id,
      name: t.name,
      to_status: t.to.map(|s| s.name).unwrap_or_default(),
    }
  }
}

impl From<ApiCreatedIssue> for CreatedIssue {
  fn from(issue: ApiCreatedIssue) -> Self {
    CreatedIssue {
      id: issue.id,
      key: issue.key,
    }
  }
}

/// Issue key of a raw issue object, if present
pub fn issue_key(issue: &Value) -> Option<&str> {
  issue.get("key").and_then(Value::as_str)
}

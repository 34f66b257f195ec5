use crate::config::Config;
use crate::jira::api_types::{
  ApiBoard, ApiCreatedIssue, ApiPage, ApiSearchResponse, ApiSprint, ApiTransitionsResponse,
  ApiUser,
};
use crate::jira::types::{Board, CreatedIssue, Sprint, Transition, User};
use crate::jira::Tracker;
use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Page size for paginated endpoints
const PAGE_SIZE: u64 = 100;

/// Jira API client wrapper
#[derive(Clone)]
pub struct JiraClient {
  client: gouqi::r#async::Jira,
  base_url: String,
}

impl JiraClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = config.api_token()?;

    let credentials = gouqi::Credentials::Bearer(token);

    let client = gouqi::r#async::Jira::new(&config.server.url, credentials)
      .map_err(|e| eyre!("Failed to create Jira client: {}", e))?;

    Ok(Self {
      client,
      base_url: config.server.url.trim_end_matches('/').to_string(),
    })
  }

  /// Walk an agile API collection until the server reports the last page
  async fn agile_pages<T>(&self, endpoint: &str) -> Result<Vec<T>>
  where
    T: serde::de::DeserializeOwned,
  {
    let mut all = Vec::new();
    let mut start_at = 0u64;
    let separator = if endpoint.contains('?') { '&' } else { '?' };

    loop {
      let paged = format!(
        "{}{}startAt={}&maxResults={}",
        endpoint, separator, start_at, PAGE_SIZE
      );

      let response: ApiPage<T> = self
        .client
        .get("agile", &paged)
        .await
        .map_err(|e| eyre!("Failed to get {}: {}", endpoint, e))?;

      let count = response.values.len() as u64;
      all.extend(response.values);

      if response.is_last || count == 0 {
        break;
      }
      start_at += count;
    }

    Ok(all)
  }
}

#[async_trait]
impl Tracker for JiraClient {
  /// Search for issues using JQL
  async fn search_issues(&self, jql: &str) -> Result<Vec<Value>> {
    let mut all_issues = Vec::new();
    let mut start_at = 0u64;

    loop {
      let endpoint = format!(
        "/search?jql={}&startAt={}&maxResults={}",
        encode(jql),
        start_at,
        PAGE_SIZE
      );

      let response: ApiSearchResponse = self
        .client
        .get("api", &endpoint)
        .await
        .map_err(|e| eyre!("Failed to search issues: {}", e))?;

      let issues_count = response.issues.len() as u64;
      all_issues.extend(response.issues);

      // Check if we've fetched all issues
      if issues_count == 0 || start_at + issues_count >= response.total {
        break;
      }
      start_at += issues_count;
    }

    debug!("Search returned {} issues", all_issues.len());
    Ok(all_issues)
  }

  /// Get scrum boards, optionally filtered by name
  async fn boards(&self, name: Option<&str>) -> Result<Vec<Board>> {
    let endpoint = match name {
      Some(n) => format!("/board?type=scrum&name={}", encode(n)),
      None => "/board?type=scrum".to_string(),
    };

    let boards: Vec<ApiBoard> = self.agile_pages(&endpoint).await?;
    Ok(boards.into_iter().map(Board::from).collect())
  }

  /// Get every sprint of a board
  async fn sprints(&self, board_id: u64) -> Result<Vec<Sprint>> {
    let endpoint = format!("/board/{}/sprint", board_id);

    let sprints: Vec<ApiSprint> = self.agile_pages(&endpoint).await?;
    Ok(
      sprints
        .into_iter()
        .map(|s| Sprint {
          board_id,
          id: s.id,
          name: s.name,
          state: s.state,
        })
        .collect(),
    )
  }

  async fn search_users(&self, query: &str) -> Result<Vec<User>> {
    let endpoint = format!(
      "/user/search?username={}&includeActive=true&includeInactive=false",
      encode(query)
    );

    let users: Vec<ApiUser> = self
      .client
      .get("api", &endpoint)
      .await
      .map_err(|e| eyre!("Failed to search users matching {}: {}", query, e))?;

    Ok(
      users
        .into_iter()
        .filter(|u| u.active)
        .map(User::from)
        .collect(),
    )
  }

  async fn create_issue(&self, fields: Map<String, Value>) -> Result<CreatedIssue> {
    let body = json!({ "fields": fields });

    let created: ApiCreatedIssue = self
      .client
      .post("api", "/issue", body)
      .await
      .map_err(|e| eyre!("Failed to create issue: {}", e))?;

    Ok(created.into())
  }

  async fn update_issue(&self, key: &str, fields: Map<String, Value>) -> Result<()> {
    let endpoint = format!("/issue/{}", key);
    let body = json!({ "fields": fields });

    self
      .client
      .put::<Value, _>("api", &endpoint, body)
      .await
      .map_err(|e| eyre!("Failed to update issue {}: {}", key, e))?;

    Ok(())
  }

  async fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
    let endpoint = format!("/issue/{}/transitions", key);

    let response: ApiTransitionsResponse = self
      .client
      .get("api", &endpoint)
      .await
      .map_err(|e| eyre!("Failed to get transitions of {}: {}", key, e))?;

    Ok(
      response
        .transitions
        .into_iter()
        .map(Transition::from)
        .collect(),
    )
  }

  async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
    let endpoint = format!("/issue/{}/transitions", key);
    let body = json!({
      "transition": {
        "id": transition_id
      }
    });

    self
      .client
      .post::<Value, _>("api", &endpoint, body)
      .await
      .map_err(|e| eyre!("Failed to execute transition on {}: {}", key, e))?;

    Ok(())
  }

  async fn add_comment(&self, key: &str, body: &str) -> Result<()> {
    let endpoint = format!("/issue/{}/comment", key);

    self
      .client
      .post::<Value, _>("api", &endpoint, json!({ "body": body }))
      .await
      .map_err(|e| eyre!("Failed to comment on {}: {}", key, e))?;

    Ok(())
  }

  async fn add_to_sprint(&self, sprint_id: u64, key: &str) -> Result<()> {
    let endpoint = format!("/sprint/{}/issue", sprint_id);

    self
      .client
      .post::<Value, _>("agile", &endpoint, json!({ "issues": [key] }))
      .await
      .map_err(|e| eyre!("Failed to add {} to sprint {}: {}", key, sprint_id, e))?;

    Ok(())
  }

  fn permalink(&self, key: &str) -> String {
    permalink(&self.base_url, key)
  }
}

fn permalink(base_url: &str, key: &str) -> String {
  format!("{}/browse/{}", base_url, key)
}

/// Percent-encode a query parameter value
fn encode(value: &str) -> String {
  url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

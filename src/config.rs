use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "~/.jira_query.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  /// Scrum boards to read sprints from. Empty means every board the user can see.
  #[serde(default, deserialize_with = "deserialize_nullable_list")]
  pub boards_list: Vec<String>,
  #[serde(default)]
  pub defaults: Defaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub url: String,
  #[serde(default)]
  pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
  /// Personal access token; falls back to the environment when absent
  pub token_auth: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
  /// Per-project defaults keyed by project key
  #[serde(default)]
  pub projects: BTreeMap<String, ProjectDefaults>,
  #[serde(default)]
  pub custom_fields: CustomFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDefaults {
  pub components: Option<Vec<String>>,
  pub labels: Option<Vec<String>>,
}

/// Ids of instance-specific custom fields (e.g. "customfield_12311141")
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomFields {
  pub epic_name: Option<String>,
  pub epic: Option<String>,
  pub story_points: Option<String>,
}

/// `boards_list:` with no items parses as null in YAML
fn deserialize_nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let v: Option<Vec<String>> = Option::deserialize(deserializer)?;
  Ok(v.unwrap_or_default())
}

impl Config {
  /// Load configuration from `path`, expanding a leading `~`.
  pub fn load(path: &Path) -> Result<Self> {
    let path = expand_tilde(path);
    if !path.exists() {
      return Err(eyre!(
        "Config file not found: {}\n\
                 See config.example.yaml for the format.",
        path.display()
      ));
    }

    Self::load_from_path(&path)
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config =
      serde_yaml::from_str(contents).map_err(|e| eyre!("Failed to parse YAML: {}", e))?;

    if config.server.url.trim().is_empty() {
      return Err(eyre!("server.url must not be empty"));
    }

    Ok(config)
  }

  /// Get the Jira API token.
  ///
  /// Uses `server.auth.token_auth` from the config file, then JIRA_CLI_TOKEN,
  /// then JIRA_API_TOKEN.
  pub fn api_token(&self) -> Result<String> {
    if let Some(token) = self
      .server
      .auth
      .token_auth
      .as_ref()
      .filter(|t| !t.is_empty())
    {
      return Ok(token.clone());
    }

    std::env::var("JIRA_CLI_TOKEN")
      .or_else(|_| std::env::var("JIRA_API_TOKEN"))
      .map_err(|_| {
        eyre!(
          "Jira API token not found. Set server.auth.token_auth in the config file or the JIRA_CLI_TOKEN environment variable."
        )
      })
  }

  pub fn project_defaults(&self, project: &str) -> Option<&ProjectDefaults> {
    self.defaults.projects.get(project)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  match path.strip_prefix("~") {
    Ok(rest) => match dirs::home_dir() {
      Some(home) => home.join(rest),
      None => path.to_path_buf(),
    },
    Err(_) => path.to_path_buf(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const FULL: &str = r#"
server:
  url: https://issues.example.com
  auth:
    token_auth: secret
boards_list:
  - Perf board
defaults:
  projects:
    PERF:
      components: [Tooling]
      labels: [perf]
  custom_fields:
    epic_name: customfield_1
    epic: customfield_2
    story_points: customfield_3
"#;

  #[test]
  fn test_parse_full_config() {
    let config = Config::parse(FULL).unwrap();

    assert_eq!(config.server.url, "https://issues.example.com");
    assert_eq!(config.api_token().unwrap(), "secret");
    assert_eq!(config.boards_list, vec!["Perf board"]);
    let perf = config.project_defaults("PERF").unwrap();
    assert_eq!(perf.components.as_deref(), Some(&["Tooling".to_string()][..]));
    assert_eq!(
      config.defaults.custom_fields.story_points.as_deref(),
      Some("customfield_3")
    );
  }

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::parse("server:\n  url: https://jira\nboards_list:\n").unwrap();

    assert!(config.boards_list.is_empty());
    assert!(config.defaults.projects.is_empty());
    assert!(config.defaults.custom_fields.epic.is_none());
    assert!(config.project_defaults("PERF").is_none());
  }

  #[test]
  fn test_missing_server_is_rejected() {
    assert!(Config::parse("boards_list: []\n").is_err());
    assert!(Config::parse("server:\n  url: ''\n").is_err());
  }

  #[test]
  fn test_missing_file_is_reported() {
    let err = Config::load(Path::new("/nonexistent/jira.yaml")).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_expand_tilde() {
    let plain = Path::new("/etc/jira.yaml");
    assert_eq!(expand_tilde(plain), plain);

    if let Some(home) = dirs::home_dir() {
      assert_eq!(
        expand_tilde(Path::new("~/.jira-cli/sprints.json")),
        home.join(".jira-cli/sprints.json")
      );
    }
  }
}

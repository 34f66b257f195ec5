//! Jira client with a local sprint directory.
//!
//! Listing sprints means walking every board, which takes minutes on a large
//! instance. The result is kept in a [`VersionedFileCache`] and reused until
//! it is older than [`default_max_age`].

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::cache::{default_max_age, VersionedFileCache};
use crate::config::Config;

use super::types::Sprint;
use super::Tracker;

/// Default location of the sprint cache
pub const SPRINT_CACHE_PATH: &str = "~/.jira-cli/sprints.json";

/// Tracker wrapper that serves sprints from the local cache.
pub struct CachedJiraClient<T> {
  inner: T,
  cache: VersionedFileCache<Sprint>,
  /// Board names to read sprints from; empty means all scrum boards
  boards_list: Vec<String>,
}

impl<T: Tracker> CachedJiraClient<T> {
  /// Create a cached client using the default cache location.
  pub fn new(inner: T, config: &Config) -> Result<Self> {
    let client = Self::with_cache_path(inner, config.boards_list.clone(), SPRINT_CACHE_PATH.into());

    // Ensure parent directory exists
    if let Some(parent) = client.cache.path().parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory {}: {}", parent.display(), e))?;
    }

    Ok(client)
  }

  pub fn with_cache_path(inner: T, boards_list: Vec<String>, path: PathBuf) -> Self {
    Self {
      inner,
      cache: VersionedFileCache::new(path),
      boards_list,
    }
  }

  /// The wrapped tracker, for calls that are not cached
  pub fn tracker(&self) -> &T {
    &self.inner
  }

  /// All known sprints, from cache when it is fresh enough.
  pub async fn sprints(&mut self) -> Result<Vec<Sprint>> {
    match self.cache.is_obsolete() {
      Ok(false) => {
        let version = self.cache.version()?;
        debug!(
          "Using sprint data from cache {} (version {})",
          self.cache.path().display(),
          version
        );
        if self.cache.empty()? {
          debug!("Sprint cache is fresh but holds no sprints");
        }
        return Ok(self.cache.get()?.map(<[Sprint]>::to_vec).unwrap_or_default());
      }
      Ok(true) => {}
      Err(e) => warn!("Ignoring unreadable sprint cache: {}", e),
    }

    debug!("Populating sprint data cache");
    let sprints = self.fetch_sprints().await?;

    match self.cache.set(sprints.clone()) {
      Ok(()) => {}
      Err(e) if e.is_conflict() => {
        warn!("{}; keeping the data written by the other process", e);
      }
      Err(e) => return Err(e.into()),
    }

    Ok(sprints)
  }

  /// Look up a sprint by numeric id or exact name.
  pub async fn find_sprint(&mut self, wanted: &str) -> Result<Sprint> {
    let sprints = self.sprints().await?;

    select_sprint(&sprints, wanted).cloned().ok_or_else(|| {
      eyre!(
        "Sprint {} not found among {} known sprints (the sprint cache refreshes every {} hours)",
        wanted,
        sprints.len(),
        default_max_age().num_hours()
      )
    })
  }

  async fn fetch_sprints(&self) -> Result<Vec<Sprint>> {
    let boards = if self.boards_list.is_empty() {
      warn!(
        "(Re)populating sprints cache by going through all boards you have access to, this will take a while. \
         Add `boards_list:` with just a few boards to your config to make it far faster."
      );
      self.inner.boards(None).await?
    } else {
      debug!(
        "Loading sprints from only {} boards specified in config",
        self.boards_list.len()
      );
      let mut boards = Vec::new();
      for name in &self.boards_list {
        boards.extend(self.inner.boards(Some(name)).await?);
      }
      boards
    };

    let mut sprints = Vec::new();
    for board in boards {
      debug!(
        "Looking for sprints in {} board {}/{}",
        board.board_type, board.id, board.name
      );
      for sprint in self.inner.sprints(board.id).await? {
        debug!("Found sprint {}/{}", sprint.id, sprint.name);
        sprints.push(sprint);
      }
    }

    Ok(sprints)
  }
}

/// Pick a sprint by id, or by name preferring an active one.
fn select_sprint<'a>(sprints: &'a [Sprint], wanted: &str) -> Option<&'a Sprint> {
  if let Ok(id) = wanted.trim().parse::<u64>() {
    if let Some(sprint) = sprints.iter().find(|s| s.id == id) {
      return Some(sprint);
    }
  }

  let mut named = sprints.iter().filter(|s| s.name == wanted);
  let first = named.next()?;
  if first.is_active() {
    return Some(first);
  }
  named.find(|s| s.is_active()).or(Some(first))
}

//! Error types for the file cache.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by [`VersionedFileCache`](super::VersionedFileCache).
///
/// A missing backing file is not an error; it reads as `None`.
#[derive(Error, Debug)]
pub enum CacheError {
  /// The file changed on disk after this cache object loaded it.
  #[error(
    "Cache file {path} was modified after it was loaded (loaded version {observed}, on disk {on_disk}), refusing to overwrite it"
  )]
  ConflictingWrite {
    path: PathBuf,
    observed: DateTime<Utc>,
    on_disk: DateTime<Utc>,
  },

  #[error("Failed to access cache file {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Cache file {path} does not hold valid JSON: {source}")]
  Serialization {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

impl CacheError {
  pub fn is_conflict(&self) -> bool {
    matches!(self, CacheError::ConflictingWrite { .. })
  }
}

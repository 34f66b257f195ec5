//! Single-file JSON storage versioned by modification time.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::CacheError;
use crate::config::expand_tilde;

/// Age after which cached data should be recomputed by default.
pub fn default_max_age() -> Duration {
  Duration::hours(9)
}

/// In-memory view of the backing file.
#[derive(Debug)]
enum State<T> {
  /// Nothing read from disk yet
  Unloaded,
  /// Content and mtime as observed by the last load or write.
  /// `value` is `None` only when the file did not exist.
  Loaded {
    version: DateTime<Utc>,
    value: Option<Vec<T>>,
  },
}

impl<T> State<T> {
  /// Version observed by the last load or write
  fn version(&self) -> Option<DateTime<Utc>> {
    match self {
      State::Loaded { version, .. } => Some(*version),
      State::Unloaded => None,
    }
  }

  fn value(&self) -> Option<&[T]> {
    match self {
      State::Loaded { value, .. } => value.as_deref(),
      State::Unloaded => None,
    }
  }
}

fn unix_epoch() -> DateTime<Utc> {
  DateTime::<Utc>::from(SystemTime::UNIX_EPOCH)
}

/// A sequence of records persisted as a JSON array in a single file.
///
/// The file's modification time is the version of the data. It is read
/// lazily on first access and refreshed after every [`set`](Self::set).
///
/// Before writing, `set` compares the on-disk mtime with the version this
/// object observed and refuses to overwrite newer content. There is still a
/// window between that check and the write in which another process can
/// slip in; no file locking is done. An object that never loaded the file
/// has nothing to compare against and always writes.
#[derive(Debug)]
pub struct VersionedFileCache<T> {
  path: PathBuf,
  state: State<T>,
}

impl<T: Serialize + DeserializeOwned> VersionedFileCache<T> {
  /// Bind a cache to `path`, expanding a leading `~`. Nothing is read until
  /// first access.
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self {
      path: expand_tilde(path.as_ref()),
      state: State::Unloaded,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  #[cfg(test)]
  pub fn is_loaded(&self) -> bool {
    matches!(self.state, State::Loaded { .. })
  }

  /// Modification time of the data, or the Unix epoch if there is no file.
  pub fn version(&mut self) -> Result<DateTime<Utc>, CacheError> {
    self.load()?;
    Ok(self.state.version().unwrap_or_else(unix_epoch))
  }

  /// Cached records, or `None` if the file does not exist.
  pub fn get(&mut self) -> Result<Option<&[T]>, CacheError> {
    self.load()?;
    Ok(self.state.value())
  }

  /// Replace the file content with `value`.
  ///
  /// Fails with [`CacheError::ConflictingWrite`] when the file changed after
  /// it was loaded. The object keeps its old view in that case, so every
  /// further `set` fails the same way until [`reload`](Self::reload) is
  /// called.
  pub fn set(&mut self, value: Vec<T>) -> Result<(), CacheError> {
    if let Some(observed) = self.state.version() {
      if let Some(on_disk) = modified_at(&self.path)? {
        if on_disk > observed {
          return Err(CacheError::ConflictingWrite {
            path: self.path.clone(),
            observed,
            on_disk,
          });
        }
      }
    }

    let json = serde_json::to_string(&value).map_err(|source| CacheError::Serialization {
      path: self.path.clone(),
      source,
    })?;
    fs::write(&self.path, json).map_err(|source| CacheError::Io {
      path: self.path.clone(),
      source,
    })?;

    let version = modified_at(&self.path)?.ok_or_else(|| CacheError::Io {
      path: self.path.clone(),
      source: ErrorKind::NotFound.into(),
    })?;
    self.state = State::Loaded {
      version,
      value: Some(value),
    };

    Ok(())
  }

  /// Forget the in-memory view; the next access reads the file again.
  pub fn reload(&mut self) {
    self.state = State::Unloaded;
  }

  /// True when there is no file or it holds no records.
  pub fn empty(&mut self) -> Result<bool, CacheError> {
    Ok(self.get()?.map_or(true, |records| records.is_empty()))
  }

  /// True when the data is strictly older than `max_age`.
  pub fn obsolete(&mut self, max_age: Duration) -> Result<bool, CacheError> {
    self.obsolete_at(Utc::now(), max_age)
  }

  /// [`obsolete`](Self::obsolete) with the default nine hour window.
  pub fn is_obsolete(&mut self) -> Result<bool, CacheError> {
    self.obsolete(default_max_age())
  }

  fn obsolete_at(&mut self, now: DateTime<Utc>, max_age: Duration) -> Result<bool, CacheError> {
    let version = self.version()?;
    Ok(now - version > max_age)
  }

  fn load(&mut self) -> Result<(), CacheError> {
    if let State::Unloaded = self.state {
      self.state = self.read_from_disk()?;
    }
    Ok(())
  }

  fn read_from_disk(&self) -> Result<State<T>, CacheError> {
    let missing = || State::Loaded {
      version: unix_epoch(),
      value: None,
    };

    // The mtime is read before the content, so a concurrent writer can make
    // the data newer than its version but never the other way round.
    let Some(version) = modified_at(&self.path)? else {
      return Ok(missing());
    };

    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(missing()),
      Err(source) => {
        return Err(CacheError::Io {
          path: self.path.clone(),
          source,
        })
      }
    };

    let value = if content.trim().is_empty() {
      Vec::new()
    } else {
      serde_json::from_str(&content).map_err(|source| CacheError::Serialization {
        path: self.path.clone(),
        source,
      })?
    };

    Ok(State::Loaded {
      version,
      value: Some(value),
    })
  }
}

/// Last modification time of `path`, or `None` if it does not exist.
fn modified_at(path: &Path) -> Result<Option<DateTime<Utc>>, CacheError> {
  match fs::metadata(path).and_then(|meta| meta.modified()) {
    Ok(modified) => Ok(Some(DateTime::<Utc>::from(modified))),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
    Err(source) => Err(CacheError::Io {
      path: path.to_path_buf(),
      source,
    }),
  }
}

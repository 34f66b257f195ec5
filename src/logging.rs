//! Process-wide tracing setup.
//!
//! Messages go to stderr at the level chosen on the command line, and
//! everything this crate logs at debug level is also appended to a log
//! file in the temp directory.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name inside the temp directory
const LOG_FILE_NAME: &str = "jira-cli.log";

/// Stderr level for the `-v` / `-d` flags
pub fn level_for(verbose: bool, debug: bool) -> LevelFilter {
  if debug {
    LevelFilter::DEBUG
  } else if verbose {
    LevelFilter::INFO
  } else {
    LevelFilter::WARN
  }
}

pub fn log_file_path() -> PathBuf {
  std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `stderr_level`. Keep the returned guard alive until
/// the process exits so buffered file output is flushed.
pub fn init(stderr_level: LevelFilter) -> Result<Option<WorkerGuard>> {
  let stderr_filter = EnvFilter::builder()
    .with_default_directive(stderr_level.into())
    .from_env_lossy();
  let stderr_layer = fmt::layer()
    .with_writer(std::io::stderr)
    .with_thread_names(true)
    .with_filter(stderr_filter);

  // A missing log file must not prevent the tool from running
  let path = log_file_path();
  let (file_layer, guard) = match std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&path)
  {
    Ok(file) => {
      let (writer, guard) = tracing_appender::non_blocking(file);
      let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_filter(
          Targets::new()
            .with_target(env!("CARGO_CRATE_NAME"), LevelFilter::DEBUG)
            .with_default(LevelFilter::WARN),
        );
      (Some(layer), Some(guard))
    }
    Err(e) => {
      eprintln!("Not logging to {}: {}", path.display(), e);
      (None, None)
    }
  };

  tracing_subscriber::registry()
    .with(stderr_layer)
    .with(file_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

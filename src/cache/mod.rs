//! Local persistence for derived reference data.
//!
//! The cache keeps one JSON document per file and uses the file's
//! modification time as its version:
//! - a missing file reads as "no data", never as an error
//! - staleness is the age of that version
//! - writes are refused when another process touched the file since it was loaded

mod error;
mod storage;

pub use error::CacheError;
pub use storage::{default_max_age, VersionedFileCache};

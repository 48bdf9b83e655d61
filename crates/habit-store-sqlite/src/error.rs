//! Error type for `habit-store-sqlite`.

use habit_core::Kind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A batch handed to the inserter contained a record of another kind.
  #[error("batch of {expected} records contains a {found} record")]
  KindMismatch { expected: Kind, found: Kind },

  /// SQLite takes file names as UTF-8 text.
  #[error("path is not valid UTF-8: {}", .0.display())]
  NonUtf8Path(std::path::PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

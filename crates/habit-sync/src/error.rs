//! Error types for `habit-sync`.

use std::time::Duration;

use habit_core::Kind;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a submission or a sync cycle failed.
///
/// A cycle reports exactly one of these; there is no partial-success status.
#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid record: {0}")]
  Record(#[from] habit_core::Error),

  #[error("queue transport error: {0}")]
  Queue(#[source] BoxError),

  #[error("failed to reset local working copy: {0}")]
  Reset(#[source] std::io::Error),

  #[error("failed to restore remote snapshot: {0}")]
  Restore(#[source] BoxError),

  #[error("failed to open store: {0}")]
  Open(#[source] habit_store_sqlite::Error),

  #[error("failed to check schema: {0}")]
  SchemaCheck(#[source] habit_store_sqlite::Error),

  #[error("failed to create tables: {0}")]
  Schema(#[source] habit_store_sqlite::Error),

  #[error("failed to insert {kind} records: {source}")]
  Insertion {
    kind:   Kind,
    #[source]
    source: habit_store_sqlite::Error,
  },

  #[error("failed to write snapshot: {0}")]
  Snapshot(#[source] habit_store_sqlite::Error),

  #[error("failed to upload snapshot: {0}")]
  Upload(#[source] BoxError),

  #[error("sync cycle exceeded its {0:?} deadline")]
  DeadlineExceeded(Duration),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures of the bundled [`ObjectStore`](habit_core::archive::ObjectStore)
/// implementations.
#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid object key: {0:?}")]
  InvalidKey(String),
}

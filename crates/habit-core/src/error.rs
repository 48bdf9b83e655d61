//! Error types for `habit-core`.

use thiserror::Error;

use crate::kind::Kind;

#[derive(Debug, Error)]
pub enum Error {
  /// A queued item could not be parsed as the shape of `kind`.
  #[error("malformed {kind} record: {source}")]
  Decode {
    kind:   Kind,
    #[source]
    source: serde_json::Error,
  },

  #[error("{} type is required", .0.label())]
  MissingCategory(Kind),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

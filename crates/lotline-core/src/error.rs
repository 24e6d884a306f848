//! Error types for `lotline-core`.

use thiserror::Error;

/// A save was rejected; the collection is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("deal name must not be empty")]
  EmptyName,
}

/// The feed could not be fetched. The collection is left untouched and the
/// tracker goes offline for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestionError {
  #[error("feed transport failed: {0}")]
  Transport(String),

  #[error("feed returned HTTP {0}")]
  Status(u16),

  #[error("feed body is not a JSON array: {0}")]
  Decode(String),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error(transparent)]
  Ingestion(#[from] IngestionError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("curated deal id {0} appears more than once")]
  DuplicateId(u64),

  #[error("curated deal id {0} is in the range reserved for feed records")]
  ReservedId(u64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

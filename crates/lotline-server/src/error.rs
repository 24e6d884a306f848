//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The feed file could not be read while serving it.
  #[error("feed file unavailable: {0}")]
  FeedUnavailable(#[source] std::io::Error),

  #[error("feed file is not a JSON array: {0}")]
  FeedCorrupt(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::FeedUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      Error::FeedCorrupt(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

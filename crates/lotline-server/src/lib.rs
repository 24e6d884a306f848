//! Feed publication for Lotline.
//!
//! Serves the pipeline feed file as `/deals.json` with a permissive CORS
//! header, and hosts the [`ledger`] job that folds scraped listings into
//! that file between runs.

pub mod error;
pub mod feed_file;
pub mod ledger;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::State,
  http::{
    StatusCode,
    header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE},
  },
  response::IntoResponse,
  routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `lotline.toml` and
/// `LOTLINE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// The feed file served as `/deals.json` and rewritten by `merge`.
  pub deals_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "0.0.0.0".to_string(),
      port:       8000,
      deals_path: PathBuf::from("deals.json"),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the feed server's [`Router`].
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/",           get(health))
    .route("/health",     get(health))
    .route("/deals.json", get(deals))
    .fallback(not_found)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> &'static str { "OK" }

async fn not_found() -> impl IntoResponse { (StatusCode::NOT_FOUND, "Not Found") }

/// The feed file, byte for byte. It is re-read on every request so a
/// `merge` run is picked up without a restart.
async fn deals(State(state): State<AppState>) -> Result<impl IntoResponse> {
  let body = tokio::fs::read(&state.config.deals_path)
    .await
    .map_err(Error::FeedUnavailable)?;

  Ok((
    [
      (CONTENT_TYPE, "application/json"),
      (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    ],
    body,
  ))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, header},
  };
  use tower::ServiceExt as _;

  fn state_for(deals_path: PathBuf) -> AppState {
    AppState {
      config: Arc::new(ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        deals_path,
      }),
    }
  }

  async fn get_path(state: AppState, uri: &str) -> axum::response::Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  #[tokio::test]
  async fn health_answers_ok() {
    let state = state_for(PathBuf::from("/nonexistent/deals.json"));
    for uri in ["/", "/health"] {
      let resp = get_path(state.clone(), uri).await;
      assert_eq!(resp.status(), StatusCode::OK);
      assert_eq!(body_string(resp).await, "OK");
    }
  }

  #[tokio::test]
  async fn deals_serves_file_with_cors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deals.json");
    let payload = r#"[{"address":"8848 NW 5th Ave","price":600000}]"#;
    tokio::fs::write(&path, payload).await.unwrap();

    let resp = get_path(state_for(path), "/deals.json").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body_string(resp).await, payload);
  }

  #[tokio::test]
  async fn missing_feed_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let resp = get_path(state_for(dir.path().join("deals.json")), "/deals.json").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value =
      serde_json::from_str(&body_string(resp).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
  }

  #[tokio::test]
  async fn unknown_path_is_not_found() {
    let state = state_for(PathBuf::from("deals.json"));
    let resp = get_path(state, "/listings").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}

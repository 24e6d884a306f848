//! Async HTTP client for the pipeline feed.

use anyhow::{Context, Result};
use lotline_core::{IngestionError, feed::RawListing};
use reqwest::Client;

/// Fetches `{base_url}/deals.json`.
///
/// No timeout is set: a hung request leaves the tracker connecting for the
/// rest of the session.
#[derive(Clone)]
pub struct FeedClient {
  client:   Client,
  base_url: String,
}

impl FeedClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  fn url(&self) -> String {
    format!("{}/deals.json", self.base_url.trim_end_matches('/'))
  }

  /// `GET /deals.json`
  pub async fn fetch(&self) -> Result<Vec<RawListing>, IngestionError> {
    let url = self.url();
    tracing::debug!(%url, "fetching feed");

    let resp = self
      .client
      .get(&url)
      .send()
      .await
      .map_err(|e| IngestionError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
      return Err(IngestionError::Status(status.as_u16()));
    }

    let body = resp
      .text()
      .await
      .map_err(|e| IngestionError::Transport(e.to_string()))?;
    RawListing::parse_batch(&body).map_err(|e| IngestionError::Decode(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use axum::{Router, http::StatusCode, routing::get};
  use tokio::net::TcpListener;

  use super::*;

  /// Serve `app` on an ephemeral port and return its base URL.
  async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/")
  }

  #[tokio::test]
  async fn decodes_feed_array() {
    let app = Router::new().route(
      "/deals.json",
      get(|| async { r#"[{"address":"8848 NW 5th Ave","price":"600,000"},{"price":1}]"# }),
    );
    let client = FeedClient::new(spawn(app).await).unwrap();

    let batch = client.fetch().await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].address.as_deref(), Some("8848 NW 5th Ave"));
    assert_eq!(batch[0].price, Some(600_000.0));
    assert_eq!(batch[1].address, None);
  }

  #[tokio::test]
  async fn non_success_status_is_ingestion_failure() {
    let app = Router::new().route("/deals.json", get(|| async { StatusCode::BAD_GATEWAY }));
    let client = FeedClient::new(spawn(app).await).unwrap();
    assert_eq!(client.fetch().await, Err(IngestionError::Status(502)));
  }

  #[tokio::test]
  async fn non_array_body_is_decode_failure() {
    let app = Router::new().route("/deals.json", get(|| async { r#"{"deals":[]}"# }));
    let client = FeedClient::new(spawn(app).await).unwrap();
    assert!(matches!(client.fetch().await, Err(IngestionError::Decode(_))));
  }

  #[tokio::test]
  async fn unreachable_server_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = FeedClient::new(format!("http://{addr}")).unwrap();
    assert!(matches!(client.fetch().await, Err(IngestionError::Transport(_))));
  }
}

//! Reading and writing the published feed file.

use std::path::Path;

use lotline_core::feed::RawListing;

use crate::Result;

/// Load the feed file. A missing file is an empty feed.
pub async fn load(path: &Path) -> Result<Vec<RawListing>> {
  match tokio::fs::read_to_string(path).await {
    Ok(body) => Ok(RawListing::parse_batch(&body)?),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
    Err(e) => Err(e.into()),
  }
}

/// Write `deals` as pretty-printed JSON, replacing the file.
pub async fn save(path: &Path, deals: &[RawListing]) -> Result<()> {
  let body = serde_json::to_string_pretty(deals)?;
  tokio::fs::write(path, body).await?;
  Ok(())
}

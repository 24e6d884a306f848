//! lotline-server binary.
//!
//! `serve` publishes the feed file over HTTP. `merge` folds a scraped batch
//! (a JSON array of listings) into the feed file and exits.
//!
//! Configuration comes from `lotline.toml` (or `--config`) overlaid with
//! `LOTLINE_*` environment variables.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lotline_core::feed::RawListing;
use lotline_server::{AppState, ServerConfig, feed_file, ledger};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Lotline feed server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "lotline.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the feed file as /deals.json.
  Serve,
  /// Merge a scraped batch into the feed file.
  Merge {
    /// JSON array of freshly scraped listings.
    #[arg(long)]
    scraped: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LOTLINE"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.deals_path = expand_tilde(&server_cfg.deals_path);

  match cli.command {
    Command::Serve => serve(server_cfg).await,
    Command::Merge { scraped } => merge(&server_cfg.deals_path, &scraped).await,
  }
}

async fn serve(server_cfg: ServerConfig) -> anyhow::Result<()> {
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!(deals = ?server_cfg.deals_path, "serving feed file");

  let app = lotline_server::router(AppState {
    config: Arc::new(server_cfg),
  });

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn merge(deals_path: &Path, scraped_path: &Path) -> anyhow::Result<()> {
  let body = tokio::fs::read_to_string(scraped_path)
    .await
    .with_context(|| format!("failed to read {scraped_path:?}"))?;
  let scraped = RawListing::parse_batch(&body)
    .with_context(|| format!("{scraped_path:?} is not a JSON array"))?;

  let existing = feed_file::load(deals_path)
    .await
    .with_context(|| format!("failed to load {deals_path:?}"))?;
  let previous = existing.len();

  let outcome = ledger::merge(existing, scraped, chrono::Local::now().naive_local());

  for address in &outcome.price_changes {
    tracing::info!(%address, "price changed");
  }
  feed_file::save(deals_path, &outcome.deals)
    .await
    .with_context(|| format!("failed to write {deals_path:?}"))?;

  tracing::info!(
    previous,
    added = outcome.added,
    price_changes = outcome.price_changes.len(),
    total = outcome.deals.len(),
    "feed updated"
  );
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

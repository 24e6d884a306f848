//! `lotline`: terminal UI for the parcel deal tracker.
//!
//! # Usage
//!
//! ```
//! lotline --feed-url http://localhost:8000
//! lotline --config ~/.config/lotline/config.toml --log-file /tmp/lotline.log
//! ```

mod app;
mod client;
mod form;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::FeedClient;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use lotline_core::{IngestionError, curated, feed::RawListing, tracker::Tracker};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FEED_URL: &str = "http://localhost:8000";

type FeedResult = Result<Vec<RawListing>, IngestionError>;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lotline", about = "Terminal tracker for parcel deals")]
struct Args {
  /// Path to a TOML config file (feed_url, curated).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the feed server (default: http://localhost:8000).
  #[arg(long, env = "LOTLINE_FEED_URL")]
  feed_url: Option<String>,

  /// JSON file of curated deals to use instead of the built-in list.
  #[arg(long, value_name = "FILE")]
  curated: Option<PathBuf>,

  /// Append logs to this file. Nothing is logged without it.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  feed_url: String,
  #[serde(default)]
  curated:  Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let feed_url = args
    .feed_url
    .or_else(|| (!file_cfg.feed_url.is_empty()).then(|| file_cfg.feed_url.clone()))
    .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());

  let seed = match args.curated.or(file_cfg.curated) {
    Some(path) => {
      let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading curated deals {}", path.display()))?;
      curated::parse(&raw).with_context(|| format!("parsing curated deals {}", path.display()))?
    }
    None => curated::seed().context("parsing built-in curated deals")?,
  };
  tracing::info!(curated = seed.len(), %feed_url, "starting session");

  let mut app = App::new(Tracker::new(seed));

  // The one feed fetch of the session; its result is picked up by the event
  // loop between frames.
  let client = FeedClient::new(feed_url)?;
  let (feed_tx, feed_rx) = mpsc::channel::<FeedResult>(1);
  tokio::spawn(async move {
    let result = client.fetch().await;
    if feed_tx.send(result).await.is_err() {
      tracing::debug!("feed result dropped; session already closed");
    }
  });

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app, feed_rx).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Log to `path`; the terminal itself is owned by the UI.
fn init_logging(path: &Path) -> Result<()> {
  let file = File::options()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  mut feed_rx: mpsc::Receiver<FeedResult>,
) -> Result<()> {
  loop {
    if let Ok(result) = feed_rx.try_recv() {
      app.apply_feed(result);
    }

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}

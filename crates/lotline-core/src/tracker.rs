//! [`Tracker`]: one session's deal collection plus its feed status.
//!
//! The tracker is the whole surface a presentation layer talks to: it lists
//! the derived view, applies create/update/delete, and folds in the result
//! of the single feed fetch. It owns no I/O; the caller performs the fetch
//! and hands the outcome to [`Tracker::apply_feed`].

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
  IngestionError, Result, ValidationError, curated,
  deal::{Deal, DealDraft, DealId},
  feed::{RawListing, normalize_batch},
  metrics::{PortfolioSummary, summarize},
  query::{ViewQuery, derive_view},
  store::DealStore,
};

// ─── Feed status ─────────────────────────────────────────────────────────────

/// Where the session's feed ingestion stands.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
  /// The fetch has been issued and has not resolved. With a hung request
  /// the tracker stays here for the rest of the session.
  Connecting,
  /// The feed was merged.
  Connected {
    records:      usize,
    new_listings: usize,
    synced_at:    DateTime<Utc>,
  },
  /// The fetch failed; the collection was left as it was.
  Offline(IngestionError),
}

impl FeedStatus {
  pub fn is_connecting(&self) -> bool { matches!(self, Self::Connecting) }
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Tracker {
  store:  DealStore,
  status: FeedStatus,
}

impl Tracker {
  /// Start a session from a curated set. The feed is assumed to be in
  /// flight until [`Tracker::apply_feed`] is called.
  pub fn new(curated: Vec<Deal>) -> Self {
    Self {
      store:  DealStore::new(curated),
      status: FeedStatus::Connecting,
    }
  }

  /// Start a session from the built-in curated set.
  pub fn with_builtin_seed() -> Result<Self> { Ok(Self::new(curated::seed()?)) }

  pub fn status(&self) -> &FeedStatus { &self.status }

  pub fn store(&self) -> &DealStore { &self.store }

  pub fn get(&self, id: DealId) -> Option<&Deal> { self.store.get(id) }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The filtered, searched, sorted view of the current collection.
  pub fn list_view(&self, query: &ViewQuery) -> Vec<&Deal> {
    derive_view(&self.store, query)
  }

  /// Portfolio aggregates over the whole collection, ignoring any filter.
  pub fn summary(&self) -> PortfolioSummary { summarize(&self.store) }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Add a curated record with a fresh id.
  pub fn create(&mut self, draft: DealDraft) -> Result<Deal, ValidationError> {
    let mut deal = Deal::blank();
    deal.apply(draft);
    self.store.upsert(deal).cloned()
  }

  /// Replace the editable fields of record `id`, keeping its provenance.
  /// An unknown id is saved as a new curated record under a fresh id.
  pub fn update(
    &mut self,
    id: DealId,
    draft: DealDraft,
  ) -> Result<Deal, ValidationError> {
    let mut deal = self.store.get(id).cloned().unwrap_or_else(Deal::blank);
    deal.apply(draft);
    self.store.upsert(deal).cloned()
  }

  /// Delete record `id`; a missing id is not an error.
  pub fn delete(&mut self, id: DealId) -> Option<Deal> { self.store.remove(id) }

  // ── Feed ──────────────────────────────────────────────────────────────────

  /// Resolve the session's feed fetch.
  ///
  /// On success the normalized batch is appended after the existing
  /// records; on failure nothing changes except the status. Only the first
  /// resolution counts: once the tracker has left
  /// [`FeedStatus::Connecting`] further results are ignored and `false` is
  /// returned, so a stray second fetch can never re-append the feed.
  pub fn apply_feed(
    &mut self,
    result: Result<Vec<RawListing>, IngestionError>,
  ) -> bool {
    if !self.status.is_connecting() {
      warn!(status = ?self.status, "ignoring feed result; session already ingested");
      return false;
    }

    self.status = match result {
      Ok(batch) => {
        let before = self.store.len();
        let records = self.store.append(normalize_batch(&batch));
        let new_listings = self.store.deals()[before..]
          .iter()
          .filter(|d| d.is_new)
          .count();
        info!(records, new_listings, "feed merged");
        FeedStatus::Connected {
          records,
          new_listings,
          synced_at: Utc::now(),
        }
      }
      Err(err) => {
        warn!(error = %err, "feed ingestion failed; staying on curated data");
        FeedStatus::Offline(err)
      }
    };
    true
  }
}

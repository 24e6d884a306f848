//! Deal records: the unit the tracker aggregates, filters, and sorts.
//!
//! Optional numeric fields are `Option`s: an absent value means "unknown",
//! never zero. A lot size of zero would mean "no lot", which is a different
//! claim from "lot size not known yet".

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub type DealId = u64;

// ─── Enums ───────────────────────────────────────────────────────────────────

/// How urgently a deal should be looked at.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
  High,
  #[default]
  Medium,
  Low,
}

impl Priority {
  /// Sort rank: `high < medium < low`.
  pub fn rank(self) -> u8 {
    match self {
      Self::High => 0,
      Self::Medium => 1,
      Self::Low => 2,
    }
  }

  /// The next priority in `high → medium → low → high` order.
  pub fn cycle(self) -> Self {
    match self {
      Self::High => Self::Medium,
      Self::Medium => Self::Low,
      Self::Low => Self::High,
    }
  }
}

/// Where a deal came from. Fixed at creation.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Source {
  /// Entered by hand, either in the seed list or through the add form.
  #[default]
  Curated,
  /// Normalized from the remote feed.
  Pipeline,
}

// ─── Price history ───────────────────────────────────────────────────────────

/// One observed asking price for a feed listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
  pub price: Option<f64>,
  pub date:  Option<String>,
}

// ─── Deal ────────────────────────────────────────────────────────────────────

/// A tracked parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
  pub id:            DealId,
  pub name:          String,
  #[serde(default)]
  pub address:       String,
  /// Five-digit postal code, or empty.
  #[serde(default)]
  pub zip:           String,
  pub lot_sq_ft:     Option<u64>,
  pub zone:          Option<String>,
  pub units_res:     Option<u32>,
  pub units_lodging: Option<u32>,
  /// `None` is "not known", distinct from `Some(false)`.
  pub mixed_use:     Option<bool>,
  /// Whole currency units.
  pub ask_price:     Option<u64>,
  #[serde(default)]
  pub notes:         String,
  #[serde(default)]
  pub flags:         Vec<String>,
  #[serde(default)]
  pub priority:      Priority,
  pub url:           Option<String>,
  #[serde(default)]
  pub source:        Source,
  #[serde(default, rename = "is_new")]
  pub is_new:        bool,
  #[serde(default)]
  pub price_history: Vec<PricePoint>,
}

impl Deal {
  /// A blank, editable curated record with a freshly generated id.
  ///
  /// Nothing is validated here; the store validates on save.
  pub fn blank() -> Self { Self::blank_with_id(next_deal_id()) }

  /// A blank curated record with a caller-chosen id.
  pub fn blank_with_id(id: DealId) -> Self {
    Self {
      id,
      name: String::new(),
      address: String::new(),
      zip: String::new(),
      lot_sq_ft: None,
      zone: None,
      units_res: None,
      units_lodging: None,
      mixed_use: Some(false),
      ask_price: None,
      notes: String::new(),
      flags: Vec::new(),
      priority: Priority::Medium,
      url: None,
      source: Source::Curated,
      is_new: false,
      price_history: Vec::new(),
    }
  }

  /// The editable fields of this record.
  pub fn draft(&self) -> DealDraft {
    DealDraft {
      name:          self.name.clone(),
      address:       self.address.clone(),
      zip:           self.zip.clone(),
      lot_sq_ft:     self.lot_sq_ft,
      zone:          self.zone.clone(),
      units_res:     self.units_res,
      units_lodging: self.units_lodging,
      mixed_use:     self.mixed_use,
      ask_price:     self.ask_price,
      notes:         self.notes.clone(),
      flags:         self.flags.clone(),
      priority:      self.priority,
      url:           self.url.clone(),
    }
  }

  /// Overwrite the editable fields. `id`, `source`, `is_new` and the price
  /// history are provenance and stay as they are.
  pub fn apply(&mut self, draft: DealDraft) {
    self.name = draft.name;
    self.address = draft.address;
    self.zip = draft.zip;
    self.lot_sq_ft = draft.lot_sq_ft;
    self.zone = draft.zone;
    self.units_res = draft.units_res;
    self.units_lodging = draft.units_lodging;
    self.mixed_use = draft.mixed_use;
    self.ask_price = draft.ask_price;
    self.notes = draft.notes;
    self.flags = draft.flags;
    self.priority = draft.priority;
    self.url = draft.url;
  }
}

// ─── DealDraft ───────────────────────────────────────────────────────────────

/// Input to [`crate::tracker::Tracker::create`] and
/// [`crate::tracker::Tracker::update`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealDraft {
  pub name:          String,
  pub address:       String,
  pub zip:           String,
  pub lot_sq_ft:     Option<u64>,
  pub zone:          Option<String>,
  pub units_res:     Option<u32>,
  pub units_lodging: Option<u32>,
  pub mixed_use:     Option<bool>,
  pub ask_price:     Option<u64>,
  pub notes:         String,
  pub flags:         Vec<String>,
  pub priority:      Priority,
  pub url:           Option<String>,
}

impl DealDraft {
  /// Convenience constructor with every other field at its blank default.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Deal::blank_with_id(0).draft()
    }
  }
}

/// Split comma-separated tag entry into trimmed, non-empty labels.
pub fn parse_flags(input: &str) -> Vec<String> {
  input
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
    .collect()
}

// ─── Ids ─────────────────────────────────────────────────────────────────────

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// A time-based id (milliseconds since the epoch), bumped when two records
/// are created within the same millisecond.
pub fn next_deal_id() -> DealId {
  let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
  let prev = LAST_ID
    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |prev| {
      Some(now.max(prev + 1))
    })
    .unwrap_or_else(|prev| prev);
  now.max(prev + 1)
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn blank_record_defaults() {
    let deal = Deal::blank();
    assert!(deal.name.is_empty());
    assert_eq!(deal.mixed_use, Some(false));
    assert_eq!(deal.priority, Priority::Medium);
    assert_eq!(deal.source, Source::Curated);
    assert!(deal.flags.is_empty());
    assert!(deal.lot_sq_ft.is_none());
    assert!(deal.ask_price.is_none());
  }

  #[test]
  fn blank_ids_are_unique_and_increasing() {
    let ids: Vec<_> = (0..100).map(|_| Deal::blank().id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn apply_keeps_provenance() {
    let mut deal = Deal::blank_with_id(42);
    deal.source = Source::Pipeline;
    deal.is_new = true;

    let mut draft = DealDraft::named("Renamed");
    draft.priority = Priority::Low;
    deal.apply(draft);

    assert_eq!(deal.id, 42);
    assert_eq!(deal.source, Source::Pipeline);
    assert!(deal.is_new);
    assert_eq!(deal.name, "Renamed");
    assert_eq!(deal.priority, Priority::Low);
  }

  #[test]
  fn parse_flags_trims_and_drops_empties() {
    assert_eq!(
      parse_flags(" Live Local, ,2 Lots ,,"),
      vec!["Live Local".to_string(), "2 Lots".to_string()]
    );
    assert!(parse_flags("   ").is_empty());
  }

  #[test]
  fn priority_parses_case_insensitively() {
    assert_eq!(Priority::from_str("HIGH").unwrap(), Priority::High);
    assert_eq!(Priority::Low.to_string(), "low");
    assert!(Priority::from_str("urgent").is_err());
  }

  #[test]
  fn deal_json_uses_camel_case() {
    let mut deal = Deal::blank_with_id(7);
    deal.name = "NW 4th Ave".into();
    deal.lot_sq_ft = Some(5663);
    let json = serde_json::to_value(&deal).unwrap();
    assert_eq!(json["lotSqFt"], 5663);
    assert_eq!(json["source"], "curated");
    assert_eq!(json["is_new"], false);
    assert!(json["askPrice"].is_null());
  }
}

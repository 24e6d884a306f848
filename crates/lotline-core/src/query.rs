//! The view pipeline: source filter → text search → sort.
//!
//! [`derive_view`] is a pure function of the collection and a [`ViewQuery`].
//! Callers re-run it after every change; there is no cached or incremental
//! state.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::deal::{Deal, Source};

// ─── Source filter ───────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceFilter {
  #[default]
  All,
  Curated,
  Pipeline,
}

impl SourceFilter {
  pub fn admits(self, source: Source) -> bool {
    match self {
      Self::All => true,
      Self::Curated => source == Source::Curated,
      Self::Pipeline => source == Source::Pipeline,
    }
  }

  /// `all → curated → pipeline → all`.
  pub fn cycle(self) -> Self {
    match self {
      Self::All => Self::Curated,
      Self::Curated => Self::Pipeline,
      Self::Pipeline => Self::All,
    }
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// A sortable column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SortKey {
  /// By rank, `high < medium < low`.
  #[default]
  Priority,
  Name,
  Address,
  Zone,
  LotSqFt,
  UnitsRes,
  UnitsLodging,
  AskPrice,
}

/// A comparable projection of one field. Only values of the same key are
/// ever compared with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue<'a> {
  Rank(u8),
  Number(u64),
  Text(&'a str),
}

impl SortKey {
  /// The value this key sorts `deal` by; `None` when the field is unknown.
  fn value(self, deal: &Deal) -> Option<SortValue<'_>> {
    match self {
      Self::Priority => Some(SortValue::Rank(deal.priority.rank())),
      Self::Name => Some(SortValue::Text(&deal.name)),
      Self::Address => Some(SortValue::Text(&deal.address)),
      Self::Zone => deal.zone.as_deref().map(SortValue::Text),
      Self::LotSqFt => deal.lot_sq_ft.map(SortValue::Number),
      Self::UnitsRes => deal.units_res.map(|u| SortValue::Number(u.into())),
      Self::UnitsLodging => deal.units_lodging.map(|u| SortValue::Number(u.into())),
      Self::AskPrice => deal.ask_price.map(SortValue::Number),
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Ascending,
  Descending,
}

impl SortDirection {
  pub fn flip(self) -> Self {
    match self {
      Self::Ascending => Self::Descending,
      Self::Descending => Self::Ascending,
    }
  }

  fn apply(self, ordering: Ordering) -> Ordering {
    match self {
      Self::Ascending => ordering,
      Self::Descending => ordering.reverse(),
    }
  }
}

/// The active sort column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
  pub key:       SortKey,
  pub direction: SortDirection,
}

impl SortState {
  /// Header-click semantics: the active key flips direction, any other key
  /// becomes active in ascending order.
  pub fn select(&mut self, key: SortKey) {
    if self.key == key {
      self.direction = self.direction.flip();
    } else {
      self.key = key;
      self.direction = SortDirection::Ascending;
    }
  }

  /// Compare two deals. Unknown values go last in either direction; ties
  /// compare equal so a stable sort keeps their prior order.
  pub fn compare(&self, a: &Deal, b: &Deal) -> Ordering {
    match (self.key.value(a), self.key.value(b)) {
      (Some(x), Some(y)) => self.direction.apply(x.cmp(&y)),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => Ordering::Equal,
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Everything the table view depends on besides the collection itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewQuery {
  pub source: SourceFilter,
  /// Case-insensitive substring; blank matches everything.
  pub search: String,
  pub sort:   SortState,
}

/// Whether `deal` matches a search term that is already lower-cased.
fn matches_search(deal: &Deal, needle: &str) -> bool {
  let zone = deal.zone.as_deref().unwrap_or_default();
  [deal.name.as_str(), deal.address.as_str(), zone, deal.notes.as_str()]
    .into_iter()
    .chain(deal.flags.iter().map(String::as_str))
    .any(|field| field.to_lowercase().contains(needle))
}

/// Filter, search, and sort `deals` into the ordered view.
pub fn derive_view<'a>(
  deals: impl IntoIterator<Item = &'a Deal>,
  query: &ViewQuery,
) -> Vec<&'a Deal> {
  let needle = (!query.search.trim().is_empty()).then(|| query.search.to_lowercase());

  let mut view: Vec<&Deal> = deals
    .into_iter()
    .filter(|d| query.source.admits(d.source))
    .filter(|d| needle.as_deref().is_none_or(|n| matches_search(d, n)))
    .collect();

  view.sort_by(|a, b| query.sort.compare(a, b));
  view
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;
  use crate::deal::Priority;

  fn deal(id: u64, name: &str) -> Deal {
    let mut d = Deal::blank_with_id(id);
    d.name = name.into();
    d
  }

  fn ids(view: &[&Deal]) -> Vec<u64> { view.iter().map(|d| d.id).collect() }

  fn sorted_by(key: SortKey, direction: SortDirection) -> ViewQuery {
    ViewQuery {
      sort: SortState { key, direction },
      ..ViewQuery::default()
    }
  }

  #[test]
  fn priority_ascending_is_high_medium_low() {
    let mut low = deal(1, "low");
    low.priority = Priority::Low;
    let mut high = deal(2, "high");
    high.priority = Priority::High;
    let medium = deal(3, "medium");

    let deals = [low, high, medium];
    let view = derive_view(&deals, &sorted_by(SortKey::Priority, SortDirection::Ascending));
    assert_eq!(ids(&view), vec![2, 3, 1]);

    let view = derive_view(&deals, &sorted_by(SortKey::Priority, SortDirection::Descending));
    assert_eq!(ids(&view), vec![1, 3, 2]);
  }

  #[test]
  fn unknown_values_sort_last_in_both_directions() {
    let mut a = deal(1, "a");
    a.ask_price = Some(500_000);
    let b = deal(2, "b");
    let mut c = deal(3, "c");
    c.ask_price = Some(100_000);
    let d = deal(4, "d");

    let deals = [a, b, c, d];
    let asc = derive_view(&deals, &sorted_by(SortKey::AskPrice, SortDirection::Ascending));
    assert_eq!(ids(&asc), vec![3, 1, 2, 4]);

    let desc = derive_view(&deals, &sorted_by(SortKey::AskPrice, SortDirection::Descending));
    assert_eq!(ids(&desc), vec![1, 3, 2, 4]);
  }

  #[test]
  fn equal_values_keep_their_order() {
    let deals = [deal(5, "x"), deal(3, "x"), deal(9, "x")];
    for direction in [SortDirection::Ascending, SortDirection::Descending] {
      let view = derive_view(&deals, &sorted_by(SortKey::Name, direction));
      assert_eq!(ids(&view), vec![5, 3, 9]);
    }
  }

  #[test]
  fn unknown_zone_sorts_after_known() {
    let mut a = deal(1, "a");
    a.zone = Some("T6".into());
    let b = deal(2, "b");
    let mut c = deal(3, "c");
    c.zone = Some("RU3B".into());

    let deals = [a, b, c];
    let view = derive_view(&deals, &sorted_by(SortKey::Zone, SortDirection::Ascending));
    assert_eq!(ids(&view), vec![3, 1, 2]);
  }

  #[test]
  fn select_toggles_or_resets() {
    let mut sort = SortState::default();
    assert_eq!(sort.key, SortKey::Priority);
    assert_eq!(sort.direction, SortDirection::Ascending);

    sort.select(SortKey::Priority);
    assert_eq!(sort.key, SortKey::Priority);
    assert_eq!(sort.direction, SortDirection::Descending);

    sort.select(SortKey::LotSqFt);
    assert_eq!(sort.key, SortKey::LotSqFt);
    assert_eq!(sort.direction, SortDirection::Ascending);

    sort.select(SortKey::LotSqFt);
    assert_eq!(sort.direction, SortDirection::Descending);
  }

  #[test]
  fn source_filter_partitions() {
    let mut p = deal(2, "p");
    p.source = Source::Pipeline;
    let deals = [deal(1, "c"), p, deal(3, "c2")];

    let query = |source| ViewQuery {
      source,
      ..ViewQuery::default()
    };
    let all = derive_view(&deals, &query(SourceFilter::All));
    let curated = derive_view(&deals, &query(SourceFilter::Curated));
    let pipeline = derive_view(&deals, &query(SourceFilter::Pipeline));

    assert_eq!(ids(&pipeline), vec![2]);
    assert!(curated.iter().all(|d| d.source == Source::Curated));
    assert_eq!(curated.len() + pipeline.len(), all.len());
  }

  #[test]
  fn search_covers_fields_and_flags() {
    let mut a = deal(1, "NW 4th Ave");
    a.zone = Some("T5-R".into());
    let mut b = deal(2, "Biscayne Blvd");
    b.address = "8699 Biscayne Blvd".into();
    b.flags = vec!["Speculative".into()];
    let mut c = deal(3, "NE 64th St");
    c.notes = "Price is suspiciously good".into();

    let deals = [a, b, c];
    let search = |s: &str| ViewQuery {
      search: s.into(),
      ..ViewQuery::default()
    };
    assert_eq!(ids(&derive_view(&deals, &search("t5-r"))), vec![1]);
    assert_eq!(ids(&derive_view(&deals, &search("8699"))), vec![2]);
    assert_eq!(ids(&derive_view(&deals, &search("SPECUL"))), vec![2]);
    assert_eq!(ids(&derive_view(&deals, &search("suspicious"))), vec![3]);
    assert_eq!(derive_view(&deals, &search("   ")).len(), 3);
    assert!(derive_view(&deals, &search("wynwood")).is_empty());
  }

  #[test]
  fn strum_names_match_wire_names() {
    assert_eq!(SortKey::LotSqFt.to_string(), "lotSqFt");
    assert_eq!(SortKey::from_str("askPrice").unwrap(), SortKey::AskPrice);
    assert_eq!(SourceFilter::from_str("Pipeline").unwrap(), SourceFilter::Pipeline);
  }
}

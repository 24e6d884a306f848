//! Folding a freshly scraped batch into the published feed.
//!
//! Records are keyed by their lowercased, trimmed address. A scraped
//! listing whose address is already known only contributes a price change;
//! anything else becomes a new record flagged `is_new`. Records carried over
//! from the previous run lose their `is_new` flag, and new records are
//! written ahead of them.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use lotline_core::{deal::PricePoint, feed::RawListing};
use tracing::debug;

const UNKNOWN: &str = "unknown";

/// The merged feed plus what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
  pub deals:         Vec<RawListing>,
  pub added:         usize,
  /// Addresses of existing records whose price moved.
  pub price_changes: Vec<String>,
}

fn address_key(address: Option<&str>) -> Option<String> {
  address
    .map(|a| a.trim().to_lowercase())
    .filter(|key| !key.is_empty())
}

/// Zero counts as no price.
fn priced(price: Option<f64>) -> Option<f64> { price.filter(|p| *p != 0.0) }

/// The price a record was last seen at.
fn last_price(record: &RawListing) -> Option<f64> {
  match record.price_history.last() {
    Some(point) => point.price,
    None => record.price,
  }
}

fn fresh_record(listing: RawListing, stamp: &str) -> RawListing {
  let price_history = priced(listing.price)
    .map(|price| PricePoint {
      price: Some(price),
      date:  Some(stamp.to_owned()),
    })
    .into_iter()
    .collect();

  RawListing {
    neighborhood: Some(listing.neighborhood.unwrap_or_default()),
    property_type: Some(
      listing.property_type.unwrap_or_else(|| UNKNOWN.to_owned()),
    ),
    status: Some(listing.status.unwrap_or_else(|| UNKNOWN.to_owned())),
    zoning: Some(String::new()),
    added_at: Some(stamp.to_owned()),
    last_seen: Some(stamp.to_owned()),
    is_new: true,
    price_history,
    ..listing
  }
}

/// Merge `scraped` into `existing` as of `now`.
///
/// Listings without an address are dropped. Duplicates inside `scraped`
/// are only checked against `existing`, not against each other.
pub fn merge(
  mut existing: Vec<RawListing>,
  scraped: Vec<RawListing>,
  now: NaiveDateTime,
) -> MergeOutcome {
  let stamp = now.format("%Y-%m-%d %H:%M").to_string();
  let today = now.format("%Y-%m-%d").to_string();

  let known: HashMap<String, usize> = existing
    .iter()
    .enumerate()
    .filter_map(|(i, d)| address_key(d.address.as_deref()).map(|k| (k, i)))
    .collect();

  let mut fresh = Vec::new();
  let mut price_changes = Vec::new();

  for listing in scraped {
    let Some(key) = address_key(listing.address.as_deref()) else {
      continue;
    };
    let Some(&index) = known.get(&key) else {
      fresh.push(fresh_record(listing, &stamp));
      continue;
    };

    let record = &mut existing[index];
    let (Some(new_price), Some(old_price)) =
      (priced(listing.price), priced(last_price(record)))
    else {
      continue;
    };
    if new_price == old_price {
      continue;
    }

    debug!(address = %key, old_price, new_price, "price changed");
    record.price_history.push(PricePoint {
      price: Some(new_price),
      date:  Some(today.clone()),
    });
    record.price = Some(new_price);
    record.last_seen = Some(stamp.clone());
    price_changes.push(record.address.clone().unwrap_or_default());
  }

  for record in &mut existing {
    record.is_new = false;
  }

  let added = fresh.len();
  fresh.extend(existing);

  MergeOutcome {
    deals: fresh,
    added,
    price_changes,
  }
}

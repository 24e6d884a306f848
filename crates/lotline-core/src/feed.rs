//! The remote feed: its wire schema and its mapping into [`Deal`]s.
//!
//! Feed records are loosely typed. Every field is optional, and a value of
//! the wrong type is read as absent rather than failing the batch. Zero and
//! empty values also count as absent, matching how the feed writer fills
//! fields it could not extract.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::deal::{Deal, DealId, PricePoint, Priority, Source};

/// Feed-derived records take ids from `FEED_ID_BASE` upward, by batch
/// position. Curated ids stay below it; generated ids are epoch millis.
pub const FEED_ID_BASE: DealId = 10_000;

/// Placeholder name for a listing without an address.
pub const UNKNOWN_NAME: &str = "Unknown";

const NOTE_SEPARATOR: &str = " · ";

pub const NEW_FLAG: &str = "🆕 New";
pub const PRICE_CHANGED_FLAG: &str = "Price Changed";

static ZIP: LazyLock<Regex> =
  LazyLock::new(|| Regex::new("[0-9]{5}").expect("zip pattern compiles"));

// ─── Wire schema ─────────────────────────────────────────────────────────────

/// One element of the `/deals.json` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
  #[serde(default, deserialize_with = "lenient::text")]
  pub address:       Option<String>,
  #[serde(rename = "lotSize", default, deserialize_with = "lenient::number")]
  pub lot_size:      Option<f64>,
  #[serde(default, deserialize_with = "lenient::text")]
  pub zoning:        Option<String>,
  #[serde(default, deserialize_with = "lenient::number")]
  pub price:         Option<f64>,
  #[serde(default, deserialize_with = "lenient::number")]
  pub beds:          Option<f64>,
  #[serde(default, deserialize_with = "lenient::number")]
  pub baths:         Option<f64>,
  /// Living area.
  #[serde(default, deserialize_with = "lenient::number")]
  pub sqft:          Option<f64>,
  #[serde(default, deserialize_with = "lenient::text")]
  pub status:        Option<String>,
  #[serde(default, deserialize_with = "lenient::text")]
  pub neighborhood:  Option<String>,
  #[serde(default, deserialize_with = "lenient::text")]
  pub added_at:      Option<String>,
  #[serde(default, deserialize_with = "lenient::text")]
  pub last_seen:     Option<String>,
  /// `land`, `single_family`, `multifamily`, or anything else.
  #[serde(
    rename = "propertyType",
    default,
    deserialize_with = "lenient::text"
  )]
  pub property_type: Option<String>,
  /// Only a literal JSON `true` counts.
  #[serde(default, deserialize_with = "lenient::flag")]
  pub is_new:        bool,
  #[serde(default, deserialize_with = "lenient::history")]
  pub price_history: Vec<PricePoint>,
  #[serde(default, deserialize_with = "lenient::text")]
  pub url:           Option<String>,
}

impl RawListing {
  /// Read one feed element. Never fails: anything that is not an object
  /// yields a listing with every field absent.
  pub fn from_value(value: serde_json::Value) -> Self {
    serde_json::from_value(value).unwrap_or_default()
  }

  /// Read a whole feed body. Only a body that is not a JSON array fails.
  pub fn parse_batch(body: &str) -> serde_json::Result<Vec<Self>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(body)?;
    Ok(items.into_iter().map(Self::from_value).collect())
  }
}

// ─── Normalizer ──────────────────────────────────────────────────────────────

/// Map a fetched batch into pipeline deals, ids assigned by position.
pub fn normalize_batch(batch: &[RawListing]) -> Vec<Deal> {
  batch
    .iter()
    .enumerate()
    .map(|(index, raw)| normalize(index, raw))
    .collect()
}

/// Map the `index`-th listing of a batch into a pipeline deal.
///
/// Unit counts and mixed use are left unknown; the feed carries no signal
/// for them.
pub fn normalize(index: usize, raw: &RawListing) -> Deal {
  let address = present_text(&raw.address).unwrap_or_default();
  let zip = ZIP
    .find(address)
    .map(|m| m.as_str().to_owned())
    .unwrap_or_default();

  Deal {
    id: FEED_ID_BASE + index as DealId,
    name: if address.is_empty() {
      UNKNOWN_NAME.to_owned()
    } else {
      address.to_owned()
    },
    address: address.to_owned(),
    zip,
    lot_sq_ft: whole(raw.lot_size),
    zone: present_text(&raw.zoning).map(str::to_owned),
    units_res: None,
    units_lodging: None,
    mixed_use: None,
    ask_price: whole(raw.price),
    notes: compose_notes(raw),
    flags: compose_flags(raw),
    priority: if raw.is_new {
      Priority::High
    } else {
      Priority::Medium
    },
    url: present_text(&raw.url).map(str::to_owned),
    source: Source::Pipeline,
    is_new: raw.is_new,
    price_history: raw.price_history.clone(),
  }
}

fn compose_notes(raw: &RawListing) -> String {
  let status = present_text(&raw.status).filter(|s| *s != "unknown");
  let items = [
    present_number(raw.beds).map(|n| format!("{n}bd")),
    present_number(raw.baths).map(|n| format!("{n}ba")),
    present_number(raw.sqft).map(|n| format!("{} sqft living", group_thousands(n))),
    status.map(|s| format!("Status: {s}")),
    present_text(&raw.neighborhood).map(|s| format!("Area: {s}")),
    present_text(&raw.added_at).map(|s| format!("Found: {s}")),
  ];
  items
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(NOTE_SEPARATOR)
}

fn compose_flags(raw: &RawListing) -> Vec<String> {
  let kind = match raw.property_type.as_deref() {
    Some("land") => Some("Land"),
    Some("multifamily") => Some("Multifamily"),
    Some("single_family") => Some("Single Family"),
    _ => None,
  };
  [
    raw.is_new.then_some(NEW_FLAG),
    kind,
    (raw.price_history.len() > 1).then_some(PRICE_CHANGED_FLAG),
  ]
  .into_iter()
  .flatten()
  .map(str::to_owned)
  .collect()
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn present_text(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.is_empty())
}

fn present_number(value: Option<f64>) -> Option<f64> {
  value.filter(|n| n.is_finite() && *n != 0.0)
}

/// A positive feed number as a whole count.
fn whole(value: Option<f64>) -> Option<u64> {
  present_number(value)
    .filter(|n| *n > 0.0)
    .map(|n| n.round() as u64)
}

/// `1234.5` → `"1,234.5"`; at most three fraction digits.
pub fn group_thousands(n: f64) -> String {
  let formatted = format!("{:.3}", n.abs());
  let (int_part, frac_part) = formatted
    .split_once('.')
    .unwrap_or((formatted.as_str(), ""));
  let frac_part = frac_part.trim_end_matches('0');

  let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
  for (i, ch) in int_part.chars().enumerate() {
    if i > 0 && (int_part.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }

  let sign = if n < 0.0 { "-" } else { "" };
  if frac_part.is_empty() {
    format!("{sign}{grouped}")
  } else {
    format!("{sign}{grouped}.{frac_part}")
  }
}

mod lenient {
  //! Field deserializers that read a wrongly-typed value as absent.

  use serde::{Deserialize, Deserializer};
  use serde_json::Value;

  use crate::deal::PricePoint;

  pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(as_text(&Value::deserialize(d)?))
  }

  pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(as_number(&Value::deserialize(d)?))
  }

  pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
  }

  pub fn history<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PricePoint>, D::Error> {
    Ok(match Value::deserialize(d)? {
      Value::Array(items) => items.iter().map(as_price_point).collect(),
      _ => Vec::new(),
    })
  }

  fn as_text(value: &Value) -> Option<String> {
    match value {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }

  fn as_number(value: &Value) -> Option<f64> {
    match value {
      Value::Number(n) => n.as_f64(),
      Value::String(s) => s.trim().replace(',', "").parse().ok(),
      _ => None,
    }
  }

  fn as_price_point(value: &Value) -> PricePoint {
    PricePoint {
      price: value.get("price").and_then(as_number),
      date:  value.get("date").and_then(as_text),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn listing(value: serde_json::Value) -> RawListing { RawListing::from_value(value) }

  #[test]
  fn full_listing_normalizes() {
    let raw = listing(json!({
      "address": "6320 NW 4th Ave, Miami, FL 33150",
      "lotSize": 5663,
      "zoning": "T5-R",
      "price": 225000,
      "beds": 3,
      "baths": 2.5,
      "sqft": 1450,
      "status": "for sale",
      "neighborhood": "Little Haiti",
      "added_at": "2026-03-02 07:00",
      "propertyType": "multifamily",
      "is_new": true,
      "price_history": [
        {"price": 240000, "date": "2026-02-01"},
        {"price": 225000, "date": "2026-03-02"}
      ],
      "url": "https://example.com/listing/1"
    }));

    let deal = normalize(0, &raw);
    assert_eq!(deal.id, FEED_ID_BASE);
    assert_eq!(deal.name, "6320 NW 4th Ave, Miami, FL 33150");
    assert_eq!(deal.zip, "33150");
    assert_eq!(deal.lot_sq_ft, Some(5663));
    assert_eq!(deal.zone.as_deref(), Some("T5-R"));
    assert_eq!(deal.ask_price, Some(225_000));
    assert_eq!(deal.units_res, None);
    assert_eq!(deal.units_lodging, None);
    assert_eq!(deal.mixed_use, None);
    assert_eq!(
      deal.notes,
      "3bd · 2.5ba · 1,450 sqft living · Status: for sale · Area: Little Haiti · Found: 2026-03-02 07:00"
    );
    assert_eq!(deal.flags, vec!["🆕 New", "Multifamily", "Price Changed"]);
    assert_eq!(deal.priority, Priority::High);
    assert_eq!(deal.source, Source::Pipeline);
    assert!(deal.is_new);
    assert_eq!(deal.price_history.len(), 2);
    assert_eq!(deal.url.as_deref(), Some("https://example.com/listing/1"));
  }

  #[test]
  fn sparse_listing_omits_absent_items() {
    let raw = listing(json!({
      "address": "535 NW 90th St",
      "status": "unknown",
      "neighborhood": "Miami Shores",
      "propertyType": "unknown",
      "price_history": [{"price": 1200000, "date": "2026-01-01"}]
    }));

    let deal = normalize(3, &raw);
    assert_eq!(deal.id, FEED_ID_BASE + 3);
    assert_eq!(deal.notes, "Area: Miami Shores");
    assert!(deal.flags.is_empty());
    assert_eq!(deal.priority, Priority::Medium);
    assert_eq!(deal.zip, "");
    assert_eq!(deal.zone, None);
    assert_eq!(deal.ask_price, None);
  }

  #[test]
  fn missing_address_uses_placeholder() {
    let deal = normalize(0, &listing(json!({ "price": 100000 })));
    assert_eq!(deal.name, UNKNOWN_NAME);
    assert_eq!(deal.address, "");
    assert_eq!(deal.zip, "");

    let deal = normalize(0, &listing(json!({ "address": "" })));
    assert_eq!(deal.name, UNKNOWN_NAME);
  }

  #[test]
  fn zero_values_count_as_absent() {
    let deal = normalize(
      0,
      &listing(json!({ "address": "1 Main St", "lotSize": 0, "price": 0, "beds": 0, "zoning": "" })),
    );
    assert_eq!(deal.lot_sq_ft, None);
    assert_eq!(deal.ask_price, None);
    assert_eq!(deal.zone, None);
    assert_eq!(deal.notes, "");
  }

  #[test]
  fn property_type_flags_are_exclusive() {
    for (kind, flag) in [
      ("land", "Land"),
      ("multifamily", "Multifamily"),
      ("single_family", "Single Family"),
    ] {
      let deal = normalize(0, &listing(json!({ "propertyType": kind })));
      assert_eq!(deal.flags, vec![flag]);
    }
  }

  #[test]
  fn wrongly_typed_fields_are_tolerated() {
    let raw = listing(json!({
      "address": 12345,
      "lotSize": "8,000",
      "price": {"amount": 5},
      "beds": [3],
      "is_new": "yes",
      "price_history": "none"
    }));
    assert_eq!(raw.address.as_deref(), Some("12345"));
    assert_eq!(raw.lot_size, Some(8000.0));
    assert_eq!(raw.price, None);
    assert_eq!(raw.beds, None);
    assert!(!raw.is_new);
    assert!(raw.price_history.is_empty());

    let deal = normalize(0, &raw);
    assert_eq!(deal.zip, "12345");
    assert_eq!(deal.priority, Priority::Medium);
  }

  #[test]
  fn non_object_elements_become_unknown_records() {
    let batch = RawListing::parse_batch(r#"[42, null, {"address": "9 Elm St 33127"}]"#).unwrap();
    let deals = normalize_batch(&batch);
    assert_eq!(deals.len(), 3);
    assert_eq!(deals[0].name, UNKNOWN_NAME);
    assert_eq!(deals[1].name, UNKNOWN_NAME);
    assert_eq!(deals[2].zip, "33127");
    assert_eq!(
      deals.iter().map(|d| d.id).collect::<Vec<_>>(),
      vec![10_000, 10_001, 10_002]
    );
  }

  #[test]
  fn non_array_body_fails_to_parse() {
    assert!(RawListing::parse_batch(r#"{"deals": []}"#).is_err());
    assert!(RawListing::parse_batch("<html>").is_err());
  }

  #[test]
  fn thousands_grouping() {
    assert_eq!(group_thousands(950.0), "950");
    assert_eq!(group_thousands(1450.0), "1,450");
    assert_eq!(group_thousands(1_234_567.0), "1,234,567");
    assert_eq!(group_thousands(1234.5), "1,234.5");
    assert_eq!(group_thousands(16_000.0), "16,000");
    assert_eq!(group_thousands(0.0), "0");
  }
}

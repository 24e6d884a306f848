//! The hand-maintained deal list the tracker starts from.
//!
//! The default list is compiled into the crate; [`parse`] accepts the same
//! JSON shape from any other source (the CLI's `--curated` flag).

use std::collections::HashSet;

use crate::{
  Error, Result,
  deal::{Deal, Source},
  feed::FEED_ID_BASE,
};

const SEED: &str = include_str!("curated.json");

/// The built-in curated deals.
pub fn seed() -> Result<Vec<Deal>> { parse(SEED) }

/// Parse a JSON array of deal records as a curated set.
///
/// Every record is marked [`Source::Curated`] regardless of what the file
/// says. Ids must be unique within the set and below [`FEED_ID_BASE`].
pub fn parse(json: &str) -> Result<Vec<Deal>> {
  let mut deals: Vec<Deal> = serde_json::from_str(json)?;
  let mut seen = HashSet::with_capacity(deals.len());
  for deal in &mut deals {
    if deal.id >= FEED_ID_BASE {
      return Err(Error::ReservedId(deal.id));
    }
    if !seen.insert(deal.id) {
      return Err(Error::DuplicateId(deal.id));
    }
    deal.source = Source::Curated;
  }
  Ok(deals)
}

//! [`DealStore`], the in-session deal collection.
//!
//! All mutation goes through the methods here. Nothing is persisted; the
//! collection lives as long as the session that owns it.

use tracing::{debug, warn};

use crate::{
  ValidationError,
  deal::{Deal, DealId, Source},
};

/// An ordered, id-unique collection of deals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealStore {
  deals: Vec<Deal>,
}

impl DealStore {
  /// A store holding only the curated set.
  pub fn new(curated: Vec<Deal>) -> Self { Self::merge(curated, Vec::new()) }

  /// Curated records first, then feed records. No deduplication by address
  /// or any other key: a parcel present in both sets appears twice.
  pub fn merge(curated: Vec<Deal>, feed: Vec<Deal>) -> Self {
    let mut store = Self::default();
    store.append(curated);
    store.append(feed);
    store
  }

  /// Append records after the existing ones.
  ///
  /// A record whose id is already taken is dropped so ids stay unique.
  /// Returns how many records were added.
  pub fn append(&mut self, records: Vec<Deal>) -> usize {
    let before = self.deals.len();
    self.deals.reserve(records.len());
    for deal in records {
      if self.get(deal.id).is_some() {
        warn!(id = deal.id, name = %deal.name, "dropping record with duplicate id");
        continue;
      }
      self.deals.push(deal);
    }
    self.deals.len() - before
  }

  /// Replace the record with the same id, or append a new one.
  ///
  /// Rejected without any mutation when the name is blank after trimming.
  pub fn upsert(&mut self, deal: Deal) -> Result<&Deal, ValidationError> {
    if deal.name.trim().is_empty() {
      return Err(ValidationError::EmptyName);
    }
    let index = match self.position(deal.id) {
      Some(i) => {
        debug!(id = deal.id, "replacing deal");
        self.deals[i] = deal;
        i
      }
      None => {
        debug!(id = deal.id, "adding deal");
        self.deals.push(deal);
        self.deals.len() - 1
      }
    };
    Ok(&self.deals[index])
  }

  /// Delete by id. Removing an absent id is a no-op.
  pub fn remove(&mut self, id: DealId) -> Option<Deal> {
    let index = self.position(id)?;
    debug!(id, "removing deal");
    Some(self.deals.remove(index))
  }

  pub fn get(&self, id: DealId) -> Option<&Deal> {
    self.deals.iter().find(|d| d.id == id)
  }

  pub fn deals(&self) -> &[Deal] { &self.deals }

  pub fn iter(&self) -> std::slice::Iter<'_, Deal> { self.deals.iter() }

  pub fn len(&self) -> usize { self.deals.len() }

  pub fn is_empty(&self) -> bool { self.deals.is_empty() }

  /// Number of records from `source`.
  pub fn count(&self, source: Source) -> usize {
    self.deals.iter().filter(|d| d.source == source).count()
  }

  fn position(&self, id: DealId) -> Option<usize> {
    self.deals.iter().position(|d| d.id == id)
  }
}

impl<'a> IntoIterator for &'a DealStore {
  type IntoIter = std::slice::Iter<'a, Deal>;
  type Item = &'a Deal;

  fn into_iter(self) -> Self::IntoIter { self.deals.iter() }
}

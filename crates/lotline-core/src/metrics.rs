//! Derived investment metrics. Everything here is pure.
//!
//! Unknown inputs produce unknown outputs: a missing ask price or unit count
//! is never treated as zero, except when summing portfolio totals.

use serde::Serialize;

use crate::deal::{Deal, DealId, Priority, Source};

pub const SQ_FT_PER_ACRE: f64 = 43_560.0;

/// Units per acre at which the density indicator saturates.
pub const DENSITY_CEILING: f64 = 150.0;

// ─── Cost per door ───────────────────────────────────────────────────────────

/// Ask price per residential unit, unrounded.
fn door_cost(deal: &Deal) -> Option<f64> {
  let ask = deal.ask_price?;
  let units = deal.units_res.filter(|&u| u > 0)?;
  Some(ask as f64 / f64::from(units))
}

/// Ask price per residential unit, in thousands, rounded.
///
/// Defined only when both the ask price and a non-zero unit count are known.
pub fn cost_per_door(deal: &Deal) -> Option<u64> {
  door_cost(deal).map(|c| (c / 1000.0).round() as u64)
}

/// How attractive a cost per door is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorTier {
  /// Under 40k per door.
  Strong,
  /// Under 70k per door.
  Fair,
  Rich,
}

impl DoorTier {
  pub fn of(thousands: u64) -> Self {
    match thousands {
      0..40 => Self::Strong,
      40..70 => Self::Fair,
      _ => Self::Rich,
    }
  }
}

// ─── Lot metrics ─────────────────────────────────────────────────────────────

/// Lot size in acres. `None` when the lot size is unknown or zero.
pub fn acres(deal: &Deal) -> Option<f64> {
  deal
    .lot_sq_ft
    .filter(|&sf| sf > 0)
    .map(|sf| sf as f64 / SQ_FT_PER_ACRE)
}

/// Ask price per square foot of lot, rounded.
pub fn ask_per_lot_sq_ft(deal: &Deal) -> Option<u64> {
  let ask = deal.ask_price?;
  let lot = deal.lot_sq_ft.filter(|&sf| sf > 0)?;
  Some((ask as f64 / lot as f64).round() as u64)
}

// ─── Density ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityBand {
  Low,
  Moderate,
  High,
}

/// Residential density of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Density {
  /// `0.0` when the lot size is unknown.
  pub acres:          f64,
  /// `None` when the unit count is unknown; `Some(0)` when the lot is.
  pub units_per_acre: Option<u64>,
  /// Share of [`DENSITY_CEILING`], clamped to `0..=100`. The underlying
  /// `units_per_acre` is never clamped.
  pub indicator_pct:  f64,
  pub band:           DensityBand,
}

pub fn density(deal: &Deal) -> Density {
  let acres = deal.lot_sq_ft.map_or(0.0, |sf| sf as f64 / SQ_FT_PER_ACRE);
  let units_per_acre = deal.units_res.map(|units| {
    if acres > 0.0 {
      (f64::from(units) / acres).round() as u64
    } else {
      0
    }
  });
  let indicator_pct = units_per_acre
    .map_or(0.0, |upa| (upa as f64 / DENSITY_CEILING * 100.0).min(100.0));
  let band = if indicator_pct > 60.0 {
    DensityBand::High
  } else if indicator_pct > 35.0 {
    DensityBand::Moderate
  } else {
    DensityBand::Low
  };
  Density {
    acres,
    units_per_acre,
    indicator_pct,
    band,
  }
}

// ─── Portfolio ───────────────────────────────────────────────────────────────

/// The deal with the lowest ask per residential unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestDoor {
  pub deal_id:   DealId,
  pub name:      String,
  pub zone:      Option<String>,
  /// Cost per door in thousands, rounded.
  pub thousands: u64,
}

/// Aggregates over a whole collection (never over a filtered view).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
  pub parcels:       usize,
  pub high_priority: usize,
  pub mixed_use:     usize,
  /// Sum of known residential unit counts.
  pub total_units:   u64,
  /// Sum of known ask prices.
  pub total_ask:     u64,
  pub best_door:     Option<BestDoor>,
  pub curated:       usize,
  pub pipeline:      usize,
  /// Pipeline records flagged fresh by the feed.
  pub new_listings:  usize,
}

pub fn summarize<'a>(deals: impl IntoIterator<Item = &'a Deal>) -> PortfolioSummary {
  let mut summary = PortfolioSummary::default();
  let mut best: Option<(f64, &Deal)> = None;

  for deal in deals {
    summary.parcels += 1;
    summary.total_units += deal.units_res.map_or(0, u64::from);
    summary.total_ask += deal.ask_price.unwrap_or(0);
    if deal.priority == Priority::High {
      summary.high_priority += 1;
    }
    if deal.mixed_use == Some(true) {
      summary.mixed_use += 1;
    }
    match deal.source {
      Source::Curated => summary.curated += 1,
      Source::Pipeline => {
        summary.pipeline += 1;
        if deal.is_new {
          summary.new_listings += 1;
        }
      }
    }
    if let Some(cost) = door_cost(deal)
      && best.is_none_or(|(lowest, _)| cost < lowest)
    {
      best = Some((cost, deal));
    }
  }

  summary.best_door = best.map(|(cost, deal)| BestDoor {
    deal_id:   deal.id,
    name:      deal.name.clone(),
    zone:      deal.zone.clone(),
    thousands: (cost / 1000.0).round() as u64,
  });
  summary
}

//! Detail pane for the deal under the cursor.

use lotline_core::{
  deal::{Deal, Source},
  feed::{NEW_FLAG, PRICE_CHANGED_FLAG},
  metrics::{DensityBand, DoorTier, acres, ask_per_lot_sq_ft, cost_per_door, density},
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{deal_table::priority_style, grouped, money};
use crate::app::{App, Screen};

const BAR_WIDTH: usize = 20;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane for the deal under the cursor.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let deal = app.cursor_deal();
  let title = deal.map(|d| format!(" {} ", d.name)).unwrap_or_else(|| " Detail ".into());

  let border = if app.screen == Screen::Detail {
    Style::default().fg(Color::Gray)
  } else {
    Style::default().fg(Color::DarkGray)
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(border);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(deal) = deal else {
    let hint = Paragraph::new("No deals match.").style(Style::default().fg(Color::DarkGray));
    f.render_widget(hint, inner);
    return;
  };

  f.render_widget(
    Paragraph::new(lines(deal)).wrap(Wrap { trim: false }),
    inner,
  );
}

// ─── Sections ─────────────────────────────────────────────────────────────────

fn label(text: &str) -> Span<'static> {
  Span::styled(
    format!("{text:<10}"),
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
  )
}

fn dim(text: impl Into<String>) -> Span<'static> {
  Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

fn tag_style(flag: &str) -> Style {
  if flag == NEW_FLAG {
    Style::default().fg(Color::Black).bg(Color::Green)
  } else if flag == PRICE_CHANGED_FLAG {
    Style::default().fg(Color::Black).bg(Color::Yellow)
  } else {
    Style::default().fg(Color::Black).bg(Color::Cyan)
  }
}

fn density_line(deal: &Deal) -> Line<'static> {
  let d = density(deal);
  let filled = ((d.indicator_pct / 100.0) * BAR_WIDTH as f64).round() as usize;
  let color = match d.band {
    DensityBand::High => Color::Red,
    DensityBand::Moderate => Color::Yellow,
    DensityBand::Low => Color::Green,
  };
  let upa = match d.units_per_acre {
    Some(upa) => format!("{upa} u/ac"),
    None => "— u/ac".to_string(),
  };

  Line::from(vec![
    label("Density"),
    Span::raw(format!("{upa:<10}")),
    Span::styled("█".repeat(filled), Style::default().fg(color)),
    dim("░".repeat(BAR_WIDTH.saturating_sub(filled))),
    Span::styled(format!(" {:?}", d.band).to_lowercase(), Style::default().fg(color)),
  ])
}

fn door_line(deal: &Deal) -> Line<'static> {
  let Some(k) = cost_per_door(deal) else {
    return Line::from(vec![label("$/door"), dim("—")]);
  };
  let (color, tier) = match DoorTier::of(k) {
    DoorTier::Strong => (Color::Green, "strong"),
    DoorTier::Fair => (Color::Yellow, "fair"),
    DoorTier::Rich => (Color::Red, "rich"),
  };
  Line::from(vec![
    label("$/door"),
    Span::styled(format!("${k}k"), Style::default().fg(color).add_modifier(Modifier::BOLD)),
    dim(format!("  {tier}")),
  ])
}

fn stat(name: &str, value: Option<String>) -> Line<'static> {
  match value {
    Some(v) => Line::from(vec![label(name), Span::raw(v)]),
    None => Line::from(vec![label(name), dim("—")]),
  }
}

fn lines(deal: &Deal) -> Vec<Line<'static>> {
  let mut lines = Vec::new();

  let mut place = deal.address.clone();
  if !deal.zip.is_empty() {
    place.push_str(&format!("  {}", deal.zip));
  }
  lines.push(Line::from(vec![
    Span::styled(deal.priority.to_string(), priority_style(deal.priority)),
    dim(format!("  {}  ", deal.source)),
    Span::raw(place),
  ]));
  lines.push(Line::from(""));

  lines.push(density_line(deal));
  lines.push(door_line(deal));
  lines.push(Line::from(""));

  lines.push(stat("Zone", deal.zone.clone()));
  lines.push(stat("Lot", deal.lot_sq_ft.map(|sf| format!("{} sf", grouped(sf)))));
  lines.push(stat("Acres", acres(deal).map(|a| format!("{a:.2}"))));
  lines.push(stat("Units", deal.units_res.map(|u| u.to_string())));
  lines.push(stat("Lodging", deal.units_lodging.map(|u| u.to_string())));
  lines.push(stat(
    "Mixed use",
    deal.mixed_use.map(|m| if m { "yes" } else { "no" }.to_string()),
  ));
  lines.push(stat("Ask", deal.ask_price.map(money)));
  lines.push(stat("Ask/SF", ask_per_lot_sq_ft(deal).map(|p| format!("${p}"))));

  if !deal.flags.is_empty() {
    lines.push(Line::from(""));
    let mut tags = vec![label("Tags")];
    for flag in &deal.flags {
      tags.push(Span::styled(format!(" {flag} "), tag_style(flag)));
      tags.push(Span::raw(" "));
    }
    lines.push(Line::from(tags));
  }

  if !deal.notes.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(deal.notes.clone()));
  }

  if deal.source == Source::Pipeline && !deal.price_history.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(label("History")));
    for point in &deal.price_history {
      let price = point
        .price
        .map(|p| money(p.max(0.0).round() as u64))
        .unwrap_or_else(|| "—".into());
      let date = point.date.clone().unwrap_or_default();
      lines.push(Line::from(vec![dim(format!("  {date:<18}")), Span::raw(price)]));
    }
  }

  if let Some(url) = &deal.url {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      url.clone(),
      Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
    )));
  }

  lines
}

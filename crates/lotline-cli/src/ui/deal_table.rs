//! The deal table.

use lotline_core::{
  deal::{Deal, Priority, Source},
  metrics::cost_per_door,
  query::{SortDirection, SortKey, SourceFilter},
};
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use strum::IntoEnumIterator as _;

use super::{grouped, money};
use crate::app::{App, Screen};

fn column_title(key: SortKey) -> &'static str {
  match key {
    SortKey::Priority => "Pri",
    SortKey::Name => "Name",
    SortKey::Address => "Address",
    SortKey::Zone => "Zone",
    SortKey::LotSqFt => "Lot SF",
    SortKey::UnitsRes => "Units",
    SortKey::UnitsLodging => "Lodg",
    SortKey::AskPrice => "Ask",
  }
}

pub fn priority_style(priority: Priority) -> Style {
  match priority {
    Priority::High => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    Priority::Medium => Style::default().fg(Color::Yellow),
    Priority::Low => Style::default().fg(Color::DarkGray),
  }
}

fn or_dash(value: Option<String>) -> String { value.unwrap_or_else(|| "—".into()) }

fn row(deal: &Deal) -> Row<'_> {
  let name_style = match deal.source {
    Source::Curated => Style::default(),
    Source::Pipeline => Style::default().fg(Color::Cyan),
  };
  let name = if deal.is_new {
    format!("● {}", deal.name)
  } else {
    deal.name.clone()
  };

  Row::new(vec![
    Cell::from(Span::styled(deal.priority.to_string(), priority_style(deal.priority))),
    Cell::from(Span::styled(name, name_style)),
    Cell::from(deal.address.as_str()),
    Cell::from(or_dash(deal.zone.clone())),
    Cell::from(or_dash(deal.lot_sq_ft.map(grouped))),
    Cell::from(or_dash(deal.units_res.map(|u| u.to_string()))),
    Cell::from(or_dash(deal.units_lodging.map(|u| u.to_string()))),
    Cell::from(or_dash(deal.ask_price.map(money))),
    Cell::from(or_dash(cost_per_door(deal).map(|k| format!("${k}k")))),
  ])
}

/// Render the deal table into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let view = app.view();
  let total = app.tracker.store().len();
  let sort = app.query.sort;

  let filtered = app.query.source != SourceFilter::All || !app.query.search.trim().is_empty();
  let title = if filtered {
    format!(" Deals · {} ({}/{}) ", app.query.source, view.len(), total)
  } else {
    format!(" Deals ({total}) ")
  };

  let border = if app.screen == Screen::Table {
    Style::default().fg(Color::Gray)
  } else {
    Style::default().fg(Color::DarkGray)
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(border);

  let mut inner = block.inner(area);
  f.render_widget(block, area);

  // Search line at the bottom of the pane while a query is set.
  if (app.search_active || !app.query.search.is_empty()) && inner.height > 2 {
    let search_area = Rect {
      y: inner.y + inner.height - 1,
      height: 1,
      ..inner
    };
    inner.height -= 1;

    let text = if app.search_active {
      format!("/{}_", app.query.search)
    } else {
      format!("/{}", app.query.search)
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      search_area,
    );
  }

  // Header: numbered sort keys with an arrow on the active one.
  let header = Row::new(SortKey::iter().enumerate().map(|(i, key)| {
    let arrow = match (key == sort.key, sort.direction) {
      (false, _) => "",
      (true, SortDirection::Ascending) => " ▲",
      (true, SortDirection::Descending) => " ▼",
    };
    Cell::from(Line::from(vec![
      Span::styled(format!("{}", i + 1), Style::default().fg(Color::DarkGray)),
      Span::raw(format!(" {}{arrow}", column_title(key))),
    ]))
  }).chain(std::iter::once(Cell::from("$/door"))))
  .style(Style::default().add_modifier(Modifier::BOLD));

  let widths = [
    Constraint::Length(8),
    Constraint::Min(18),
    Constraint::Min(16),
    Constraint::Length(10),
    Constraint::Length(10),
    Constraint::Length(8),
    Constraint::Length(7),
    Constraint::Length(9),
    Constraint::Length(7),
  ];

  let mut state = TableState::default();
  state.select(if view.is_empty() { None } else { Some(app.cursor) });

  let table = Table::new(view.iter().map(|d| row(d)), widths)
    .header(header)
    .row_highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    );
  f.render_stateful_widget(table, inner, &mut state);
}

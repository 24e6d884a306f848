//! Frame layout: header, metrics bar, body panes and status bar.

pub mod deal_detail;
pub mod deal_form;
pub mod deal_table;

use chrono::Local;
use lotline_core::{deal::Source, feed::group_thousands, tracker::FeedStatus};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, metrics, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // metrics
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_metrics(f, rows[1], app);
  draw_body(f, rows[2], app);
  draw_status(f, rows[3], app);
}

// ─── Formatting helpers ───────────────────────────────────────────────────────

/// `$1.25M`, `$425k`, `$900`.
pub fn money(amount: u64) -> String {
  match amount {
    1_000_000.. => format!("${:.2}M", amount as f64 / 1_000_000.0),
    1_000.. => format!("${}k", amount / 1_000),
    _ => format!("${amount}"),
  }
}

/// Whole counts with comma grouping: `16000` → `16,000`.
pub fn grouped(n: u64) -> String { group_thousands(n as f64) }

// ─── Header ───────────────────────────────────────────────────────────────────

fn feed_span(status: &FeedStatus) -> Span<'static> {
  match status {
    FeedStatus::Connecting => {
      Span::styled("Connecting…", Style::default().fg(Color::Yellow))
    }
    FeedStatus::Connected { new_listings, .. } => Span::styled(
      format!("Pipeline · {new_listings} new"),
      Style::default().fg(Color::Green),
    ),
    FeedStatus::Offline(_) => {
      Span::styled("Pipeline offline", Style::default().fg(Color::Red))
    }
  }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let store = app.tracker.store();
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " lotline  [/] search  [Tab] source  [1-8] sort  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let counts = Span::styled(
    format!(
      "  {} curated · {} pipeline  ",
      store.count(Source::Curated),
      store.count(Source::Pipeline),
    ),
    Style::default().fg(Color::Gray),
  );
  let feed = feed_span(app.tracker.status());
  let right = Span::styled(format!("  {date} "), Style::default().fg(Color::Gray));

  let used = [&left, &counts, &feed, &right]
    .iter()
    .map(|s| s.width() as u16)
    .sum::<u16>();
  let pad = area.width.saturating_sub(used);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    counts,
    feed,
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Metrics bar ──────────────────────────────────────────────────────────────

fn draw_metrics(f: &mut Frame, area: Rect, app: &App) {
  let summary = app.tracker.summary();
  let label = Style::default().fg(Color::DarkGray);
  let value = Style::default()
    .fg(Color::White)
    .add_modifier(Modifier::BOLD);

  let mut spans = vec![
    Span::styled(" Parcels ", label),
    Span::styled(summary.parcels.to_string(), value),
    Span::styled("  High ", label),
    Span::styled(summary.high_priority.to_string(), value),
    Span::styled("  Mixed-use ", label),
    Span::styled(summary.mixed_use.to_string(), value),
    Span::styled("  Units ", label),
    Span::styled(grouped(summary.total_units), value),
    Span::styled("  Total ask ", label),
    Span::styled(money(summary.total_ask), value),
    Span::styled("  Best $/door ", label),
  ];
  match &summary.best_door {
    Some(best) => {
      spans.push(Span::styled(format!("${}k", best.thousands), value));
      let zone = best.zone.as_deref().map(|z| format!(" · {z}")).unwrap_or_default();
      spans.push(Span::styled(format!(" ({}{zone})", best.name), label));
    }
    None => spans.push(Span::styled("—", label)),
  }

  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  if let (Screen::Form, Some(form)) = (&app.screen, &app.form) {
    deal_form::draw(f, area, form);
    return;
  }

  // Table on the left (60%), detail on the right (40%).
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);

  deal_table::draw(f, cols[0], app);
  deal_detail::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.screen {
    _ if app.search_active => ("SEARCH", "Type to filter  Esc clear  Enter done"),
    Screen::Table => (
      "NORMAL",
      "↑↓/jk move  Enter detail  a add  e edit  d delete  q quit",
    ),
    Screen::Detail => ("DETAIL", "↑↓/[] step  e edit  d delete  Esc back  q quit"),
    Screen::Form => (
      "EDIT",
      "Tab/↑↓ field  ←→ change  Enter save  Esc cancel",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use lotline_core::tracker::Tracker;
  use ratatui::{Terminal, backend::TestBackend};

  use super::*;

  #[test]
  fn money_scales() {
    assert_eq!(money(17_540_000), "$17.54M");
    assert_eq!(money(425_000), "$425k");
    assert_eq!(money(900), "$900");
  }

  #[test]
  fn grouped_matches_feed_formatting() {
    for n in [0, 999, 16_000, 1_234_567] {
      assert_eq!(grouped(n), group_thousands(n as f64));
    }
    assert_eq!(grouped(16_000), "16,000");
  }

  fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
    terminal.draw(|f| draw(f, app)).unwrap();
    let buffer = terminal.backend().buffer();
    buffer
      .content()
      .chunks(buffer.area.width as usize)
      .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  #[test]
  fn frame_shows_feed_status_and_metrics() {
    let mut app = App::new(Tracker::with_builtin_seed().unwrap());
    let screen = render(&app);
    assert!(screen.contains("Connecting…"));
    assert!(screen.contains("Parcels 10"));
    assert!(screen.contains("$17.54M"));

    app.apply_feed(Err(lotline_core::IngestionError::Status(502)));
    assert!(render(&app).contains("Pipeline offline"));
  }

  #[test]
  fn form_replaces_body() {
    let mut app = App::new(Tracker::with_builtin_seed().unwrap());
    app.handle_key(crossterm::event::KeyEvent::from(
      crossterm::event::KeyCode::Char('a'),
    ));
    let screen = render(&app);
    assert!(screen.contains("New deal"));
    assert!(screen.contains("Mixed use"));
  }
}

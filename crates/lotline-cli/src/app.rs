//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lotline_core::{
  IngestionError,
  deal::{Deal, DealId},
  feed::RawListing,
  query::{SortKey, ViewQuery},
  tracker::Tracker,
};
use strum::IntoEnumIterator as _;

use crate::form::{DealForm, FormAction};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the deal table; the detail pane previews the cursor row.
  Table,
  /// Focus on the detail pane.
  Detail,
  /// The add/edit form covers the body.
  Form,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// The session's deals and feed status.
  pub tracker: Tracker,

  /// Source filter, search text and sort applied to the table.
  pub query: ViewQuery,

  /// Whether the user is typing a search query.
  pub search_active: bool,

  /// Cursor position within the derived view.
  pub cursor: usize,

  /// Open form, when `screen` is [`Screen::Form`].
  pub form: Option<DealForm>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn new(tracker: Tracker) -> Self {
    Self {
      screen: Screen::Table,
      tracker,
      query: ViewQuery::default(),
      search_active: false,
      cursor: 0,
      form: None,
      status_msg: String::new(),
    }
  }

  // ── View ──────────────────────────────────────────────────────────────────

  /// The deals currently shown, in table order.
  pub fn view(&self) -> Vec<&Deal> { self.tracker.list_view(&self.query) }

  /// The deal under the cursor, if any.
  pub fn cursor_deal(&self) -> Option<&Deal> {
    self.view().get(self.cursor).copied()
  }

  fn clamp_cursor(&mut self) {
    let len = self.view().len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }

  /// Put the cursor on `id` if it is visible.
  fn focus(&mut self, id: DealId) {
    if let Some(pos) = self.view().iter().position(|d| d.id == id) {
      self.cursor = pos;
    }
  }

  // ── Feed ──────────────────────────────────────────────────────────────────

  /// Hand the resolved feed fetch to the tracker.
  pub fn apply_feed(&mut self, result: Result<Vec<RawListing>, IngestionError>) {
    let keep = self.cursor_deal().map(|d| d.id);
    if let Err(e) = &result {
      self.status_msg = format!("Feed offline: {e}");
    }
    self.tracker.apply_feed(result);
    match keep {
      Some(id) => self.focus(id),
      None => self.clamp_cursor(),
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.search_active {
      self.handle_search_key(key);
      return true;
    }

    match self.screen {
      Screen::Table => self.handle_table_key(key),
      Screen::Detail => self.handle_detail_key(key),
      Screen::Form => {
        self.handle_form_key(key);
        true
      }
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.query.search.clear();
      }
      KeyCode::Enter => self.search_active = false,
      KeyCode::Backspace => {
        self.query.search.pop();
      }
      KeyCode::Char(c) => self.query.search.push(c),
      _ => return,
    }
    self.cursor = 0;
  }

  fn handle_table_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
      KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if self.cursor_deal().is_some() {
          self.screen = Screen::Detail;
        }
      }

      // View controls
      KeyCode::Char('/') => {
        self.search_active = true;
        self.query.search.clear();
        self.cursor = 0;
      }
      KeyCode::Tab => {
        self.query.source = self.query.source.cycle();
        self.cursor = 0;
      }
      KeyCode::Char(c @ '1'..='8') => {
        let index = c as usize - '1' as usize;
        if let Some(sort_key) = SortKey::iter().nth(index) {
          let keep = self.cursor_deal().map(|d| d.id);
          self.query.sort.select(sort_key);
          if let Some(id) = keep {
            self.focus(id);
          }
        }
      }

      // Mutations
      KeyCode::Char('a') => self.open_form(DealForm::new()),
      KeyCode::Char('e') => self.edit_cursor_deal(),
      KeyCode::Char('d') => self.delete_cursor_deal(),

      _ => {}
    }
    true
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.screen = Screen::Table,

      // Step through the table without leaving the detail pane.
      KeyCode::Char(']') | KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
      KeyCode::Char('[') | KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),

      KeyCode::Char('e') => self.edit_cursor_deal(),
      KeyCode::Char('d') => {
        self.delete_cursor_deal();
        self.screen = Screen::Table;
      }

      _ => {}
    }
    true
  }

  fn handle_form_key(&mut self, key: KeyEvent) {
    let Some(form) = self.form.as_mut() else {
      self.screen = Screen::Table;
      return;
    };

    match form.handle_key(key) {
      FormAction::Continue => {}
      FormAction::Cancel => self.close_form(),
      FormAction::Save => self.save_form(),
    }
  }

  fn move_cursor(&mut self, delta: isize) {
    let len = self.view().len();
    if len == 0 {
      return;
    }
    self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  fn open_form(&mut self, form: DealForm) {
    self.form = Some(form);
    self.screen = Screen::Form;
  }

  fn close_form(&mut self) {
    self.form = None;
    self.screen = Screen::Table;
  }

  fn edit_cursor_deal(&mut self) {
    if let Some(form) = self.cursor_deal().map(DealForm::edit) {
      self.open_form(form);
    }
  }

  fn delete_cursor_deal(&mut self) {
    let Some(id) = self.cursor_deal().map(|d| d.id) else {
      return;
    };
    if let Some(deal) = self.tracker.delete(id) {
      self.status_msg = format!("Deleted {}", deal.name);
    }
    self.clamp_cursor();
  }

  /// Save the open form. A rejected save keeps the form open with the
  /// error shown.
  fn save_form(&mut self) {
    let Some(form) = self.form.as_mut() else {
      return;
    };

    let draft = form.to_draft();
    let saved = match form.editing {
      Some(id) => self.tracker.update(id, draft),
      None => self.tracker.create(draft),
    };

    match saved {
      Ok(deal) => {
        self.status_msg = format!("Saved {}", deal.name);
        self.close_form();
        self.focus(deal.id);
      }
      Err(e) => form.error = Some(e.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use lotline_core::{
    deal::Source,
    query::{SortDirection, SourceFilter},
    tracker::FeedStatus,
  };

  use super::*;

  fn app() -> App { App::new(Tracker::with_builtin_seed().unwrap()) }

  fn press(app: &mut App, code: KeyCode) -> bool { app.handle_key(KeyEvent::from(code)) }

  fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  #[test]
  fn quit_keys() {
    let mut app = app();
    assert!(!press(&mut app, KeyCode::Char('q')));
    assert!(!app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
  }

  #[test]
  fn search_narrows_and_esc_clears() {
    let mut app = app();
    press(&mut app, KeyCode::Char('/'));
    type_text(&mut app, "live local");
    assert!(app.search_active);
    assert!(app.view().len() < 10);
    assert!(!app.view().is_empty());

    press(&mut app, KeyCode::Esc);
    assert!(!app.search_active);
    assert_eq!(app.view().len(), 10);
  }

  #[test]
  fn q_is_text_while_searching() {
    let mut app = app();
    press(&mut app, KeyCode::Char('/'));
    assert!(press(&mut app, KeyCode::Char('q')));
    assert_eq!(app.query.search, "q");
  }

  #[test]
  fn tab_cycles_source_filter() {
    let mut app = app();
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.query.source, SourceFilter::Curated);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.query.source, SourceFilter::Pipeline);
    assert!(app.view().is_empty());
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.query.source, SourceFilter::All);
  }

  #[test]
  fn digit_keys_select_and_reverse_sort() {
    let mut app = app();
    press(&mut app, KeyCode::Char('2'));
    assert_eq!(app.query.sort.key, SortKey::Name);
    assert_eq!(app.query.sort.direction, SortDirection::Ascending);
    press(&mut app, KeyCode::Char('2'));
    assert_eq!(app.query.sort.key, SortKey::Name);
    assert_eq!(app.query.sort.direction, SortDirection::Descending);
  }

  #[test]
  fn cursor_stays_in_bounds() {
    let mut app = app();
    press(&mut app, KeyCode::Up);
    assert_eq!(app.cursor, 0);
    for _ in 0..20 {
      press(&mut app, KeyCode::Char('j'));
    }
    assert_eq!(app.cursor, 9);
  }

  #[test]
  fn add_with_blank_name_keeps_form_open() {
    let mut app = app();
    press(&mut app, KeyCode::Char('a'));
    assert_eq!(app.screen, Screen::Form);
    type_text(&mut app, "   ");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.screen, Screen::Form);
    assert!(app.form.as_ref().unwrap().error.is_some());
    assert_eq!(app.tracker.store().len(), 10);
  }

  #[test]
  fn add_saves_curated_record_and_focuses_it() {
    let mut app = app();
    press(&mut app, KeyCode::Char('a'));
    type_text(&mut app, "NW 7th Ave infill");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.screen, Screen::Table);
    assert!(app.form.is_none());
    assert_eq!(app.tracker.store().len(), 11);
    let deal = app.cursor_deal().unwrap();
    assert_eq!(deal.name, "NW 7th Ave infill");
    assert_eq!(deal.source, Source::Curated);
  }

  #[test]
  fn edit_replaces_in_place() {
    let mut app = app();
    let id = app.cursor_deal().unwrap().id;
    press(&mut app, KeyCode::Char('e'));
    type_text(&mut app, " (revised)");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.tracker.store().len(), 10);
    assert!(app.tracker.get(id).unwrap().name.ends_with(" (revised)"));
  }

  #[test]
  fn delete_from_detail_returns_to_table() {
    let mut app = app();
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.screen, Screen::Detail);
    let id = app.cursor_deal().unwrap().id;

    press(&mut app, KeyCode::Char('d'));
    assert_eq!(app.screen, Screen::Table);
    assert!(app.tracker.get(id).is_none());
    assert_eq!(app.view().len(), 9);
  }

  #[test]
  fn failed_feed_reports_offline() {
    let mut app = app();
    app.apply_feed(Err(IngestionError::Status(503)));
    assert!(matches!(app.tracker.status(), FeedStatus::Offline(_)));
    assert!(app.status_msg.contains("503"));
    assert_eq!(app.view().len(), 10);
  }
}

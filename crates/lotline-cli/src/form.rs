//! The add/edit form: one text buffer per field plus the two choice fields.

use crossterm::event::{KeyCode, KeyEvent};
use lotline_core::deal::{Deal, DealDraft, DealId, Priority, parse_flags};

// ─── Fields ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Name,
  Address,
  Zip,
  LotSqFt,
  Zone,
  UnitsRes,
  UnitsLodging,
  AskPrice,
  MixedUse,
  Priority,
  Flags,
  Url,
  Notes,
}

impl Field {
  pub const ALL: [Field; 13] = [
    Field::Name,
    Field::Address,
    Field::Zip,
    Field::LotSqFt,
    Field::Zone,
    Field::UnitsRes,
    Field::UnitsLodging,
    Field::AskPrice,
    Field::MixedUse,
    Field::Priority,
    Field::Flags,
    Field::Url,
    Field::Notes,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Field::Name => "Name",
      Field::Address => "Address",
      Field::Zip => "Zip",
      Field::LotSqFt => "Lot SF",
      Field::Zone => "Zone",
      Field::UnitsRes => "Units",
      Field::UnitsLodging => "Lodging",
      Field::AskPrice => "Ask $",
      Field::MixedUse => "Mixed use",
      Field::Priority => "Priority",
      Field::Flags => "Tags",
      Field::Url => "URL",
      Field::Notes => "Notes",
    }
  }

  /// Numeric fields only take digits.
  pub fn is_numeric(self) -> bool {
    matches!(
      self,
      Field::LotSqFt | Field::UnitsRes | Field::UnitsLodging | Field::AskPrice
    )
  }

  /// Fields edited with Left/Right rather than typed.
  pub fn is_choice(self) -> bool { matches!(self, Field::MixedUse | Field::Priority) }
}

/// What the form wants the app to do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
  Continue,
  Save,
  Cancel,
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DealForm {
  /// Record being edited; `None` when adding.
  pub editing:   Option<DealId>,
  pub cursor:    usize,
  /// `None` is unknown and is kept that way unless changed.
  pub mixed_use: Option<bool>,
  pub priority:  Priority,
  /// Last save failure, shown under the fields.
  pub error:     Option<String>,
  inputs:        [String; Field::ALL.len()],
}

impl Default for DealForm {
  fn default() -> Self { Self::new() }
}

/// no → yes → unknown → no.
fn next_mixed_use(value: Option<bool>) -> Option<bool> {
  match value {
    Some(false) => Some(true),
    Some(true) => None,
    None => Some(false),
  }
}

fn prev_mixed_use(value: Option<bool>) -> Option<bool> {
  match value {
    Some(false) => None,
    None => Some(true),
    Some(true) => Some(false),
  }
}

fn index_of(field: Field) -> usize {
  Field::ALL.iter().position(|f| *f == field).unwrap_or_default()
}

fn number_text<T: ToString>(value: Option<T>) -> String {
  value.map(|v| v.to_string()).unwrap_or_default()
}

fn non_blank(text: &str) -> Option<String> {
  let trimmed = text.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl DealForm {
  /// An empty form for a new record.
  pub fn new() -> Self {
    Self {
      editing:   None,
      cursor:    0,
      mixed_use: Some(false),
      priority:  Priority::default(),
      error:     None,
      inputs:    Default::default(),
    }
  }

  /// A form pre-filled from `deal`.
  pub fn edit(deal: &Deal) -> Self {
    let mut form = Self::new();
    form.editing = Some(deal.id);
    form.mixed_use = deal.mixed_use;
    form.priority = deal.priority;

    *form.input_mut(Field::Name) = deal.name.clone();
    *form.input_mut(Field::Address) = deal.address.clone();
    *form.input_mut(Field::Zip) = deal.zip.clone();
    *form.input_mut(Field::LotSqFt) = number_text(deal.lot_sq_ft);
    *form.input_mut(Field::Zone) = deal.zone.clone().unwrap_or_default();
    *form.input_mut(Field::UnitsRes) = number_text(deal.units_res);
    *form.input_mut(Field::UnitsLodging) = number_text(deal.units_lodging);
    *form.input_mut(Field::AskPrice) = number_text(deal.ask_price);
    *form.input_mut(Field::Flags) = deal.flags.join(", ");
    *form.input_mut(Field::Url) = deal.url.clone().unwrap_or_default();
    *form.input_mut(Field::Notes) = deal.notes.clone();
    form
  }

  pub fn field(&self) -> Field { Field::ALL[self.cursor] }

  pub fn input(&self, field: Field) -> &str { &self.inputs[index_of(field)] }

  fn input_mut(&mut self, field: Field) -> &mut String {
    &mut self.inputs[index_of(field)]
  }

  /// The text shown for `field`, including the choice fields.
  pub fn display(&self, field: Field) -> String {
    match field {
      Field::MixedUse => match self.mixed_use {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
      }
      .to_string(),
      Field::Priority => self.priority.to_string(),
      _ => self.input(field).to_string(),
    }
  }

  /// The editable fields as entered. Empty numbers are unknown and an ask
  /// of zero is no ask.
  pub fn to_draft(&self) -> DealDraft {
    let number = |field| self.input(field).parse::<u64>().ok();
    let small = |field| self.input(field).parse::<u32>().ok();

    DealDraft {
      name:          self.input(Field::Name).to_string(),
      address:       self.input(Field::Address).trim().to_string(),
      zip:           self.input(Field::Zip).trim().to_string(),
      lot_sq_ft:     number(Field::LotSqFt),
      zone:          non_blank(self.input(Field::Zone)),
      units_res:     small(Field::UnitsRes),
      units_lodging: small(Field::UnitsLodging),
      mixed_use:     self.mixed_use,
      ask_price:     number(Field::AskPrice).filter(|ask| *ask > 0),
      notes:         self.input(Field::Notes).to_string(),
      flags:         parse_flags(self.input(Field::Flags)),
      priority:      self.priority,
      url:           non_blank(self.input(Field::Url)),
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
    let field = self.field();
    match key.code {
      KeyCode::Esc => return FormAction::Cancel,
      KeyCode::Enter => return FormAction::Save,

      KeyCode::Tab | KeyCode::Down => {
        self.cursor = (self.cursor + 1) % Field::ALL.len();
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.cursor = (self.cursor + Field::ALL.len() - 1) % Field::ALL.len();
      }

      KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if field.is_choice() => {
        match field {
          Field::MixedUse if key.code == KeyCode::Left => {
            self.mixed_use = prev_mixed_use(self.mixed_use);
          }
          Field::MixedUse => self.mixed_use = next_mixed_use(self.mixed_use),
          _ if key.code == KeyCode::Left => {
            self.priority = self.priority.cycle().cycle();
          }
          _ => self.priority = self.priority.cycle(),
        }
      }

      KeyCode::Backspace if !field.is_choice() => {
        self.input_mut(field).pop();
      }
      KeyCode::Char(c) if !field.is_choice() => {
        if field.is_numeric() && !c.is_ascii_digit() {
          return FormAction::Continue;
        }
        self.input_mut(field).push(c);
      }

      _ => {}
    }
    FormAction::Continue
  }
}

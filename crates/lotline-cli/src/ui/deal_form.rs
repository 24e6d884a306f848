//! Add/edit form, drawn over the body while open.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::form::{DealForm, Field};

pub fn draw(f: &mut Frame, area: Rect, form: &DealForm) {
  let title = match form.editing {
    Some(_) => " Edit deal ",
    None => " New deal ",
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let current = form.field();
  let mut lines: Vec<Line> = Field::ALL
    .iter()
    .map(|&field| {
      let focused = field == current;
      let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::Cyan)
      };

      let mut value = form.display(field);
      if focused {
        if field.is_choice() {
          value = format!("‹ {value} ›");
        } else {
          value.push('_');
        }
      }

      Line::from(vec![
        Span::styled(format!("{:<11}", field.label()), label_style),
        Span::raw(value),
      ])
    })
    .collect();

  if let Some(error) = &form.error {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      error.clone(),
      Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )));
  }

  f.render_widget(Paragraph::new(lines), inner);
}

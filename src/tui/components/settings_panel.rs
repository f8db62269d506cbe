//! Settings panel component
//!
//! Owns all state for the Settings view: the highlight palette and the
//! history reprocessing action below it. Applying a choice is left to the
//! App, which holds the settings context and the history.

use super::highlight_style_color;
use crate::aura::HighlightColor;
use crate::tui::traits::{Handled, Interactive};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// What the cursor is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    Color(HighlightColor),
    Reprocess,
}

const ITEM_COUNT: usize = HighlightColor::ALL.len() + 1;

#[derive(Default)]
pub struct SettingsPanel {
    pub selected: usize,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put the cursor on the active color (call when entering Settings)
    pub fn focus_color(&mut self, color: HighlightColor) {
        self.selected = color.index();
    }

    pub fn selected_item(&self) -> SettingsItem {
        HighlightColor::ALL
            .get(self.selected)
            .map(|c| SettingsItem::Color(*c))
            .unwrap_or(SettingsItem::Reprocess)
    }

    pub fn render(&self, f: &mut Frame, area: Rect, active: HighlightColor) {
        let mut items: Vec<ListItem> = HighlightColor::ALL
            .iter()
            .map(|color| {
                let marker = if *color == active { "●" } else { "○" };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ", marker)),
                    Span::styled(
                        color.as_str(),
                        Style::default().fg(highlight_style_color(*color)),
                    ),
                ]))
            })
            .collect();
        items.push(ListItem::new(""));
        items.push(ListItem::new("[ Reprocess History ]"));

        // The spacer row sits between the palette and the action
        let row = match self.selected_item() {
            SettingsItem::Color(_) => self.selected,
            SettingsItem::Reprocess => self.selected + 1,
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Highlight color "),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");

        let mut state = ListState::default().with_selected(Some(row));
        f.render_stateful_widget(list, area, &mut state);
    }
}

impl Interactive for SettingsPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                Handled::Yes
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < ITEM_COUNT {
                    self.selected += 1;
                }
                Handled::Yes
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.selected = 0;
                Handled::Yes
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = ITEM_COUNT - 1;
                Handled::Yes
            }
            _ => Handled::No,
        }
    }

    fn hints(&self) -> &'static str {
        "↑↓ select  Enter apply  Esc back"
    }
}

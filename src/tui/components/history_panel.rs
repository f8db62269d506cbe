//! History list component
//!
//! Owns selection and scroll position over the captured requests. With no
//! explicit selection it follows the newest entry.

use super::highlight_style_color;
use crate::history::{History, HistoryEntry};
use crate::tui::traits::{Handled, Interactive};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

#[derive(Default)]
pub struct HistoryPanel {
    /// Selected display index (None = follow newest)
    pub selected: Option<usize>,
    /// Cached entry count, synced every frame
    entry_count: usize,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sync with the current history length (call each frame)
    pub fn sync(&mut self, entry_count: usize) {
        self.entry_count = entry_count;
        if let Some(idx) = self.selected {
            if idx >= entry_count {
                self.selected = entry_count.checked_sub(1);
            }
        }
    }

    /// Index the user is pointing at, following the newest entry by default
    pub fn current(&self) -> Option<usize> {
        self.selected.or_else(|| self.entry_count.checked_sub(1))
    }

    fn select_previous(&mut self) {
        if let Some(idx) = self.current() {
            self.selected = Some(idx.saturating_sub(1));
        }
    }

    fn select_next(&mut self) {
        if let Some(idx) = self.current() {
            if idx + 1 >= self.entry_count {
                // Past the end: back to follow mode
                self.selected = None;
            } else {
                self.selected = Some(idx + 1);
            }
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, history: &History) {
        let items: Vec<ListItem> = history.iter().map(entry_item).collect();

        let title = format!(
            " History ({} requests, {} highlighted){} ",
            history.len(),
            history.highlighted_count(),
            if self.selected.is_none() { " [follow]" } else { "" }
        );

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");

        let mut state = ListState::default().with_selected(self.current());
        f.render_stateful_widget(list, area, &mut state);
    }
}

impl Interactive for HistoryPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_previous();
                Handled::Yes
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                Handled::Yes
            }
            KeyCode::Home | KeyCode::Char('g') => {
                if self.entry_count > 0 {
                    self.selected = Some(0);
                }
                Handled::Yes
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = None;
                Handled::Yes
            }
            _ => Handled::No,
        }
    }

    fn hints(&self) -> &'static str {
        "↑↓ select  Enter edit  s settings  q quit"
    }
}

/// One formatted row, colored when the entry is highlighted
pub fn format_entry(entry: &HistoryEntry) -> String {
    let status = entry
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "...".to_string());
    let duration = entry
        .duration
        .map(|d| format!("{}ms", d.as_millis()))
        .unwrap_or_default();

    format!(
        "#{:<4} {} {:<6} {:<3} {:>7} {:<6} {}",
        entry.id,
        entry.timestamp.format("%H:%M:%S"),
        entry.origin.as_str(),
        status,
        duration,
        entry.request.method(),
        entry.request.target()
    )
}

fn entry_item(entry: &HistoryEntry) -> ListItem<'static> {
    let style = match entry.highlight {
        Some(color) => Style::default()
            .fg(highlight_style_color(color))
            .add_modifier(Modifier::BOLD),
        None => Style::default().fg(Color::White),
    };
    ListItem::new(format_entry(entry)).style(style)
}

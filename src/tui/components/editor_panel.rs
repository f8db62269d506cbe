//! Aura editor component
//!
//! Wraps a `ParameterEditor` over one history entry: one tab per watched
//! parameter, a text area for the active tab, and the cursor. Saving and
//! replaying need the history and proxy, so the App handles those keys.

use crate::aura::{ParameterEditor, ParameterSnapshot, TextBuffer, TextSurface};
use crate::http::HttpRequest;
use crate::tui::traits::{Handled, Interactive};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub struct EditorPanel {
    editor: ParameterEditor<HttpRequest>,
    /// History entry being edited
    pub source: Option<u64>,
}

impl EditorPanel {
    /// Open an editor on `request`, seeded from a copy of the last-seen
    /// snapshot. Returns None if the request carries no Aura parameters.
    pub fn open(
        request: HttpRequest,
        source: Option<u64>,
        snapshot: ParameterSnapshot,
    ) -> Option<Self> {
        if !ParameterEditor::is_enabled(Some(&request)) {
            return None;
        }
        let mut editor = ParameterEditor::new(true, snapshot);
        editor.set_message(Some(request));
        Some(Self { editor, source })
    }

    pub fn editor(&self) -> &ParameterEditor<HttpRequest> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ParameterEditor<HttpRequest> {
        &mut self.editor
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let titles: Vec<Line> = self
            .editor
            .tabs()
            .iter()
            .map(|name| {
                let modified = self
                    .editor
                    .surface(name)
                    .is_some_and(TextSurface::is_modified);
                Line::from(if modified {
                    format!("{}*", name)
                } else {
                    name.to_string()
                })
            })
            .collect();

        let target = self
            .editor
            .current()
            .map(|r| r.to_string())
            .unwrap_or_default();
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Aura: {} ", target)),
            )
            .select(self.editor.active_tab())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, chunks[0]);

        render_buffer(f, chunks[1], self.editor.active_surface());
    }
}

/// Text area with the cursor kept in view
fn render_buffer(f: &mut Frame, area: Rect, buffer: &TextBuffer) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let (row, col) = buffer.cursor();
    let offset = (row + 1).saturating_sub(inner_height);

    let lines: Vec<Line> = buffer
        .lines()
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect();

    let title = if !buffer.is_editable() {
        " Value (not in this request) "
    } else if buffer.is_modified() {
        " Value (modified) "
    } else {
        " Value "
    };
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((offset as u16, 0));
    f.render_widget(paragraph, area);

    // Display width of the text left of the cursor
    let prefix: String = buffer.lines()[row].chars().take(col).collect();
    let x = area.x + 1 + prefix.width() as u16;
    let y = area.y + 1 + (row - offset) as u16;
    if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
        f.set_cursor_position(Position::new(x, y));
    }
}

impl Interactive for EditorPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        // Ctrl chords (save, replay) belong to the App
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Handled::No;
        }

        match key.code {
            KeyCode::Tab => {
                self.editor.next_tab();
                return Handled::Yes;
            }
            KeyCode::BackTab => {
                self.editor.prev_tab();
                return Handled::Yes;
            }
            _ => {}
        }

        let buffer = self.editor.active_surface_mut();
        match key.code {
            KeyCode::Char(c) => buffer.insert_char(c),
            KeyCode::Enter => buffer.insert_newline(),
            KeyCode::Backspace => buffer.backspace(),
            KeyCode::Delete => buffer.delete(),
            KeyCode::Left => buffer.move_left(),
            KeyCode::Right => buffer.move_right(),
            KeyCode::Up => buffer.move_up(),
            KeyCode::Down => buffer.move_down(),
            KeyCode::Home => buffer.move_home(),
            KeyCode::End => buffer.move_end(),
            _ => return Handled::No,
        }
        Handled::Yes
    }

    fn hints(&self) -> &'static str {
        "Tab next param  Ctrl+S save  Ctrl+R replay  Esc back"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::ParamRequest;

    const REQUEST: &str = "POST /s/sfsites/aura HTTP/1.1\r\n\
Content-Type: application/x-www-form-urlencoded\r\n\
\r\n\
message=%7B%22a%22%3A1%7D&aura.pageURI=%2Fs%2Fhome";

    fn panel() -> EditorPanel {
        let request = HttpRequest::parse(REQUEST.as_bytes()).unwrap();
        EditorPanel::open(request, Some(1), ParameterSnapshot::new()).unwrap()
    }

    fn press(panel: &mut EditorPanel, code: KeyCode) -> Handled {
        panel.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_open_rejects_non_aura_requests() {
        let request = HttpRequest::parse(b"GET /?q=1 HTTP/1.1\r\n\r\n").unwrap();
        assert!(EditorPanel::open(request, None, ParameterSnapshot::new()).is_none());
    }

    #[test]
    fn test_typing_edits_active_tab() {
        let mut panel = panel();
        // aura.pageURI is the third tab
        press(&mut panel, KeyCode::Tab);
        press(&mut panel, KeyCode::Tab);
        assert_eq!(panel.editor().active_tab(), 2);

        press(&mut panel, KeyCode::End);
        for c in "/x".chars() {
            press(&mut panel, KeyCode::Char(c));
        }

        let surface = panel.editor().surface("aura.pageURI").unwrap();
        assert_eq!(surface.text(), "/s/home/x");
        assert!(panel.editor().is_modified());

        let updated = panel.editor_mut().commit().unwrap();
        let value = updated
            .params()
            .into_iter()
            .find(|p| p.name == "aura.pageURI")
            .unwrap()
            .value;
        assert_eq!(value, "/s/home/x");
    }

    #[test]
    fn test_typing_in_absent_tab_changes_nothing() {
        let mut panel = panel();
        // aura.context is not in the request
        press(&mut panel, KeyCode::Tab);
        assert!(!panel.editor().active_surface().is_editable());

        press(&mut panel, KeyCode::Char('x'));
        assert_eq!(panel.editor().surface("aura.context").unwrap().text(), "");
        assert!(!panel.editor().is_modified());
    }

    #[test]
    fn test_ctrl_keys_bubble_up() {
        let mut panel = panel();
        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(panel.handle_key(save), Handled::No);
        assert!(!panel.editor().is_modified());
    }
}

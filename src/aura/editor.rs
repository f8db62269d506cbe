//! Parameter editor: three editable surfaces, one per watched parameter
//!
//! An editor instance is created for each request view. It receives its
//! own copy of the last-seen [`ParameterSnapshot`] and never shares
//! mutable state with other instances.

use super::request::ParamRequest;
use super::rewrite::rewrite;
use super::snapshot::ParameterSnapshot;
use super::transform;
use super::{matches, WATCHED_PARAMS};
use std::borrow::Cow;

/// A text widget the editor can drive
pub trait TextSurface {
    fn text(&self) -> String;

    /// Replace the content and clear the modified flag
    fn set_text(&mut self, text: &str);

    /// Whether the content changed since the last `set_text`
    fn is_modified(&self) -> bool;

    fn clear(&mut self) {
        self.set_text("");
    }
}

/// Multi-line text buffer with a cursor
///
/// Cursor columns are counted in chars, not bytes.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,
    row: usize,
    col: usize,
    modified: bool,
    editable: bool,
}

impl TextBuffer {
    pub fn new(editable: bool) -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            modified: false,
            editable,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// (row, col) of the cursor
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_offset(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    fn touch(&mut self) -> bool {
        if self.editable {
            self.modified = true;
        }
        self.editable
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.insert_newline();
            return;
        }
        if !self.touch() {
            return;
        }
        let line = &mut self.lines[self.row];
        let at = Self::byte_offset(line, self.col);
        line.insert(at, c);
        self.col += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    pub fn insert_newline(&mut self) {
        if !self.touch() {
            return;
        }
        let line = &mut self.lines[self.row];
        let at = Self::byte_offset(line, self.col);
        let rest = line.split_off(at);
        self.row += 1;
        self.col = 0;
        self.lines.insert(self.row, rest);
    }

    /// Delete the char before the cursor, joining lines at column 0
    pub fn backspace(&mut self) {
        if !self.editable || (self.row == 0 && self.col == 0) {
            return;
        }
        self.touch();
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let at = Self::byte_offset(line, self.col - 1);
            line.remove(at);
            self.col -= 1;
        } else {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
        }
    }

    /// Delete the char under the cursor, joining lines at end of line
    pub fn delete(&mut self) {
        if !self.editable {
            return;
        }
        let len = self.line_len(self.row);
        if self.col < len {
            self.touch();
            let line = &mut self.lines[self.row];
            let at = Self::byte_offset(line, self.col);
            line.remove(at);
        } else if self.row + 1 < self.lines.len() {
            self.touch();
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.line_len(self.row);
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TextSurface for TextBuffer {
    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.row = 0;
        self.col = 0;
        self.modified = false;
    }

    fn is_modified(&self) -> bool {
        self.modified
    }
}

/// Editor over the three watched parameters of one request
pub struct ParameterEditor<R> {
    editable: bool,
    snapshot: ParameterSnapshot,
    surfaces: [TextBuffer; 3],
    current: Option<R>,
    active: usize,
}

impl<R: ParamRequest> ParameterEditor<R> {
    /// New editor holding its own copy of the last-seen snapshot
    ///
    /// Surfaces stay empty until a request is loaded.
    pub fn new(editable: bool, snapshot: ParameterSnapshot) -> Self {
        Self {
            editable,
            snapshot,
            surfaces: std::array::from_fn(|_| TextBuffer::new(editable)),
            current: None,
            active: 0,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn snapshot(&self) -> &ParameterSnapshot {
        &self.snapshot
    }

    /// Whether this editor applies to `request` at all
    pub fn is_enabled(request: Option<&R>) -> bool {
        request.is_some_and(|r| {
            let names = r.param_names();
            matches(names.iter().map(String::as_str))
        })
    }

    /// Load a request (or clear everything with `None`)
    ///
    /// Watched parameters absent from the request get an empty read-only
    /// surface, since there is nothing in the request to write back to.
    pub fn set_message(&mut self, request: Option<R>) {
        let Some(request) = request else {
            self.current = None;
            for surface in &mut self.surfaces {
                surface.clear();
                surface.set_editable(self.editable);
            }
            return;
        };

        let params = request.params();
        for (i, name) in WATCHED_PARAMS.iter().enumerate() {
            let surface = &mut self.surfaces[i];
            match params.iter().rev().find(|p| p.name == *name) {
                Some(param) => {
                    surface.set_text(&transform::decode(&param.value));
                    surface.set_editable(self.editable);
                }
                None => {
                    surface.clear();
                    surface.set_editable(false);
                }
            }
        }
        self.current = Some(request);
    }

    pub fn current(&self) -> Option<&R> {
        self.current.as_ref()
    }

    pub fn is_modified(&self) -> bool {
        self.surfaces.iter().any(TextSurface::is_modified)
    }

    /// The request with edits applied, or the loaded request untouched
    pub fn get_message(&self) -> Option<Cow<'_, R>> {
        let request = self.current.as_ref()?;
        Some(rewrite(request, self.named_surfaces()))
    }

    /// Apply pending edits and reload the editor from the result
    ///
    /// Returns the new request if anything changed.
    pub fn commit(&mut self) -> Option<R> {
        let updated = match self.get_message()? {
            Cow::Borrowed(_) => return None,
            Cow::Owned(updated) => updated,
        };
        self.set_message(Some(updated.clone()));
        Some(updated)
    }

    fn named_surfaces(&self) -> impl Iterator<Item = (&'static str, &TextBuffer)> + '_ {
        WATCHED_PARAMS.iter().copied().zip(self.surfaces.iter())
    }

    pub fn surface(&self, name: &str) -> Option<&TextBuffer> {
        let i = WATCHED_PARAMS.iter().position(|n| *n == name)?;
        Some(&self.surfaces[i])
    }

    pub fn surface_mut(&mut self, name: &str) -> Option<&mut TextBuffer> {
        let i = WATCHED_PARAMS.iter().position(|n| *n == name)?;
        Some(&mut self.surfaces[i])
    }

    /// Tab titles, in display order
    pub fn tabs(&self) -> [&'static str; 3] {
        WATCHED_PARAMS
    }

    pub fn active_tab(&self) -> usize {
        self.active
    }

    pub fn next_tab(&mut self) {
        self.active = (self.active + 1) % self.surfaces.len();
    }

    pub fn prev_tab(&mut self) {
        self.active = (self.active + self.surfaces.len() - 1) % self.surfaces.len();
    }

    pub fn active_surface(&self) -> &TextBuffer {
        &self.surfaces[self.active]
    }

    pub fn active_surface_mut(&mut self) -> &mut TextBuffer {
        &mut self.surfaces[self.active]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpRequest;

    const AURA_REQUEST: &str = "POST /s/sfsites/aura?r=1 HTTP/1.1\r\n\
        Host: example.my.site.com\r\n\
        Content-Type: application/x-www-form-urlencoded\r\n\
        Content-Length: 84\r\n\
        \r\n\
        message=%7B%22a%22%3A1%7D&aura.context=%7B%22mode%22%3A%22PROD%22%7D&aura.token=null";

    fn aura_request() -> HttpRequest {
        HttpRequest::parse(AURA_REQUEST.as_bytes()).expect("valid request")
    }

    #[test]
    fn test_buffer_edit_sets_modified() {
        let mut buf = TextBuffer::new(true);
        buf.set_text("abc");
        assert!(!buf.is_modified());

        buf.move_end();
        buf.insert_char('d');
        assert!(buf.is_modified());
        assert_eq!(buf.text(), "abcd");

        buf.set_text("fresh");
        assert!(!buf.is_modified());
    }

    #[test]
    fn test_buffer_newline_and_backspace_join() {
        let mut buf = TextBuffer::new(true);
        buf.set_text("ab");
        buf.move_right();
        buf.insert_newline();
        assert_eq!(buf.text(), "a\nb");
        assert_eq!(buf.cursor(), (1, 0));

        buf.backspace();
        assert_eq!(buf.text(), "ab");
        assert_eq!(buf.cursor(), (0, 1));
    }

    #[test]
    fn test_buffer_delete_joins_next_line() {
        let mut buf = TextBuffer::new(true);
        buf.set_text("a\nb");
        buf.move_end();
        buf.delete();
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn test_buffer_handles_multibyte_chars() {
        let mut buf = TextBuffer::new(true);
        buf.set_text("héllo");
        buf.move_right();
        buf.move_right();
        buf.backspace();
        assert_eq!(buf.text(), "hllo");
        buf.insert_char('✓');
        assert_eq!(buf.text(), "h✓llo");
    }

    #[test]
    fn test_read_only_buffer_ignores_edits() {
        let mut buf = TextBuffer::new(false);
        buf.set_text("fixed");
        buf.insert_str("x\ny");
        buf.backspace();
        buf.delete();
        assert_eq!(buf.text(), "fixed");
        assert!(!buf.is_modified());
    }

    #[test]
    fn test_set_message_decodes_present_params() {
        let mut editor = ParameterEditor::new(true, ParameterSnapshot::new());
        editor.set_message(Some(aura_request()));

        assert_eq!(editor.surface("message").unwrap().text(), "{\n    \"a\": 1\n}");
        assert_eq!(
            editor.surface("aura.context").unwrap().text(),
            "{\n    \"mode\": \"PROD\"\n}"
        );
        assert_eq!(editor.surface("aura.pageURI").unwrap().text(), "");
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_set_message_none_clears() {
        let mut editor = ParameterEditor::new(true, ParameterSnapshot::new());
        editor.set_message(Some(aura_request()));
        editor.set_message(None);

        assert!(editor.current().is_none());
        assert!(editor.get_message().is_none());
        for name in WATCHED_PARAMS {
            assert_eq!(editor.surface(name).unwrap().text(), "");
        }
    }

    #[test]
    fn test_unmodified_editor_returns_identical_request() {
        let mut editor = ParameterEditor::new(true, ParameterSnapshot::new());
        let request = aura_request();
        editor.set_message(Some(request.clone()));

        let out = editor.get_message().unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.to_bytes(), request.to_bytes());
    }

    #[test]
    fn test_commit_rewrites_edited_param() {
        let mut editor = ParameterEditor::new(true, ParameterSnapshot::new());
        editor.set_message(Some(aura_request()));

        let surface = editor.surface_mut("message").unwrap();
        surface.set_text("");
        surface.insert_str("{\n    \"a\": 2\n}");
        assert!(editor.is_modified());

        let updated = editor.commit().expect("request changed");
        let body = String::from_utf8(updated.body().to_vec()).unwrap();
        assert!(body.starts_with("message=%7B%22a%22%3A2%7D&"));
        assert!(body.ends_with("&aura.token=null"));
        assert!(!editor.is_modified());
        assert!(editor.commit().is_none());
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let snapshot = ParameterSnapshot::from_params(&aura_request().params());
        let mut first = ParameterEditor::new(true, snapshot.clone());
        let mut second = ParameterEditor::new(true, snapshot.clone());
        first.set_message(Some(aura_request()));
        second.set_message(Some(aura_request()));

        first.surface_mut("message").unwrap().insert_str("edit");
        assert!(first.is_modified());
        assert!(!second.is_modified());
        assert_eq!(second.surface("message").unwrap().text(), "{\n    \"a\": 1\n}");
        assert_eq!(first.snapshot(), &snapshot);
        assert_eq!(second.snapshot(), &snapshot);
    }

    #[test]
    fn test_absent_params_are_empty_and_read_only() {
        let snapshot = ParameterSnapshot::from_params(&aura_request().params());
        let mut editor = ParameterEditor::new(true, snapshot);

        let other = HttpRequest::parse(
            b"POST /aura HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\naura.pageURI=%2Fs%2Fhome",
        )
        .unwrap();
        editor.set_message(Some(other));

        assert_eq!(editor.surface("aura.pageURI").unwrap().text(), "/s/home");
        assert!(editor.surface("aura.pageURI").unwrap().is_editable());

        let message = editor.surface_mut("message").unwrap();
        assert_eq!(message.text(), "");
        assert!(!message.is_editable());
        message.insert_str("{\"a\": 2}");
        assert_eq!(message.text(), "");
        assert!(!editor.is_modified());
        assert!(editor.commit().is_none());

        // A request that carries the parameter makes the tab editable again
        editor.set_message(Some(aura_request()));
        assert!(editor.surface("message").unwrap().is_editable());
    }

    #[test]
    fn test_is_enabled_uses_matcher() {
        assert!(ParameterEditor::is_enabled(Some(&aura_request())));
        let plain = HttpRequest::parse(b"GET /index.html?q=1 HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        assert!(!ParameterEditor::is_enabled(Some(&plain)));
        assert!(!ParameterEditor::<HttpRequest>::is_enabled(None));
    }

    #[test]
    fn test_tab_cycling() {
        let mut editor: ParameterEditor<HttpRequest> =
            ParameterEditor::new(true, ParameterSnapshot::new());
        assert_eq!(editor.tabs()[editor.active_tab()], "message");
        editor.next_tab();
        editor.next_tab();
        assert_eq!(editor.tabs()[editor.active_tab()], "aura.pageURI");
        editor.next_tab();
        assert_eq!(editor.active_tab(), 0);
        editor.prev_tab();
        assert_eq!(editor.active_tab(), 2);
    }
}

// TUI application state
//
// The App owns the highlight settings context (the only writer of the
// color), the open editor and the view components. History, inspector and
// proxy are shared with the proxy tasks.

use super::components::{EditorPanel, HistoryPanel, SettingsItem, SettingsPanel, Toast};
use crate::aura::{reprocess, HighlightColor, HighlightSettings, Inspector};
use crate::config::Config;
use crate::events::ProxyEvent;
use crate::history::SharedHistory;
use crate::logging::LogBuffer;
use crate::proxy::ProxyState;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Different views the TUI can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    History,
    Editor,
    Settings,
}

impl View {
    /// Display name for the title bar
    pub fn name(&self) -> &'static str {
        match self {
            View::History => "History",
            View::Editor => "Editor",
            View::Settings => "Settings",
        }
    }
}

/// Main application state for the TUI
pub struct App {
    pub view: View,
    pub should_quit: bool,
    pub start_time: Instant,

    pub config: Config,
    /// Where a changed color is persisted (None disables persistence)
    settings_path: Option<PathBuf>,
    pub highlight: HighlightSettings,

    pub history: SharedHistory,
    inspector: Arc<Mutex<Inspector>>,
    /// Present when replay can reach upstream
    proxy: Option<ProxyState>,
    pub log_buffer: LogBuffer,

    // Components (own their state)
    pub history_panel: HistoryPanel,
    pub editor: Option<EditorPanel>,
    pub settings_panel: SettingsPanel,
    pub toast: Option<Toast>,
}

impl App {
    pub fn new(
        config: Config,
        highlight: HighlightSettings,
        history: SharedHistory,
        inspector: Arc<Mutex<Inspector>>,
        log_buffer: LogBuffer,
    ) -> Self {
        Self {
            view: View::default(),
            should_quit: false,
            start_time: Instant::now(),
            config,
            settings_path: None,
            highlight,
            history,
            inspector,
            proxy: None,
            log_buffer,
            history_panel: HistoryPanel::new(),
            editor: None,
            settings_panel: SettingsPanel::new(),
            toast: None,
        }
    }

    pub fn with_proxy(mut self, proxy: ProxyState) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    pub fn set_view(&mut self, view: View) {
        if view == View::Settings {
            self.settings_panel.focus_color(self.highlight.current());
        }
        self.view = view;
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    /// Periodic housekeeping (call on every tick)
    pub fn tick(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    /// React to proxy notifications. Captures need no work here: the
    /// history is read on every frame.
    pub fn handle_event(&mut self, event: ProxyEvent) {
        match event {
            ProxyEvent::Replayed { id, status, .. } => {
                self.show_toast(format!("Replay stored as #{} ({})", id, status));
            }
            ProxyEvent::Error { message, .. } => {
                self.show_toast(format!("Error: {}", message));
            }
            ProxyEvent::Captured { .. } | ProxyEvent::Completed { .. } => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Editor actions
    // ─────────────────────────────────────────────────────────────────────

    /// Open the editor on the selected history entry
    pub fn open_selected(&mut self) {
        let Some(index) = self.history_panel.current() else {
            return;
        };

        let selected = {
            let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
            history.at(index).map(|e| (e.id, e.request.clone()))
        };
        let Some((id, request)) = selected else {
            return;
        };

        let snapshot = self
            .inspector
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot();

        match EditorPanel::open(request, Some(id), snapshot) {
            Some(panel) => {
                self.editor = Some(panel);
                self.set_view(View::Editor);
            }
            None => self.show_toast(format!("#{} has no Aura parameters", id)),
        }
    }

    /// Write pending edits back into the history entry
    pub fn save_edits(&mut self) {
        let Some(panel) = self.editor.as_mut() else {
            return;
        };
        let source = panel.source;

        let Some(updated) = panel.editor_mut().commit() else {
            self.show_toast("No changes to save");
            return;
        };

        let stored = source.is_some_and(|id| {
            self.history
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .update_request(id, updated)
        });

        match (stored, source) {
            (true, Some(id)) => {
                tracing::info!(id, "Saved edited Aura parameters");
                self.show_toast(format!("Saved changes to #{}", id));
            }
            _ => self.show_toast("Entry no longer in history; use Ctrl+R to replay"),
        }
    }

    /// Send the edited request upstream as a new history entry
    pub fn replay(&mut self) {
        let Some(panel) = self.editor.as_ref() else {
            return;
        };
        let Some(request) = panel.editor().get_message().map(|r| r.into_owned()) else {
            return;
        };
        let source = panel.source;

        let Some(proxy) = self.proxy.clone() else {
            self.show_toast("Replay unavailable");
            return;
        };

        self.show_toast(format!("Replaying {}", request));
        tokio::spawn(async move {
            // Outcome is reported back through the event channel
            let _ = proxy.replay(request, source).await;
        });
    }

    pub fn close_editor(&mut self) {
        if self.editor.as_ref().is_some_and(|p| p.editor().is_modified()) {
            self.show_toast("Unsaved edits discarded");
        }
        self.editor = None;
        self.set_view(View::History);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Settings actions
    // ─────────────────────────────────────────────────────────────────────

    /// Apply whatever the settings cursor is on
    pub fn activate_setting(&mut self) {
        match self.settings_panel.selected_item() {
            SettingsItem::Color(color) => self.apply_color(color),
            SettingsItem::Reprocess => self.reprocess_history(),
        }
    }

    /// Change the highlight color and persist it
    ///
    /// Existing entries keep their old color until history is reprocessed.
    pub fn apply_color(&mut self, color: HighlightColor) {
        if !self.highlight.set(color) {
            self.show_toast(format!("Highlight color is already {}", color));
            return;
        }

        self.config.highlight_color = color;
        if let Some(path) = &self.settings_path {
            if let Err(e) = Config::persist_highlight(path, color) {
                tracing::warn!("Could not save highlight color: {:#}", e);
            }
        }
        self.show_toast(format!("Highlight color set to {}", color));
    }

    /// Re-mark every stored Aura request with the current color
    pub fn reprocess_history(&mut self) {
        let color = self.highlight.current();
        let report = {
            let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
            reprocess(&mut *history, color)
        };
        self.show_toast(format!(
            "Reprocessed {} requests, {} highlighted {}",
            report.scanned, report.highlighted, color
        ));
    }

    /// Status bar hints for the current view
    pub fn hints(&self) -> &'static str {
        use super::traits::Interactive;

        match self.view {
            View::History => self.history_panel.hints(),
            View::Editor => self
                .editor
                .as_ref()
                .map(|p| p.hints())
                .unwrap_or_default(),
            View::Settings => self.settings_panel.hints(),
        }
    }
}

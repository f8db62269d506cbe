// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, proxy events)
// - Layered key dispatch to the active view and its component

pub mod app;
pub mod components;
pub mod traits;
pub mod ui;

use anyhow::{Context, Result};
use app::{App, View};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use traits::Interactive;

use crate::events::ProxyEvent;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop until the user quits, and
/// restores the terminal even when the loop fails.
pub async fn run_tui(mut app: App, mut event_rx: mpsc::Receiver<ProxyEvent>) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app, &mut event_rx).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on keyboard input, a redraw tick and proxy events with
/// `tokio::select!`, responding to whichever completes first.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::Receiver<ProxyEvent>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard input
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            // Periodic tick for redrawing
            _ = tick_interval.tick() => {
                app.tick();
            }

            // Proxy events
            Some(proxy_event) = event_rx.recv() => {
                app.handle_event(proxy_event);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: Global → View-specific → Component
pub(crate) fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Ignore release/repeat events on terminals that report them
    if key.kind != KeyEventKind::Press {
        return;
    }

    if handle_global_keys(app, &key) {
        return;
    }

    match app.view {
        View::History => handle_history_keys(app, key),
        View::Editor => handle_editor_keys(app, key),
        View::Settings => handle_settings_keys(app, key),
    }
}

/// Keys that work in every view
fn handle_global_keys(app: &mut App, key: &KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return true;
    }
    false
}

fn handle_history_keys(app: &mut App, key: KeyEvent) {
    if app.history_panel.handle_key(key).was_handled() {
        return;
    }
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('s') => app.set_view(View::Settings),
        _ => {}
    }
}

fn handle_editor_keys(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            app.close_editor();
            return;
        }
        KeyCode::Char('s') if ctrl => {
            app.save_edits();
            return;
        }
        KeyCode::Char('r') if ctrl => {
            app.replay();
            return;
        }
        _ => {}
    }

    if let Some(panel) = app.editor.as_mut() {
        panel.handle_key(key);
    }
}

fn handle_settings_keys(app: &mut App, key: KeyEvent) {
    if app.settings_panel.handle_key(key).was_handled() {
        return;
    }
    match key.code {
        KeyCode::Enter => app.activate_setting(),
        KeyCode::Esc => app.set_view(View::History),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

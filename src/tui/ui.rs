// UI rendering
//
// Layout: title bar, the active view, status bar with key hints. The
// toast is drawn last so it floats over everything.

use super::app::{App, View};
use super::components::{highlight_style_color, logs_panel};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Height of the logs panel under the history list
const LOGS_HEIGHT: u16 = 8;

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    draw_title_bar(f, chunks[0], app);

    match app.view {
        View::History => draw_history(f, chunks[1], app),
        View::Editor => match &app.editor {
            Some(panel) => panel.render(f, chunks[1]),
            None => draw_history(f, chunks[1], app),
        },
        View::Settings => {
            let color = app.highlight.current();
            app.settings_panel.render(f, chunks[1], color);
        }
    }

    draw_status_bar(f, chunks[2], app);

    if let Some(toast) = &app.toast {
        toast.render(f, area);
    }
}

fn draw_history(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(LOGS_HEIGHT)])
        .split(area);

    {
        let history = app.history.lock().unwrap_or_else(|e| e.into_inner());
        app.history_panel.sync(history.len());
        app.history_panel.render(f, chunks[0], &history);
    }

    let entries = app.log_buffer.tail(LOGS_HEIGHT as usize);
    logs_panel::render(f, chunks[1], &entries);
}

fn draw_title_bar(f: &mut Frame, area: Rect, app: &App) {
    let color = app.highlight.current();
    let uptime = app.start_time.elapsed().as_secs();

    let line = Line::from(vec![
        Span::styled(
            format!(" auraspy v{} ", crate::config::VERSION),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("│ {} │ ", app.view.name())),
        Span::raw(format!("proxy {} │ highlight ", app.config.bind_addr)),
        Span::styled(
            color.as_str(),
            Style::default()
                .fg(highlight_style_color(color))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" │ up {}:{:02}", uptime / 60, uptime % 60)),
    ]);

    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
        area,
    );
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    f.render_widget(
        Paragraph::new(format!(" {}", app.hints())).style(Style::default().fg(Color::Gray)),
        area,
    );
}

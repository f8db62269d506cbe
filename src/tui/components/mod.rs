//! TUI components
//!
//! Each component owns its own view state and renders itself from data
//! handed in by the App.

pub mod editor_panel;
pub mod history_panel;
pub mod logs_panel;
pub mod settings_panel;
pub mod toast;

pub use editor_panel::EditorPanel;
pub use history_panel::HistoryPanel;
pub use settings_panel::{SettingsItem, SettingsPanel};
pub use toast::Toast;

use crate::aura::HighlightColor;
use ratatui::style::Color;

/// Terminal color for a highlight
pub fn highlight_style_color(color: HighlightColor) -> Color {
    match color {
        HighlightColor::Red => Color::Red,
        HighlightColor::Orange => Color::Rgb(255, 165, 0),
        HighlightColor::Yellow => Color::Yellow,
        HighlightColor::Green => Color::Green,
        HighlightColor::Cyan => Color::Cyan,
        HighlightColor::Blue => Color::Blue,
        HighlightColor::Pink => Color::Rgb(255, 182, 193),
        HighlightColor::Magenta => Color::Magenta,
        HighlightColor::Gray => Color::Gray,
    }
}

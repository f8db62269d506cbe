//! Highlight color palette and its single-writer settings context
//!
//! The color is owned by [`HighlightSettings`], which is the only place it
//! can change. Everything else holds a [`HighlightHandle`] and reads the
//! value at the moment it needs it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;

/// Colors available for marking history entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightColor {
    Red,
    Orange,
    Yellow,
    Green,
    #[default]
    Cyan,
    Blue,
    Pink,
    Magenta,
    Gray,
}

impl HighlightColor {
    /// Full palette in display order
    pub const ALL: [HighlightColor; 9] = [
        HighlightColor::Red,
        HighlightColor::Orange,
        HighlightColor::Yellow,
        HighlightColor::Green,
        HighlightColor::Cyan,
        HighlightColor::Blue,
        HighlightColor::Pink,
        HighlightColor::Magenta,
        HighlightColor::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightColor::Red => "red",
            HighlightColor::Orange => "orange",
            HighlightColor::Yellow => "yellow",
            HighlightColor::Green => "green",
            HighlightColor::Cyan => "cyan",
            HighlightColor::Blue => "blue",
            HighlightColor::Pink => "pink",
            HighlightColor::Magenta => "magenta",
            HighlightColor::Gray => "gray",
        }
    }

    /// Position in [`HighlightColor::ALL`]
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown highlight color {0:?} (expected one of red, orange, yellow, green, cyan, blue, pink, magenta, gray)")]
pub struct UnknownColor(pub String);

impl FromStr for HighlightColor {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownColor(s.to_string()))
    }
}

/// Owner of the current highlight color
///
/// Not `Clone`: there is exactly one writer.
#[derive(Debug)]
pub struct HighlightSettings {
    tx: watch::Sender<HighlightColor>,
}

impl HighlightSettings {
    pub fn new(color: HighlightColor) -> Self {
        let (tx, _rx) = watch::channel(color);
        Self { tx }
    }

    pub fn current(&self) -> HighlightColor {
        *self.tx.borrow()
    }

    /// Change the color. Returns true if it actually changed.
    pub fn set(&self, color: HighlightColor) -> bool {
        let previous = self.tx.send_replace(color);
        if previous != color {
            tracing::info!("Highlight color updated to: {}", color);
            true
        } else {
            false
        }
    }

    /// Read-only handle for inspectors and reprocessors
    pub fn handle(&self) -> HighlightHandle {
        HighlightHandle {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self::new(HighlightColor::default())
    }
}

/// Read side of [`HighlightSettings`]
#[derive(Debug, Clone)]
pub struct HighlightHandle {
    rx: watch::Receiver<HighlightColor>,
}

impl HighlightHandle {
    pub fn current(&self) -> HighlightColor {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cyan() {
        assert_eq!(HighlightColor::default(), HighlightColor::Cyan);
        assert_eq!(HighlightSettings::default().current(), HighlightColor::Cyan);
    }

    #[test]
    fn test_parse_all_names() {
        for color in HighlightColor::ALL {
            assert_eq!(color.as_str().parse::<HighlightColor>().unwrap(), color);
            assert_eq!(
                color.as_str().to_uppercase().parse::<HighlightColor>().unwrap(),
                color
            );
        }
        assert!("purple".parse::<HighlightColor>().is_err());
        assert!("".parse::<HighlightColor>().is_err());
    }

    #[test]
    fn test_index_matches_palette() {
        for (i, color) in HighlightColor::ALL.iter().enumerate() {
            assert_eq!(color.index(), i);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&HighlightColor::Magenta).unwrap();
        assert_eq!(json, "\"magenta\"");
        let back: HighlightColor = serde_json::from_str("\"gray\"").unwrap();
        assert_eq!(back, HighlightColor::Gray);
    }

    #[test]
    fn test_handles_see_new_color() {
        let settings = HighlightSettings::new(HighlightColor::Cyan);
        let handle = settings.handle();
        let other = handle.clone();

        assert!(settings.set(HighlightColor::Red));
        assert_eq!(handle.current(), HighlightColor::Red);
        assert_eq!(other.current(), HighlightColor::Red);

        assert!(!settings.set(HighlightColor::Red));
    }

    #[test]
    fn test_set_without_handles() {
        let settings = HighlightSettings::new(HighlightColor::Blue);
        settings.set(HighlightColor::Green);
        assert_eq!(settings.current(), HighlightColor::Green);
        assert_eq!(settings.handle().current(), HighlightColor::Green);
    }
}

// Events that flow from the proxy to the TUI
//
// The proxy owns capture and forwarding; the TUI only needs to know that
// something changed so it can refresh and surface failures. Using an enum
// keeps the channel type-safe between async tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main event type that flows through the application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")] // {"type": "captured", ...}
pub enum ProxyEvent {
    /// A request was captured and stored in history
    Captured {
        id: u64,
        timestamp: DateTime<Utc>,
        method: String,
        url: String,
        /// Whether the request carried a watched Aura parameter
        matched: bool,
    },

    /// The upstream answered a captured request
    Completed {
        id: u64,
        status: u16,
        duration: Duration,
    },

    /// An edited request was sent upstream from the editor
    Replayed {
        id: u64,
        /// History entry the edit was made from, if any
        source: Option<u64>,
        status: u16,
        duration: Duration,
    },

    /// An error occurred during proxying or replay
    Error {
        timestamp: DateTime<Utc>,
        message: String,
        context: Option<String>,
    },
}

impl ProxyEvent {
    pub fn error(message: impl Into<String>, context: Option<String>) -> Self {
        ProxyEvent::Error {
            timestamp: Utc::now(),
            message: message.into(),
            context,
        }
    }
}

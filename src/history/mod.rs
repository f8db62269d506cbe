//! Captured traffic history
//!
//! Bounded ring buffer of requests seen by the proxy (or produced by a
//! replay). The TUI reads it every frame, the proxy appends to it, and the
//! reprocessor re-marks it in place.

use crate::aura::{HighlightColor, HistoryItem, HistoryStore, ParamRequest};
use crate::http::HttpRequest;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared history handle
pub type SharedHistory = Arc<Mutex<History>>;

/// How an entry got into history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Proxy,
    Replay,
    Demo,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Proxy => "proxy",
            Origin::Replay => "replay",
            Origin::Demo => "demo",
        }
    }
}

/// One captured request and what came back for it
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub origin: Origin,
    pub request: HttpRequest,
    pub status: Option<u16>,
    pub duration: Option<Duration>,
    pub highlight: Option<HighlightColor>,
}

impl HistoryItem for HistoryEntry {
    fn param_names(&self) -> Vec<String> {
        self.request.param_names()
    }

    fn set_highlight(&mut self, color: HighlightColor) {
        self.highlight = Some(color);
    }
}

/// Ring buffer of history entries with monotonically increasing ids
#[derive(Debug)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    next_id: u64,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit.min(1024)),
            next_id: 1,
            limit,
        }
    }

    pub fn shared(limit: usize) -> SharedHistory {
        Arc::new(Mutex::new(Self::new(limit)))
    }

    /// Append a request, dropping the oldest entry when full. Returns its id.
    pub fn push(
        &mut self,
        request: HttpRequest,
        origin: Origin,
        highlight: Option<HighlightColor>,
    ) -> u64 {
        if self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(HistoryEntry {
            id,
            timestamp: Utc::now(),
            origin,
            request,
            status: None,
            duration: None,
            highlight,
        });
        id
    }

    /// Attach the upstream outcome to an entry (no-op if it was evicted)
    pub fn record_response(&mut self, id: u64, status: u16, duration: Duration) {
        if let Some(entry) = self.get_mut(id) {
            entry.status = Some(status);
            entry.duration = Some(duration);
        }
    }

    /// Replace the stored request of an entry (saved editor changes).
    /// Returns false if the entry was evicted.
    pub fn update_request(&mut self, id: u64, request: HttpRequest) -> bool {
        match self.get_mut(id) {
            Some(entry) => {
                entry.request = request;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut HistoryEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Entry at a display position (oldest first)
    pub fn at(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn highlighted_count(&self) -> usize {
        self.entries.iter().filter(|e| e.highlight.is_some()).count()
    }
}

impl HistoryStore for History {
    type Item = HistoryEntry;

    fn items_mut(&mut self) -> Box<dyn Iterator<Item = &mut HistoryEntry> + '_> {
        Box::new(self.entries.iter_mut())
    }
}

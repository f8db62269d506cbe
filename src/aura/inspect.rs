//! Live traffic inspection

use super::highlight::{HighlightColor, HighlightHandle};
use super::request::ParamRequest;
use super::snapshot::ParameterSnapshot;

/// Outcome of inspecting one request
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub snapshot: ParameterSnapshot,
    /// Color to mark the request with, if it is Aura traffic
    pub highlight: Option<HighlightColor>,
}

impl Inspection {
    pub fn matched(&self) -> bool {
        self.highlight.is_some()
    }
}

/// Inspects passing requests and remembers the last-seen snapshot
///
/// The snapshot is replaced on every inspection, so after a non-Aura
/// request it is empty.
#[derive(Debug)]
pub struct Inspector {
    highlight: HighlightHandle,
    last: ParameterSnapshot,
}

impl Inspector {
    pub fn new(highlight: HighlightHandle) -> Self {
        Self {
            highlight,
            last: ParameterSnapshot::new(),
        }
    }

    pub fn inspect<R: ParamRequest>(&mut self, request: &R) -> Inspection {
        let snapshot = ParameterSnapshot::from_params(&request.params());
        let highlight = (!snapshot.is_empty()).then(|| self.highlight.current());
        self.last = snapshot.clone();
        Inspection {
            snapshot,
            highlight,
        }
    }

    /// Copy of the last-seen snapshot, for seeding a new editor
    pub fn snapshot(&self) -> ParameterSnapshot {
        self.last.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::HighlightSettings;
    use crate::http::HttpRequest;

    fn request(body: &str) -> HttpRequest {
        let raw = format!(
            "POST /aura HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\n{}",
            body
        );
        HttpRequest::parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_aura_request_is_highlighted() {
        let settings = HighlightSettings::default();
        let mut inspector = Inspector::new(settings.handle());

        let result = inspector.inspect(&request("message=%7B%7D&aura.token=x"));
        assert!(result.matched());
        assert_eq!(result.highlight, Some(HighlightColor::Cyan));
        assert_eq!(result.snapshot.get("message"), Some("{}"));
        assert_eq!(inspector.snapshot(), result.snapshot);
    }

    #[test]
    fn test_color_is_read_at_call_time() {
        let settings = HighlightSettings::default();
        let mut inspector = Inspector::new(settings.handle());

        settings.set(HighlightColor::Orange);
        let result = inspector.inspect(&request("aura.pageURI=%2F"));
        assert_eq!(result.highlight, Some(HighlightColor::Orange));
    }

    #[test]
    fn test_other_traffic_clears_snapshot() {
        let settings = HighlightSettings::default();
        let mut inspector = Inspector::new(settings.handle());

        inspector.inspect(&request("message=1"));
        assert!(!inspector.snapshot().is_empty());

        let result = inspector.inspect(&request("q=search&page=2"));
        assert!(!result.matched());
        assert!(inspector.snapshot().is_empty());
    }
}

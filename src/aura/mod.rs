//! Salesforce Aura parameter handling
//!
//! Aura endpoints carry three interesting form parameters:
//!
//! - `message`: the JSON action payload
//! - `aura.context`: the JSON framework context blob
//! - `aura.pageURI`: the page the action was fired from
//!
//! This module holds the logic that is independent of the proxy host:
//!
//! ```text
//!   wire value ──decode──▶ editable text ──(user edits)──▶ encode ──▶ wire value
//!        │                                                     │
//!     Matcher ◀── request parameters            Rewriter ──────┘──▶ updated request
//! ```
//!
//! The host (request model, history store, text widgets) is reached only
//! through the traits in [`request`], [`reprocess`] and [`editor`].

pub mod editor;
pub mod highlight;
pub mod inspect;
pub mod reprocess;
pub mod request;
pub mod rewrite;
pub mod snapshot;
pub mod transform;

pub use editor::{ParameterEditor, TextBuffer, TextSurface};
pub use highlight::{HighlightColor, HighlightHandle, HighlightSettings};
pub use inspect::{Inspection, Inspector};
pub use reprocess::{reprocess, HistoryItem, HistoryStore, ReprocessReport};
pub use request::{Param, ParamKind, ParamRequest, RequestError};
pub use rewrite::{rewrite, try_rewrite};
pub use snapshot::ParameterSnapshot;
pub use transform::EditableValue;

/// Parameter names that mark a request as Aura traffic
pub const WATCHED_PARAMS: [&str; 3] = ["message", "aura.context", "aura.pageURI"];

/// Whether a single parameter name is on the watch-list
pub fn is_watched(name: &str) -> bool {
    WATCHED_PARAMS.contains(&name)
}

/// Whether any of the given parameter names is on the watch-list
///
/// The live inspector, the editor tab and the history reprocessor all
/// route through this one predicate.
pub fn matches<'a, I>(names: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().any(is_watched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_any_watched_name() {
        assert!(matches(["message"]));
        assert!(matches(["aura.token", "aura.context"]));
        assert!(matches(["r", "aura.pageURI", "other"]));
    }

    #[test]
    fn test_unwatched_names_never_match() {
        assert!(!matches(["aura.token", "r", "messages", "Message"]));
        assert!(!matches(["aura.context.x", "aura.pageuri"]));
        assert!(!matches(std::iter::empty::<&str>()));
    }

    #[test]
    fn test_is_watched_is_exact() {
        for name in WATCHED_PARAMS {
            assert!(is_watched(name));
        }
        assert!(!is_watched(" message"));
        assert!(!is_watched("aura.pageUri"));
    }
}

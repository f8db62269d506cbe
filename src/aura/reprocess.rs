//! Bulk re-scan of stored history
//!
//! Detection and marking only: no parameter is touched, and running the
//! pass twice leaves the same highlights behind.

use super::highlight::HighlightColor;
use super::matches;

/// A stored request that can be marked
pub trait HistoryItem {
    /// Parameter names of the stored request (empty if it has none)
    fn param_names(&self) -> Vec<String>;

    fn set_highlight(&mut self, color: HighlightColor);
}

/// Anything that can hand out its stored items for marking
pub trait HistoryStore {
    type Item: HistoryItem;

    fn items_mut(&mut self) -> Box<dyn Iterator<Item = &mut Self::Item> + '_>;
}

/// Summary of one reprocessing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReprocessReport {
    pub scanned: usize,
    pub highlighted: usize,
}

/// Highlight every stored request that carries a watched parameter
pub fn reprocess<S: HistoryStore + ?Sized>(
    store: &mut S,
    color: HighlightColor,
) -> ReprocessReport {
    let mut report = ReprocessReport::default();

    for item in store.items_mut() {
        report.scanned += 1;
        let names = item.param_names();
        if matches(names.iter().map(String::as_str)) {
            item.set_highlight(color);
            report.highlighted += 1;
        }
    }

    tracing::info!(
        scanned = report.scanned,
        highlighted = report.highlighted,
        color = %color,
        "History reprocessed"
    );
    report
}

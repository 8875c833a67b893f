//! Error types for one scrape cycle.

use crate::history::HistoryError;

/// Why a scrape cycle produced no stored record.
#[derive(thiserror::Error, Debug)]
pub enum CycleError {
    /// Navigation, wait condition or snapshot failed.
    #[error("render failed: {0}")]
    Render(#[from] dolarhoy_page::Error),
    /// Every compra/venta slot came back empty.
    #[error("no numeric values extracted")]
    NoValues,
    #[error("history write failed: {0}")]
    History(#[from] HistoryError),
    /// Another cycle holds the slot; this trigger was dropped.
    #[error("a scrape is already running")]
    AlreadyRunning,
}

impl CycleError {
    /// Busy is not a failure of the site or the store.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::AlreadyRunning)
    }
}

//! Error types for page acquisition.

use std::time::Duration;

/// Errors that can occur while obtaining a rendered page.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The headless browser could not be configured or started.
    #[error("browser launch failed: {0}")]
    Launch(String),
    /// Navigation to the target URL failed before the page loaded.
    #[error("navigation failed: {0}")]
    Navigation(String),
    /// A bounded wait elapsed (`stage` names the wait).
    #[error("timed out after {after:?} waiting for {stage}")]
    Timeout { stage: &'static str, after: Duration },
    /// An in-page script failed to evaluate.
    #[error("page evaluation failed: {0}")]
    Evaluate(String),
    /// The DOM snapshot returned by the page could not be decoded.
    #[error("snapshot decode failed: {0}")]
    Snapshot(#[from] serde_json::Error),
    /// An HTTP request failed (network error or timeout).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The target answered with a non-success status.
    #[error("unexpected status {status}")]
    HttpStatus { status: u16 },
    /// The page loaded but never showed compra/venta quotes.
    #[error("quotes not visible on page")]
    ConditionNotMet,
    /// Invalid renderer configuration (bad URL, bad header value).
    #[error("invalid configuration: {0}")]
    Config(String),
}

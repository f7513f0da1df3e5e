//! Error types shared across the pipeline.
//!
//! Two classes of failure exist:
//!
//! - [`FailureKind`]: recoverable faults returned by every leaf component
//!   (extraction, summarization, persistence, raw fetches). The orchestrator
//!   absorbs these and the run simply produces fewer results.
//! - [`SelectionError`]: the single fatal class. It can only arise while
//!   selecting countries and expanding them into sites, and it aborts the run.

use thiserror::Error;

/// A recoverable fault from one outbound call or one parsing step.
#[derive(Debug, Clone, Error)]
pub enum FailureKind {
    /// The per-call deadline elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body-read failure.
    #[error("network error: {0}")]
    Network(String),

    /// The remote service answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The call succeeded but produced nothing usable.
    #[error("empty result")]
    Empty,
}

impl From<reqwest::Error> for FailureKind {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FailureKind::Timeout
        } else if e.is_decode() {
            FailureKind::Decode(e.to_string())
        } else {
            FailureKind::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FailureKind {
    fn from(e: serde_json::Error) -> Self {
        FailureKind::Decode(e.to_string())
    }
}

/// A fatal fault in country selection or site expansion.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("site catalog is empty")]
    EmptyCatalog,

    #[error("country `{0}` is not in the site catalog")]
    UnknownCountry(String),

    #[error("site `{site}` has an invalid URL `{url}`: {reason}")]
    InvalidSiteUrl {
        site: String,
        url: String,
        reason: String,
    },
}

// src/error.rs
// =============================================================================
// Error types for the crawler.
//
// Two families:
// - FetchError: one identifier could not be retrieved. The crawl engine
//   absorbs these at the worker that hit them; they are reported, never
//   propagated.
// - CrawlError: something went wrong while *setting up* a crawl (reading a
//   fixture file, parsing the seed URL, building the HTTP client). These are
//   returned to the caller before any worker runs.
//
// We use `thiserror` so each variant gets a Display impl from its attribute.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Why a single identifier could not be fetched.
///
/// All variants mean the same thing to the crawl engine ("this node has no
/// content and no outgoing edges"); they only differ in the cause text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The backing data has no entry for this identifier
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Network-level failure (timeout, DNS, TLS, connection reset...)
    #[error("transport error: {0}")]
    Transport(String),

    /// The identifier cannot be interpreted by this fetcher (e.g. not a URL)
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Transport("request timed out".to_string())
        } else if let Some(status) = e.status() {
            FetchError::Http { status: status.as_u16() }
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Failures that stop a crawl before it starts.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("failed to read fixture {path}: {source}")]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture {path}: {source}")]
    FixtureFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;

// src/report.rs
// =============================================================================
// Where crawl results go.
//
// The crawl engine doesn't return pages to its caller. Instead, every worker
// reports what it found (or why it failed) to a `CrawlSink` as soon as its
// fetch finishes. Records arrive in whatever order the workers finish.
//
// Sinks provided here:
// - LogSink: tracing events (the default for `crawl()`)
// - ConsoleSink: human-readable lines on stdout/stderr
// - JsonLinesSink: one JSON object per line on stdout
// - CollectingSink: keeps everything in memory
// - StatsSink: wraps any sink and counts found/failed
// =============================================================================

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// One line of crawl output.
///
/// Serialized with a `status` tag, e.g.
///   {"status":"found","identifier":"http://golang.org/","content":"..."}
///   {"status":"failed","identifier":"http://golang.org/cmd/","cause":"not found: ..."}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrawlRecord {
    Found { identifier: String, content: String },
    Failed { identifier: String, cause: String },
}

impl CrawlRecord {
    pub fn identifier(&self) -> &str {
        match self {
            CrawlRecord::Found { identifier, .. } | CrawlRecord::Failed { identifier, .. } => {
                identifier
            }
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, CrawlRecord::Found { .. })
    }
}

/// Receives one call per fetched identifier.
///
/// Called concurrently from many workers.
pub trait CrawlSink: Send + Sync {
    fn found(&self, id: &str, content: &str);
    fn failed(&self, id: &str, error: &FetchError);
}

impl<S: CrawlSink + ?Sized> CrawlSink for Arc<S> {
    fn found(&self, id: &str, content: &str) {
        (**self).found(id, content)
    }

    fn failed(&self, id: &str, error: &FetchError) {
        (**self).failed(id, error)
    }
}

/// Emits records as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl CrawlSink for LogSink {
    fn found(&self, id: &str, content: &str) {
        info!(id = %id, bytes = content.len(), "found");
    }

    fn failed(&self, id: &str, error: &FetchError) {
        warn!(id = %id, error = %error, "fetch failed");
    }
}

/// Prints `found: <id> "<content>"` lines, failures on stderr.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    // Web pages can be huge; only this many characters are shown
    max_content: usize,
}

impl ConsoleSink {
    pub fn new(max_content: usize) -> Self {
        Self { max_content }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(60)
    }
}

impl CrawlSink for ConsoleSink {
    fn found(&self, id: &str, content: &str) {
        println!("found: {} {:?}", id, truncate(content, self.max_content));
    }

    fn failed(&self, id: &str, error: &FetchError) {
        eprintln!("failed: {}: {}", id, error);
    }
}

/// Prints one JSON `CrawlRecord` per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLinesSink;

impl JsonLinesSink {
    fn emit(&self, record: &CrawlRecord) {
        match serde_json::to_string(record) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(error = %e, "could not serialize crawl record"),
        }
    }
}

impl CrawlSink for JsonLinesSink {
    fn found(&self, id: &str, content: &str) {
        self.emit(&CrawlRecord::Found {
            identifier: id.to_string(),
            content: content.to_string(),
        });
    }

    fn failed(&self, id: &str, error: &FetchError) {
        self.emit(&CrawlRecord::Failed {
            identifier: id.to_string(),
            cause: error.to_string(),
        });
    }
}

/// Keeps every record in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<CrawlRecord>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CrawlRecord> {
        self.lock().clone()
    }

    /// Identifiers of successful fetches, sorted
    pub fn found_ids(&self) -> Vec<String> {
        self.ids(true)
    }

    /// Identifiers of failed fetches, sorted
    pub fn failed_ids(&self) -> Vec<String> {
        self.ids(false)
    }

    fn ids(&self, found: bool) -> Vec<String> {
        let mut ids: Vec<String> = self
            .lock()
            .iter()
            .filter(|r| r.is_found() == found)
            .map(|r| r.identifier().to_string())
            .collect();
        ids.sort();
        ids
    }

    // A panic in another reporter must not hide the records we already have
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CrawlRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, record: CrawlRecord) {
        self.lock().push(record);
    }
}

impl CrawlSink for CollectingSink {
    fn found(&self, id: &str, content: &str) {
        self.push(CrawlRecord::Found {
            identifier: id.to_string(),
            content: content.to_string(),
        });
    }

    fn failed(&self, id: &str, error: &FetchError) {
        self.push(CrawlRecord::Failed {
            identifier: id.to_string(),
            cause: error.to_string(),
        });
    }
}

/// Totals for the end-of-run summary
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub found: usize,
    pub failed: usize,
}

impl CrawlStats {
    pub fn total(&self) -> usize {
        self.found + self.failed
    }
}

/// Counts records on their way to another sink.
#[derive(Debug, Default)]
pub struct StatsSink<S> {
    inner: S,
    found: AtomicUsize,
    failed: AtomicUsize,
}

impl<S: CrawlSink> StatsSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            found: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            found: self.found.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl<S: CrawlSink> CrawlSink for StatsSink<S> {
    fn found(&self, id: &str, content: &str) {
        self.found.fetch_add(1, Ordering::Relaxed);
        self.inner.found(id, content);
    }

    fn failed(&self, id: &str, error: &FetchError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.inner.failed(id, error);
    }
}

// Cuts on a char boundary and marks the cut with "..."
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

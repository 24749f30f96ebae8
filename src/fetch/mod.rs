// src/fetch/mod.rs
// =============================================================================
// The fetch capability: given an identifier, return its content and the
// identifiers it references.
//
// The crawl engine only ever talks to the `Fetcher` trait. Concrete backends
// live in submodules:
// - fixture: an in-memory graph (the demo dataset, JSON fixture files)
// - http: real web pages over reqwest, links pulled out with scraper
// - links: HTML/Markdown link extraction shared by the http backend
// =============================================================================

mod fixture;
mod http;
mod links;

pub use fixture::{FixtureFetcher, FixturePage};
pub use http::HttpFetcher;
pub use links::{extract_html_links, extract_markdown_links};

use crate::error::FetchError;
use async_trait::async_trait;
use std::sync::Arc;

/// Names one node of the graph. Equality is identity for dedup purposes.
pub type Identifier = String;

/// What a successful fetch produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub content: String,
    pub references: Vec<Identifier>,
}

impl Page {
    pub fn new(content: impl Into<String>, references: Vec<Identifier>) -> Self {
        Self {
            content: content.into(),
            references,
        }
    }
}

/// Retrieves one node of the graph.
///
/// Implementations must be safe to call from many workers at once with
/// different identifiers; the engine makes no ordering assumptions between
/// calls.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Page, FetchError>;
}

// Lets callers keep their own handle to a fetcher (e.g. to inspect counters
// after the crawl) while the engine holds another.
#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, id: &str) -> Result<Page, FetchError> {
        (**self).fetch(id).await
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - Traits with async methods can't be used as `dyn Fetcher` on their own
//    - async_trait rewrites each async fn to return a boxed future
//
// 2. What does `Send + Sync` on the trait mean?
//    - Send: the fetcher can move to another thread
//    - Sync: many threads can call &self methods at the same time
//    - Both are needed because every worker is a separate tokio task
// -----------------------------------------------------------------------------

// src/fetch/fixture.rs
// =============================================================================
// An in-memory fetcher backed by a fixed map of pages.
//
// Used for:
// - the `demo` subcommand (the small golang.org sample graph)
// - user-supplied JSON fixture files
// - tests, where we want a graph with a known shape
//
// Fixture file format (same shape as the sample data):
//   {
//     "http://golang.org/": {
//       "body": "The Go Programming Language",
//       "urls": ["http://golang.org/pkg/", "http://golang.org/cmd/"]
//     },
//     ...
//   }
// =============================================================================

use super::{Fetcher, Identifier, Page};
use crate::error::{CrawlError, FetchError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One entry of a fixture file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturePage {
    pub body: String,
    #[serde(default)]
    pub urls: Vec<Identifier>,
}

/// Serves pages out of a `HashMap`. Anything not in the map is "not found".
#[derive(Debug, Clone, Default)]
pub struct FixtureFetcher {
    pages: HashMap<Identifier, Page>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a page. Chainable so graphs can be written inline.
    pub fn with_page(mut self, id: &str, body: &str, urls: &[&str]) -> Self {
        self.pages.insert(
            id.to_string(),
            Page::new(body, urls.iter().map(|u| u.to_string()).collect()),
        );
        self
    }

    /// The sample graph used by the `demo` subcommand.
    ///
    /// `http://golang.org/cmd/` is referenced but deliberately missing, so a
    /// crawl from the root reports four pages and one failure.
    pub fn golang_tour() -> Self {
        Self::new()
            .with_page(
                "http://golang.org/",
                "The Go Programming Language",
                &["http://golang.org/pkg/", "http://golang.org/cmd/"],
            )
            .with_page(
                "http://golang.org/pkg/",
                "Packages",
                &[
                    "http://golang.org/",
                    "http://golang.org/cmd/",
                    "http://golang.org/pkg/fmt/",
                    "http://golang.org/pkg/os/",
                ],
            )
            .with_page(
                "http://golang.org/pkg/fmt/",
                "Package fmt",
                &["http://golang.org/", "http://golang.org/pkg/"],
            )
            .with_page(
                "http://golang.org/pkg/os/",
                "Package os",
                &["http://golang.org/", "http://golang.org/pkg/"],
            )
    }

    /// Parses a fixture from JSON text
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let raw: HashMap<Identifier, FixturePage> = serde_json::from_str(json)?;
        let pages = raw
            .into_iter()
            .map(|(id, page)| (id, Page::new(page.body, page.urls)))
            .collect();
        Ok(Self { pages })
    }

    /// Loads a fixture file from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CrawlError::FixtureIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| CrawlError::FixtureFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(&self, id: &str) -> std::result::Result<Page, FetchError> {
        self.pages
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the sample data a struct and not a global variable?
//    - It is passed to the crawler like any other Fetcher
//    - Tests can build their own graphs the same way
//
// 2. What does map_err do?
//    - Converts the error inside a Result into another error type
//    - Here it wraps io/serde errors with the path of the file
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_fetch_known_page() {
        let fetcher = FixtureFetcher::golang_tour();
        let page = fetcher.fetch("http://golang.org/pkg/").await.unwrap();
        assert_eq!(page.content, "Packages");
        assert_eq!(page.references.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_missing_page() {
        let fetcher = FixtureFetcher::golang_tour();
        let err = fetcher.fetch("http://golang.org/cmd/").await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("http://golang.org/cmd/".to_string()));
    }

    #[test]
    fn test_parse_json_fixture() {
        let json = r#"{
            "a": { "body": "A", "urls": ["b"] },
            "b": { "body": "B" }
        }"#;
        let fetcher = FixtureFetcher::from_json_str(json).unwrap();
        assert_eq!(fetcher.len(), 2);
    }

    #[test]
    fn test_load_fixture_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "root": {{ "body": "Root", "urls": [] }} }}"#).unwrap();

        let fetcher = FixtureFetcher::from_json_file(file.path()).unwrap();
        assert_eq!(fetcher.len(), 1);
    }

    #[test]
    fn test_load_missing_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FixtureFetcher::from_json_file(dir.path().join("nope.json"));
        assert!(matches!(result, Err(CrawlError::FixtureIo { .. })));
    }

    #[test]
    fn test_load_malformed_fixture_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = FixtureFetcher::from_json_file(file.path());
        assert!(matches!(result, Err(CrawlError::FixtureFormat { .. })));
    }
}

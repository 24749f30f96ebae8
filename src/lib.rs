//! frontier-crawl: visit every node of a graph reachable from a seed,
//! exactly once, with one concurrent task per node.
//!
//! ```no_run
//! use frontier_crawl::{crawl, FixtureFetcher};
//!
//! # async fn demo() {
//! crawl("http://golang.org/", FixtureFetcher::golang_tour()).await;
//! # }
//! ```
//!
//! Modules:
//! - [`crawl`]: the engine (frontier, workers, dispatcher)
//! - [`fetch`]: the `Fetcher` trait and its fixture/HTTP implementations
//! - [`report`]: sinks that receive one record per fetched node
//! - [`error`]: fetch and setup errors

pub mod crawl;
pub mod error;
pub mod fetch;
pub mod report;

pub use crawl::{crawl, CrawlOptions, Crawler};
pub use error::{CrawlError, FetchError};
pub use fetch::{Fetcher, FixtureFetcher, HttpFetcher, Identifier, Page};
pub use report::{
    CollectingSink, ConsoleSink, CrawlRecord, CrawlSink, CrawlStats, JsonLinesSink, LogSink,
    StatsSink,
};

// src/crawl/mod.rs
// =============================================================================
// The crawl engine.
//
// Starting from a seed identifier, visit every reachable node exactly once,
// with one tokio task per node, and return when nothing is left to do. The
// size of the graph is never known up front.
//
// Submodules:
// - frontier: the visited set + pending queue (the dedup gate)
// - worker: processes one identifier
// - dispatcher: the control loop that spawns workers and detects the end
//
// Public API:
// - crawl(seed, fetcher): defaults, results logged through tracing
// - Crawler: the configurable form (sink, queue bound, concurrency cap,
//   shutdown flag)
// =============================================================================

mod dispatcher;
mod frontier;
mod worker;

use frontier::Frontier;

use crate::fetch::{Fetcher, Identifier};
use crate::report::{CrawlSink, LogSink};
use dispatcher::Dispatcher;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::info;
use worker::CrawlContext;

/// Tuning knobs for a crawl. The defaults impose no limits.
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Bound on the pending queue; producers wait when it is full.
    /// `None` = unbounded.
    pub queue_capacity: Option<usize>,
    /// Maximum number of fetches running at once. `None` = unlimited.
    pub max_in_flight: Option<usize>,
    /// When set to true, no new workers are spawned and queued workers skip
    /// their fetch; the crawl then winds down normally.
    pub shutdown: Arc<AtomicBool>,
}

impl CrawlOptions {
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = Some(max);
        self
    }

    /// Handle for signal handlers to request shutdown
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }
}

/// A configured crawl, ready to run from any seed.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn CrawlSink>,
    options: CrawlOptions,
}

impl Crawler {
    pub fn new(fetcher: impl Fetcher + 'static) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            sink: Arc::new(LogSink),
            options: CrawlOptions::default(),
        }
    }

    pub fn with_sink(mut self, sink: impl CrawlSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn with_options(mut self, options: CrawlOptions) -> Self {
        self.options = options;
        self
    }

    /// Visits every identifier reachable from `seed` and returns once the
    /// last worker has finished. Fetch failures are reported to the sink and
    /// never stop the crawl.
    ///
    /// Each call is an independent run with its own visited set.
    pub async fn run(&self, seed: impl Into<Identifier>) {
        let seed = seed.into();
        let started = Instant::now();

        info!(
            seed = %seed,
            queue_capacity = ?self.options.queue_capacity,
            max_in_flight = ?self.options.max_in_flight,
            "starting crawl"
        );

        let (frontier, pending) = Frontier::new(self.options.queue_capacity);
        let (done, done_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(CrawlContext {
            frontier,
            fetcher: Arc::clone(&self.fetcher),
            sink: Arc::clone(&self.sink),
            limiter: self.options.max_in_flight.map(|max| Semaphore::new(max.max(1))),
            shutdown: self.options.shutdown_flag(),
            done,
        });

        Dispatcher::new(Arc::clone(&ctx), pending, done_rx)
            .run(seed)
            .await;

        info!(
            visited = ctx.frontier.visited_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "crawl finished"
        );
    }
}

/// Crawls from `seed` with default options, logging every result.
pub async fn crawl(seed: impl Into<Identifier>, fetcher: impl Fetcher + 'static) {
    Crawler::new(fetcher).run(seed).await
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is the builder pattern (with_sink, with_options)?
//    - Each method takes `self` by value, changes one field and returns it
//    - Lets callers chain: Crawler::new(f).with_sink(s).run(seed)
//
// 2. Why does run() take &self?
//    - The same Crawler can run several crawls, one after another or side
//      by side; each run builds its own frontier
//    - The future returned by run() borrows the Crawler, so keep the Crawler
//      in a variable if you store the future before awaiting it
//
// 3. What is impl Into<Identifier>?
//    - Accepts anything convertible to a String: &str, String, ...
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FixtureFetcher;
    use crate::report::CollectingSink;
    use std::sync::atomic::Ordering;

    fn cycle() -> FixtureFetcher {
        FixtureFetcher::new()
            .with_page("a", "A", &["b"])
            .with_page("b", "B", &["a"])
    }

    #[tokio::test]
    async fn test_crawl_terminates_on_cycle() {
        crawl("a", cycle()).await;
    }

    #[tokio::test]
    async fn test_crawler_reports_each_node_once() {
        let sink = Arc::new(CollectingSink::new());
        Crawler::new(cycle())
            .with_sink(Arc::clone(&sink))
            .run("a")
            .await;

        assert_eq!(sink.found_ids(), vec!["a", "b"]);
        assert!(sink.failed_ids().is_empty());
    }

    #[tokio::test]
    async fn test_crawler_can_run_twice() {
        let sink = Arc::new(CollectingSink::new());
        let crawler = Crawler::new(cycle()).with_sink(Arc::clone(&sink));

        crawler.run("a").await;
        crawler.run("b").await;

        // Runs share nothing, so both visit both nodes
        assert_eq!(sink.records().len(), 4);
    }

    #[tokio::test]
    async fn test_shutdown_before_start() {
        let sink = Arc::new(CollectingSink::new());
        let options = CrawlOptions::default();
        options.shutdown_flag().store(true, Ordering::Relaxed);

        Crawler::new(cycle())
            .with_sink(Arc::clone(&sink))
            .with_options(options)
            .run("a")
            .await;

        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_options_builders() {
        let options = CrawlOptions::default()
            .with_queue_capacity(8)
            .with_max_in_flight(2);
        assert_eq!(options.queue_capacity, Some(8));
        assert_eq!(options.max_in_flight, Some(2));
        assert!(!options.shutdown.load(Ordering::Relaxed));
    }
}

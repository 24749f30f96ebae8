// src/crawl/worker.rs
// =============================================================================
// A worker processes exactly one identifier that has already been claimed:
//
// 1. fetch it
// 2. report the result to the sink
// 3. claim + enqueue each reference nobody else has claimed yet
// 4. signal completion to the dispatcher, no matter what happened above
//
// Step 4 is done by a drop guard, so the dispatcher's in-flight count stays
// balanced even if the fetcher or the sink panics.
// =============================================================================

use super::frontier::Frontier;
use crate::fetch::{Fetcher, Identifier};
use crate::report::CrawlSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

/// Everything a worker needs, shared by all workers of one run through a
/// single `Arc`.
pub(crate) struct CrawlContext {
    pub(crate) frontier: Frontier,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) sink: Arc<dyn CrawlSink>,
    // Caps concurrent fetches when set
    pub(crate) limiter: Option<Semaphore>,
    pub(crate) shutdown: Arc<AtomicBool>,
    pub(crate) done: mpsc::UnboundedSender<()>,
}

impl CrawlContext {
    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

// Sends the completion signal when dropped
struct CompletionGuard {
    done: mpsc::UnboundedSender<()>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        // Only fails if the dispatcher is gone, and then nobody is counting
        let _ = self.done.send(());
    }
}

pub(crate) async fn process(ctx: Arc<CrawlContext>, id: Identifier) {
    let _completion = CompletionGuard {
        done: ctx.done.clone(),
    };

    // The permit only covers the fetch. Holding it while enqueueing could
    // leave every permit-holder stuck on a full queue.
    let result = {
        let _permit = match &ctx.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        };

        if ctx.is_shutdown() {
            debug!(id = %id, "shutdown requested, skipping fetch");
            return;
        }

        debug!(id = %id, "fetching");
        ctx.fetcher.fetch(&id).await
    };

    let page = match result {
        Ok(page) => page,
        Err(e) => {
            debug!(id = %id, error = %e, "fetch failed");
            ctx.sink.failed(&id, &e);
            return;
        }
    };

    ctx.sink.found(&id, &page.content);

    let mut queued = 0usize;
    for reference in page.references {
        if !ctx.frontier.mark_visited(&reference) {
            continue;
        }
        if let Err(e) = ctx.frontier.enqueue(reference).await {
            warn!(id = %id, error = %e, "dropping discovered references");
            break;
        }
        queued += 1;
    }

    debug!(id = %id, queued, "worker finished");
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a drop guard?
//    - A value whose Drop impl does some cleanup
//    - Drop runs on every exit path: normal return, early `return`, or a
//      panic unwinding through the function
//
// 2. Why is the variable named `_completion` and not `_`?
//    - `let _ = value;` drops the value immediately
//    - `let _name = value;` keeps it alive until the end of the scope
//
// 3. What is Arc<dyn Fetcher>?
//    - A shared pointer to "some type that implements Fetcher"
//    - The worker doesn't know (or care) whether it's the fixture or HTTP
// -----------------------------------------------------------------------------

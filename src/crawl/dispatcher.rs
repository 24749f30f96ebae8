// src/crawl/dispatcher.rs
// =============================================================================
// The dispatcher is the single control loop of a crawl.
//
// It owns the receiving ends of both channels:
// - pending: identifiers that have been claimed and need a worker
// - done: one () per worker that finished
//
// and a plain `usize` counting workers that are in flight. Only this loop
// touches the counter, so it needs no atomics or locks.
//
// Termination: when the counter is zero, every spawned worker has signalled
// completion. Workers enqueue their discoveries *before* signalling, so at
// that moment anything still owed to the crawl is already sitting in the
// pending queue. One non-blocking look at the queue decides between "spawn
// it and keep going" and "done".
// =============================================================================

use super::frontier::PendingReceiver;
use super::worker::{self, CrawlContext};
use crate::fetch::Identifier;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

pub(crate) struct Dispatcher {
    ctx: Arc<CrawlContext>,
    pending: PendingReceiver,
    done: mpsc::UnboundedReceiver<()>,
}

impl Dispatcher {
    pub(crate) fn new(
        ctx: Arc<CrawlContext>,
        pending: PendingReceiver,
        done: mpsc::UnboundedReceiver<()>,
    ) -> Self {
        Self { ctx, pending, done }
    }

    /// Crawls everything reachable from `seed`, returning once no worker is
    /// left in flight.
    pub(crate) async fn run(mut self, seed: Identifier) {
        // First claim of the run, so this always succeeds
        if !self.ctx.frontier.mark_visited(&seed) {
            return;
        }
        // We hold the receiver, so the queue cannot be closed. The queue is
        // empty, so even a bounded one has room.
        if self.ctx.frontier.enqueue(seed).await.is_err() {
            return;
        }

        let mut in_flight: usize = 0;

        'running: loop {
            while in_flight == 0 {
                match self.pending.try_recv() {
                    Some(id) => self.dispatch(id, &mut in_flight),
                    None => break 'running,
                }
            }

            tokio::select! {
                Some(id) = self.pending.recv() => self.dispatch(id, &mut in_flight),
                Some(()) = self.done.recv() => {
                    in_flight = in_flight.saturating_sub(1);
                    debug!(in_flight, "worker completed");
                }
                // Both channels closed; cannot happen while we hold the context
                else => break,
            }
        }

        debug!(visited = self.ctx.frontier.visited_count(), "dispatcher done");
    }

    fn dispatch(&self, id: Identifier, in_flight: &mut usize) {
        if self.ctx.is_shutdown() {
            debug!(id = %id, "shutdown requested, not spawning");
            return;
        }

        *in_flight += 1;
        debug!(id = %id, in_flight = *in_flight, "spawning worker");
        tokio::spawn(worker::process(Arc::clone(&self.ctx), id));
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does tokio::select! do?
//    - Waits on several futures at once and runs the branch of whichever
//      finishes first; the other futures are dropped
//    - `Some(id) = ...` only matches a real message; a closed channel
//      (None) disables that branch instead
//    - The `else` branch runs when every branch is disabled
//
// 2. Why a labeled loop ('running)?
//    - `break` inside the inner `while` would only leave the `while`
//    - `break 'running` leaves the outer loop directly
//
// 3. Why is in_flight a plain usize and not an AtomicUsize?
//    - Only this loop reads or writes it; workers talk to it through the
//      `done` channel instead of touching the number
//
// 4. What does tokio::spawn return?
//    - A JoinHandle. We drop it: the task keeps running (it is detached),
//      and we learn it finished through the `done` channel
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::frontier::Frontier;
    use crate::fetch::FixtureFetcher;
    use crate::report::CollectingSink;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    #[tokio::test]
    async fn test_single_node_terminates() {
        let sink = Arc::new(CollectingSink::new());
        let (frontier, pending) = Frontier::new(Some(1));
        let (done, done_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(CrawlContext {
            frontier,
            fetcher: Arc::new(FixtureFetcher::new().with_page("only", "O", &[])),
            sink: Arc::clone(&sink) as Arc<dyn crate::report::CrawlSink>,
            limiter: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            done,
        });

        let run = Dispatcher::new(Arc::clone(&ctx), pending, done_rx).run("only".to_string());
        tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("dispatcher did not finish");

        assert_eq!(sink.found_ids(), vec!["only"]);
        assert_eq!(ctx.frontier.visited_count(), 1);
    }
}

// src/crawl/frontier.rs
// =============================================================================
// The frontier: which identifiers have been claimed, and which are waiting to
// be processed.
//
// Two pieces of state:
// - the visited set (a HashSet behind a Mutex). An identifier goes in once
//   and never comes out.
// - the sending half of the pending queue. Workers push newly claimed
//   identifiers here; the dispatcher is the only reader.
//
// Claiming is a single operation (`mark_visited`). There is deliberately no
// "has this been visited?" query: if two workers could each ask and then
// each mark, both would see "no" and the node would be fetched twice.
// =============================================================================

use crate::fetch::Identifier;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::mpsc;

/// The dispatcher stopped listening; nothing more can be queued.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("pending queue closed")]
pub struct QueueClosed;

// Bounded when the caller asked for backpressure, unbounded otherwise
#[derive(Debug)]
enum PendingSender {
    Bounded(mpsc::Sender<Identifier>),
    Unbounded(mpsc::UnboundedSender<Identifier>),
}

/// Receiving half of the pending queue, owned by the dispatcher.
#[derive(Debug)]
pub(crate) enum PendingReceiver {
    Bounded(mpsc::Receiver<Identifier>),
    Unbounded(mpsc::UnboundedReceiver<Identifier>),
}

impl PendingReceiver {
    pub(crate) async fn recv(&mut self) -> Option<Identifier> {
        match self {
            PendingReceiver::Bounded(rx) => rx.recv().await,
            PendingReceiver::Unbounded(rx) => rx.recv().await,
        }
    }

    // Non-blocking; None when nothing is queued right now
    pub(crate) fn try_recv(&mut self) -> Option<Identifier> {
        match self {
            PendingReceiver::Bounded(rx) => rx.try_recv().ok(),
            PendingReceiver::Unbounded(rx) => rx.try_recv().ok(),
        }
    }
}

#[derive(Debug)]
pub struct Frontier {
    visited: Mutex<HashSet<Identifier>>,
    pending: PendingSender,
}

impl Frontier {
    /// Creates an empty frontier and the receiver for its pending queue.
    ///
    /// `queue_capacity` of `None` means unbounded. A capacity of 0 is treated
    /// as 1 (tokio channels need room for at least one item).
    pub(crate) fn new(queue_capacity: Option<usize>) -> (Self, PendingReceiver) {
        let (pending, receiver) = match queue_capacity {
            Some(capacity) => {
                let (tx, rx) = mpsc::channel(capacity.max(1));
                (PendingSender::Bounded(tx), PendingReceiver::Bounded(rx))
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                (PendingSender::Unbounded(tx), PendingReceiver::Unbounded(rx))
            }
        };

        let frontier = Self {
            visited: Mutex::new(HashSet::new()),
            pending,
        };
        (frontier, receiver)
    }

    /// Claims `id` for processing.
    ///
    /// Returns true exactly once per identifier across all callers; every
    /// later call returns false.
    pub fn mark_visited(&self, id: &str) -> bool {
        let mut visited = self.visited();
        if visited.contains(id) {
            return false;
        }
        visited.insert(id.to_string())
    }

    /// Pushes a claimed identifier onto the pending queue.
    ///
    /// Waits for room if the queue is bounded and full.
    pub async fn enqueue(&self, id: Identifier) -> Result<(), QueueClosed> {
        match &self.pending {
            PendingSender::Bounded(tx) => tx.send(id).await.map_err(|_| QueueClosed),
            PendingSender::Unbounded(tx) => tx.send(id).map_err(|_| QueueClosed),
        }
    }

    /// How many identifiers have been claimed so far (for logging/tests only).
    pub fn visited_count(&self) -> usize {
        self.visited().len()
    }

    // The set is only ever inserted into, so a poisoned lock still holds a
    // usable set
    fn visited(&self) -> MutexGuard<'_, HashSet<Identifier>> {
        self.visited.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is mark_visited one method instead of contains() + insert()?
//    - Between a separate check and a separate insert, another worker can
//      run the same check and also see "not visited"
//    - Holding the lock across both steps makes the claim all-or-nothing
//
// 2. std::sync::Mutex inside async code?
//    - Fine as long as the guard is never held across an .await
//    - mark_visited never awaits, so the lock is held for microseconds
//
// 3. What is MutexGuard?
//    - The value lock() returns; the lock is released when it is dropped
//
// 4. Why an enum around two channel types?
//    - tokio's bounded and unbounded channels are different types
//    - The enum lets the rest of the code treat them as one queue
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_mark_visited_claims_once() {
        let (frontier, _rx) = Frontier::new(None);
        assert!(frontier.mark_visited("a"));
        assert!(!frontier.mark_visited("a"));
        assert!(frontier.mark_visited("b"));
        assert_eq!(frontier.visited_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_one_winner() {
        let (frontier, _rx) = Frontier::new(None);
        let frontier = Arc::new(frontier);

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                tokio::spawn(async move { frontier.mark_visited("contested") })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_enqueue_reaches_receiver() {
        let (frontier, mut rx) = Frontier::new(None);
        frontier.enqueue("a".to_string()).await.unwrap();
        frontier.enqueue("b".to_string()).await.unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        assert_eq!(rx.try_recv().as_deref(), Some("b"));
        assert_eq!(rx.try_recv(), None);
    }

    #[tokio::test]
    async fn test_bounded_queue_applies_backpressure() {
        let (frontier, mut rx) = Frontier::new(Some(1));
        frontier.enqueue("a".to_string()).await.unwrap();

        // Queue is full: the second enqueue must wait
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), frontier.enqueue("b".to_string()))
                .await;
        assert!(blocked.is_err());

        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        frontier.enqueue("c".to_string()).await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_zero_capacity_is_usable() {
        let (frontier, mut rx) = Frontier::new(Some(0));
        frontier.enqueue("a".to_string()).await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_enqueue_after_receiver_dropped() {
        let (frontier, rx) = Frontier::new(None);
        drop(rx);
        assert_eq!(frontier.enqueue("a".to_string()).await, Err(QueueClosed));
    }
}

//! # Event queue: unbounded FIFO with a single shared read cursor.
//!
//! [`EventQueue`] is a thin wrapper around `tokio::sync::mpsc` that gives
//! producers a never-blocking [`push`](EventQueue::push) and consumers a
//! timeout-bounded [`pop`](EventQueue::pop), so polling workers can
//! interleave event draining with their own loop work.
//!
//! ## Architecture
//! ```text
//! Producers (many):                      Consumers (share one cursor):
//!   worker A ──┐
//!   worker B ──┼──► unbounded mpsc ──► Mutex<Receiver> ──► pop(timeout)
//!   worker N ──┘    (global FIFO)
//! ```
//!
//! ## Rules
//! - **Global FIFO**: push A then B (from any sources) guarantees A pops
//!   before B. No per-source ordering beyond that.
//! - **Exactly-once consumption**: one pop consumes one message; this is a
//!   work queue, not a broadcast. Consumers dispatch by kind and ignore what
//!   isn't theirs by convention.
//! - **No bound, no persistence**: the queue grows without limit if
//!   consumption stops. That is a documented design choice — consumers must
//!   keep pace; the runtime will not silently cap or shed.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::time;

use super::message::EventMessage;

/// Unbounded FIFO channel carrying [`EventMessage`]s.
///
/// Cloning is cheap; every clone pushes into and pops from the same queue.
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use foreman::{EventKind, EventMessage, EventQueue};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = EventQueue::new();
/// queue.push(EventMessage::new("bot", EventKind::MetadataUpdated, json!({"song": "x"})));
///
/// let msg = queue.pop(Duration::from_millis(10)).await.unwrap();
/// assert_eq!(msg.source, "bot");
///
/// // drained: pop times out empty
/// assert!(queue.pop(Duration::from_millis(10)).await.is_none());
/// # }
/// ```
#[derive(Clone)]
pub struct EventQueue {
    tx: mpsc::UnboundedSender<EventMessage>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<EventMessage>>>,
    depth: Arc<AtomicUsize>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Enqueues a message. Never blocks the caller.
    ///
    /// The send only fails if the receiver half is gone, which cannot outlive
    /// the queue itself; a message pushed into a queue nobody will ever drain
    /// is dropped silently, matching the best-effort delivery contract.
    pub fn push(&self, msg: EventMessage) {
        if self.tx.send(msg).is_ok() {
            self.depth.fetch_add(1, AtomicOrdering::Relaxed);
        }
    }

    /// Dequeues the oldest message, waiting up to `timeout`.
    ///
    /// Returns `None` when the timeout elapses with nothing to deliver.
    /// Concurrent poppers serialize on the shared cursor: each message is
    /// delivered to exactly one of them.
    pub async fn pop(&self, timeout: Duration) -> Option<EventMessage> {
        let mut rx = self.rx.lock().await;
        match time::timeout(timeout, rx.recv()).await {
            Ok(msg) => {
                if msg.is_some() {
                    self.depth.fetch_sub(1, AtomicOrdering::Relaxed);
                }
                msg
            }
            Err(_elapsed) => None,
        }
    }

    /// Number of messages currently waiting.
    ///
    /// Snapshot only — racing producers make it stale immediately. Useful for
    /// logs and for embedders watching queue growth.
    pub fn len(&self) -> usize {
        self.depth.load(AtomicOrdering::Relaxed)
    }

    /// True when nothing is waiting. Same staleness caveat as [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

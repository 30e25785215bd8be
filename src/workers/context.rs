//! # WorkerContext: the handles a worker runs against.
//!
//! Bundles the worker's slot name with its [`SharedState`] and
//! [`EventQueue`] handles. The registry builds one per spawn and the driver
//! passes it by reference into every lifecycle call — workers never reach
//! for globals, which is what makes them testable with substituted fakes.

use std::sync::Arc;

use serde_json::Value;

use crate::events::{EventKind, EventMessage, EventQueue};
use crate::state::SharedState;

/// Per-spawn bundle of a worker's name and coordination handles.
///
/// Cloning is cheap; both inner handles are `Arc`-backed.
///
/// ## Example
/// ```
/// use foreman::{EventKind, EventQueue, SharedState, WorkerContext};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let ctx = WorkerContext::new("bot", SharedState::new(), EventQueue::new());
/// ctx.push_event(EventKind::StreamStopped, json!(null));
///
/// let msg = ctx.queue().pop(std::time::Duration::from_millis(10)).await.unwrap();
/// assert_eq!(msg.source, "bot");
/// # }
/// ```
#[derive(Clone)]
pub struct WorkerContext {
    name: Arc<str>,
    state: SharedState,
    queue: EventQueue,
}

impl WorkerContext {
    /// Creates a context for the named worker slot.
    pub fn new(name: impl Into<Arc<str>>, state: SharedState, queue: EventQueue) -> Self {
        Self {
            name: name.into(),
            state,
            queue,
        }
    }

    /// The worker's slot name (the key in `SharedState.runners`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle to the shared state store.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Handle to the event queue.
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Pushes an event stamped with this worker's name as `source`.
    ///
    /// Sugar over [`EventQueue::push`]; never blocks.
    pub fn push_event(&self, kind: EventKind, payload: Value) {
        self.queue
            .push(EventMessage::new(self.name.as_ref(), kind, payload));
    }
}

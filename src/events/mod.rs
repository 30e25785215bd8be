//! Worker coordination events: message type and queue.
//!
//! This module groups the event **data model** and the **queue** workers use
//! to signal each other and the supervisor asynchronously.
//!
//! ## Contents
//! - [`EventKind`], [`EventMessage`] event classification and payload
//! - [`EventQueue`] unbounded global-FIFO channel with a single shared
//!   read cursor
//!
//! ## Quick reference
//! - **Producers**: any worker, via
//!   [`WorkerContext::push_event`](crate::WorkerContext::push_event).
//! - **Consumers**: reactive workers draining [`EventQueue::pop`] and
//!   dispatching by [`EventKind`]. One pop consumes one message; the queue
//!   is not a broadcast.

mod message;
mod queue;

pub use message::{EventKind, EventMessage};
pub use queue::EventQueue;

//! # Coordination messages exchanged between workers.
//!
//! [`EventKind`] is the closed set of signals the crew understands;
//! [`EventMessage`] carries one signal with its source and an opaque JSON
//! payload.
//!
//! ## Rules
//! - A message has no identity beyond its position in the queue: no ids,
//!   no dedup, global FIFO only.
//! - `payload` is owned by the producing worker's domain; the runtime never
//!   inspects it.

use serde::Serialize;
use serde_json::Value;

/// Classification of coordination events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventKind {
    /// The upstream resource looks wedged; whoever owns it should reset it.
    ///
    /// Emitted by the status monitor after its failure threshold is crossed,
    /// and on every failing probe thereafter until the upstream recovers.
    ResetUpstream,

    /// Fresh channel data is available in the payload.
    ///
    /// Lets consumers pick up updated data without probing themselves.
    ChannelsUpdated,

    /// Now-playing metadata changed for the active resource.
    MetadataUpdated,

    /// A live stream was torn down and its consumers should stop.
    StreamStopped,
}

/// One coordination message.
///
/// Created by the producing worker (usually via
/// [`WorkerContext::push_event`](crate::WorkerContext::push_event), which
/// stamps the worker's own name as `source`), owned by the queue until
/// exactly one consumer pops it.
///
/// ## Example
/// ```
/// use foreman::{EventKind, EventMessage};
/// use serde_json::json;
///
/// let msg = EventMessage::new("status-monitor", EventKind::ResetUpstream, json!("bad status check"));
/// assert_eq!(msg.source, "status-monitor");
/// assert_eq!(msg.kind, EventKind::ResetUpstream);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct EventMessage {
    /// Name of the worker that produced the message.
    pub source: String,
    /// Event classification.
    pub kind: EventKind,
    /// Opaque, serializable payload; `Value::Null` when there is nothing to say.
    pub payload: Value,
}

impl EventMessage {
    /// Creates a new message.
    pub fn new(source: impl Into<String>, kind: EventKind, payload: Value) -> Self {
        Self {
            source: source.into(),
            kind,
            payload,
        }
    }
}

//! # SharedState: the lock-guarded field store.
//!
//! One exclusive lock guards the whole store. Every accessor acquires it
//! internally for the duration of a single read or write, so no caller ever
//! observes a partially written value and no two writers interleave on the
//! same field.
//!
//! ## Architecture
//! ```text
//! Supervisor ──┐
//! Worker A  ───┼──► SharedState (Arc) ──► Mutex ──► { fields, runners }
//! Worker B  ───┘         cheap clone per holder
//! ```
//!
//! ## Rules
//! - One lock for the whole store; there are no per-field locks. Fields are
//!   small and touched at multi-second cadence, so contention is a non-issue.
//! - Critical sections are plain map operations and must never await.
//! - A mutation is visible to every handle on its next read.
//!
//! ## Known risk
//! A holder dying mid-section would poison the lock. Nothing here can panic
//! while holding it, and recovery falls back to the inner value rather than
//! propagating the poison.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::core::RunnerId;

#[derive(Default)]
struct StateInner {
    /// Free-form worker-owned fields.
    fields: HashMap<String, Value>,
    /// One slot per worker name: the recorded runner id, or `None` after the
    /// supervisor's probe cleared a dead entry.
    runners: HashMap<String, Option<RunnerId>>,
}

/// Handle to the shared coordination store.
///
/// Cloning is cheap (an `Arc` bump); every component holds its own clone,
/// injected at construction. There is deliberately no ambient global.
///
/// ## Example
/// ```
/// use foreman::{SharedState, fields};
/// use serde_json::json;
///
/// let state = SharedState::new();
/// state.set_flag(fields::UPSTREAM_RUNNING, true);
/// state.set(fields::ACTIVE_UPSTREAM_ID, json!("ch-44"));
///
/// let other = state.clone();
/// assert!(other.flag(fields::UPSTREAM_RUNNING));
/// assert_eq!(other.get(fields::ACTIVE_UPSTREAM_ID), Some(json!("ch-44")));
/// ```
#[derive(Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<StateInner>>,
}

impl SharedState {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, StateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a clone of the field's current value, if set.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.locked().fields.get(field).cloned()
    }

    /// Writes a field. The previous value, if any, is overwritten.
    pub fn set(&self, field: impl Into<String>, value: Value) {
        self.locked().fields.insert(field.into(), value);
    }

    /// Reads a boolean guard field; unset or non-boolean reads as `false`.
    pub fn flag(&self, field: &str) -> bool {
        self.locked()
            .fields
            .get(field)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Writes a boolean guard field.
    pub fn set_flag(&self, field: impl Into<String>, value: bool) {
        self.set(field, Value::Bool(value));
    }

    /// Records (or clears) the runner slot for a worker name.
    ///
    /// Called by the registry when a worker is spawned, and by the
    /// supervisor's liveness probe when the recorded runner is gone.
    pub fn set_runner(&self, name: impl Into<String>, id: Option<RunnerId>) {
        self.locked().runners.insert(name.into(), id);
    }

    /// Returns the recorded runner id for a worker name.
    ///
    /// `None` covers both "no slot yet" and "slot cleared" — the supervisor
    /// treats them identically (ABSENT).
    pub fn runner(&self, name: &str) -> Option<RunnerId> {
        self.locked().runners.get(name).copied().flatten()
    }

    /// Snapshot of every runner slot, for logs and shutdown reporting.
    pub fn runners(&self) -> HashMap<String, Option<RunnerId>> {
        self.locked().runners.clone()
    }
}

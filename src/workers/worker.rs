//! # Worker lifecycle contract.
//!
//! This module defines the [`Worker`] trait: an async unit with a
//! `setup → iteration* → teardown` lifecycle, driven by the runtime.
//! Workers never spawn themselves; the supervisor builds one from its
//! [`WorkerSpec`](crate::WorkerSpec) factory and hands it to the driver.
//!
//! ## Lifecycle
//! ```text
//! CREATED ──setup()──► RUNNING ──┬─ cancellation at iteration boundary ──► STOPPED
//!                      loop:     └─ setup/iteration error or panic ─────► CRASHED
//!                        iteration()
//!                        sleep(poll_delay())   (cancellable)
//! ```
//!
//! ## Rules
//! - Iterations are the unit of cancellation granularity: the driver checks
//!   the token **between** iterations, never inside one. Keep iterations
//!   short.
//! - Two shapes fit the one trait:
//!   - **looped workers** do one slice of work per iteration and report a
//!     non-zero [`poll_delay`](Worker::poll_delay);
//!   - **reactive workers** block on
//!     [`EventQueue::pop`](crate::EventQueue::pop) with their own timeout
//!     inside `iteration` and leave `poll_delay` at zero.
//! - A worker has no name of its own; the slot name lives in the
//!   [`WorkerSpec`](crate::WorkerSpec) and reaches the worker through
//!   [`WorkerContext::name`](crate::WorkerContext::name).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::WorkerError;
use crate::workers::context::WorkerContext;

/// Asynchronous supervised unit with a setup/loop/teardown lifecycle.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use std::time::Duration;
/// use foreman::{Worker, WorkerContext, WorkerError, EventKind};
/// use serde_json::json;
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Worker for Heartbeat {
///     async fn iteration(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
///         ctx.push_event(EventKind::MetadataUpdated, json!({"beat": true}));
///         Ok(())
///     }
///
///     fn poll_delay(&self) -> Duration {
///         Duration::from_secs(1)
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + 'static {
    /// One-time initialization, run before the first iteration.
    ///
    /// An error here is a crash: the task exits and the supervisor respawns
    /// a fresh worker on its next tick.
    async fn setup(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        let _ = ctx;
        Ok(())
    }

    /// One slice of the worker's loop.
    ///
    /// Called repeatedly until cancellation is observed at a boundary or an
    /// error crashes the worker. Implementations must not loop forever
    /// internally — return and let the driver schedule the next slice.
    async fn iteration(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError>;

    /// Cleanup, run exactly once on the way out — after cancellation *and*
    /// after a crash. Errors here are logged, never escalated.
    async fn teardown(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        let _ = ctx;
        Ok(())
    }

    /// Delay the driver sleeps after each iteration.
    ///
    /// Read after every iteration, so adaptive cadences (see
    /// [`StatusMonitor`](crate::StatusMonitor)) just update their own state.
    /// Zero means no sleep — reactive workers that block on the queue inside
    /// `iteration` should keep it at zero.
    fn poll_delay(&self) -> Duration {
        Duration::ZERO
    }
}

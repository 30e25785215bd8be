//! # foreman
//!
//! **Foreman** is a supervision runtime for a fixed crew of long-running
//! named workers that coordinate through shared state and an event queue.
//!
//! It keeps every required worker alive — respawning any that die — and
//! gives workers two asynchronous coordination surfaces: a lock-guarded
//! field store and a global-FIFO message queue. The crate is the engine of a
//! larger application; domain workers (proxy clients, chat bots, archivers)
//! plug in through the [`Worker`] trait and stay out of the core.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  WorkerSpec  │   │  WorkerSpec  │   │  WorkerSpec  │
//!     │   "server"   │   │    "bot"     │   │  "archiver"  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (tick loop)                                           │
//! │  - probe liveness of every recorded runner (ProcessMonitor)       │
//! │  - clear dead slots, respawn required absentees                   │
//! │  - settle after spawns, drain the pool on termination signal      │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ worker task  │   │ worker task  │   │ worker task  │
//!     │ setup/loop/  │   │ (pool-bound  │   │              │
//!     │ teardown     │   │  admission)  │   │              │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │    reads/writes  │                  │
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SharedState (one exclusive lock)   │   EventQueue (global FIFO)  │
//! │  fields + runners slot map          │   push / pop(timeout)       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! WorkerSpec ──► Supervisor tick ──► Registry::spawn ──► run_worker()
//!                                                          CREATED → RUNNING → STOPPED | CRASHED
//! crashed / killed ──► probe finds runner gone ──► respawn next tick
//! ```
//!
//! ## Feature areas
//! | Area              | Purpose                                                      | Types                                          |
//! |-------------------|--------------------------------------------------------------|------------------------------------------------|
//! | **Supervision**   | Keep the named crew alive; drain gracefully on signal.       | [`Supervisor`], [`SupervisorConfig`]           |
//! | **Coordination**  | Cross-worker mutable state and typed messages.               | [`SharedState`], [`EventQueue`], [`EventMessage`] |
//! | **Workers**       | Lifecycle contract and the per-spawn dispatch table.         | [`Worker`], [`WorkerContext`], [`WorkerSpec`]  |
//! | **Health**        | Canonical adaptive upstream monitor with escalation.         | [`StatusMonitor`], [`ChannelProbe`]            |
//! | **Errors**        | Typed errors for runtime, workers, and probes.               | [`RuntimeError`], [`WorkerError`], [`ProbeError`] |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use serde_json::json;
//! use foreman::{
//!     EventKind, EventQueue, SharedState, Supervisor, SupervisorConfig,
//!     Worker, WorkerContext, WorkerError, WorkerSpec,
//! };
//!
//! /// Looped worker: announces metadata every 50ms.
//! struct Announcer;
//!
//! #[async_trait]
//! impl Worker for Announcer {
//!     async fn iteration(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
//!         ctx.push_event(EventKind::MetadataUpdated, json!({"song": "static"}));
//!         Ok(())
//!     }
//!
//!     fn poll_delay(&self) -> Duration {
//!         Duration::from_millis(50)
//!     }
//! }
//!
//! /// Reactive worker: drains the queue and dispatches by kind.
//! struct Listener;
//!
//! #[async_trait]
//! impl Worker for Listener {
//!     async fn iteration(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
//!         if let Some(msg) = ctx.queue().pop(Duration::from_millis(20)).await {
//!             match msg.kind {
//!                 EventKind::MetadataUpdated => { /* refresh the now-playing view */ }
//!                 _ => {}
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), foreman::RuntimeError> {
//!     let sup = Supervisor::new(
//!         SupervisorConfig::default(),
//!         SharedState::new(),
//!         EventQueue::new(),
//!     );
//!     let specs = vec![
//!         WorkerSpec::new("announcer", || Box::new(Announcer)),
//!         WorkerSpec::new("listener", || Box::new(Listener)),
//!     ];
//!
//!     // A binary would use `sup.run(specs)` and stop on SIGINT/SIGTERM.
//!     sup.run_until(specs, tokio::time::sleep(Duration::from_millis(200))).await
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod state;
mod workers;

// ---- Public re-exports ----

pub use crate::config::SupervisorConfig;
pub use crate::core::{ProcessMonitor, RunnerId, Supervisor};
pub use crate::error::{RuntimeError, WorkerError};
pub use crate::events::{EventKind, EventMessage, EventQueue};
pub use crate::state::{fields, SharedState};
pub use crate::workers::{
    ChannelProbe, HttpChannelProbe, ProbeError, StatusConfig, StatusMonitor, Worker,
    WorkerContext, WorkerSpec,
};

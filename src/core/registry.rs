//! # Registry: the bounded pool of running workers.
//!
//! Owns the task handles of every spawned worker and implements the
//! [`ProcessMonitor`] liveness capability over them.
//!
//! ## Architecture
//! ```text
//! Supervisor ──spawn(spec)──► Registry
//!                               ├─ allocate RunnerId, record slot in SharedState
//!                               ├─ tokio::spawn:
//!                               │    acquire pool permit (queues when full,
//!                               │                         cancellable, closes on shutdown)
//!                               │    run_worker(...)  (panics caught at this boundary)
//!                               │    log outcome: stopped / crashed / panicked
//!                               └─ handles: RunnerId → {name, JoinHandle, token}
//! ```
//!
//! ## Rules
//! - The slot is recorded **synchronously at submission**, so a worker still
//!   queued for a pool permit already probes alive — no duplicate spawn while
//!   the pool is saturated.
//! - A finished handle probes not-alive and is reaped on that same probe.
//! - Crashes never propagate: the task logs and exits; recovery is the
//!   supervisor's probe-and-respawn loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::monitor::{next_runner_id, ProcessMonitor, RunnerId};
use crate::core::runner::run_worker;
use crate::events::EventQueue;
use crate::state::SharedState;
use crate::workers::{WorkerContext, WorkerSpec};

/// Handle to one running (or pool-queued) worker.
struct RunnerHandle {
    name: Arc<str>,
    join: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Bounded pool owning worker task handles.
pub(crate) struct Registry {
    state: SharedState,
    queue: EventQueue,
    semaphore: Option<Arc<Semaphore>>,
    handles: Mutex<HashMap<RunnerId, RunnerHandle>>,
}

impl Registry {
    /// Creates a registry; `pool_limit = None` means no bound.
    pub(crate) fn new(
        state: SharedState,
        queue: EventQueue,
        pool_limit: Option<usize>,
    ) -> Arc<Self> {
        Arc::new(Self {
            state,
            queue,
            semaphore: pool_limit.map(|n| Arc::new(Semaphore::new(n))),
            handles: Mutex::new(HashMap::new()),
        })
    }

    fn locked(&self) -> MutexGuard<'_, HashMap<RunnerId, RunnerHandle>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submits one spawn: fresh worker from the spec's factory, slot recorded
    /// immediately, lifecycle driven on a pooled task.
    pub(crate) fn spawn(&self, spec: &WorkerSpec, parent: &CancellationToken) -> RunnerId {
        let id = next_runner_id();
        let name: Arc<str> = Arc::from(spec.name());
        let worker = spec.build();
        let ctx = WorkerContext::new(name.clone(), self.state.clone(), self.queue.clone());
        let token = parent.child_token();

        self.state.set_runner(spec.name(), Some(id));
        info!(worker = %name, runner = id, "spawning worker");

        let task_name = name.clone();
        let task_token = token.clone();
        let semaphore = self.semaphore.clone();
        let join = tokio::spawn(async move {
            let _permit = match semaphore {
                Some(sem) => {
                    let permit = sem.acquire_owned();
                    tokio::pin!(permit);
                    tokio::select! {
                        res = &mut permit => match res {
                            Ok(p) => Some(p),
                            // pool closed: shutdown in progress
                            Err(_closed) => return,
                        },
                        _ = task_token.cancelled() => return,
                    }
                }
                None => None,
            };

            match AssertUnwindSafe(run_worker(worker, ctx, task_token))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => info!(worker = %task_name, runner = id, "worker stopped"),
                Ok(Err(e)) => error!(
                    worker = %task_name,
                    runner = id,
                    label = e.as_label(),
                    error = %e,
                    "worker crashed"
                ),
                Err(_panic) => error!(worker = %task_name, runner = id, "worker panicked"),
            }
        });

        self.locked().insert(
            id,
            RunnerHandle {
                name,
                join,
                cancel: token,
            },
        );
        id
    }

    /// Closes the pool to new admissions; queued spawns exit without running.
    pub(crate) fn close(&self) {
        if let Some(sem) = &self.semaphore {
            sem.close();
        }
    }

    /// Number of handles currently held (running or pool-queued).
    pub(crate) fn active(&self) -> usize {
        self.locked().len()
    }

    /// Cancels every worker and waits up to `grace` for the pool to drain.
    ///
    /// Stragglers are force-aborted and their (sorted) names returned; either
    /// way the registry holds zero handles afterwards and every drained slot
    /// is cleared in shared state.
    pub(crate) async fn drain(&self, grace: Duration) -> Vec<String> {
        let handles: Vec<RunnerHandle> = {
            let mut map = self.locked();
            map.drain().map(|(_, h)| h).collect()
        };

        for h in &handles {
            h.cancel.cancel();
        }

        let deadline = time::Instant::now() + grace;
        let mut stuck = Vec::new();
        for mut h in handles {
            let remaining = deadline.saturating_duration_since(time::Instant::now());
            if time::timeout(remaining, &mut h.join).await.is_err() {
                h.join.abort();
                // aborted joins still resolve; await so nothing outlives drain
                let _ = h.join.await;
                stuck.push(h.name.to_string());
            }
            self.state.set_runner(h.name.as_ref(), None);
        }

        stuck.sort_unstable();
        stuck
    }
}

impl ProcessMonitor for Registry {
    /// A runner is alive while its handle exists and has not finished.
    /// Finished handles are reaped by the probe itself.
    fn is_alive(&self, id: RunnerId) -> bool {
        let mut map = self.locked();
        match map.get(&id) {
            Some(h) if !h.join.is_finished() => true,
            Some(_) => {
                map.remove(&id);
                false
            }
            None => false,
        }
    }
}

//! # Drive one worker's lifecycle.
//!
//! Executes a worker's `setup → iteration* → teardown` sequence against its
//! [`WorkerContext`], honoring cooperative cancellation at iteration
//! boundaries.
//!
//! ## Flow
//! ```text
//! setup() ── err ──► teardown() ──► CRASHED (task exits, supervisor respawns)
//!    │
//!    ▼
//! loop:
//!    token cancelled? ──► teardown() ──► STOPPED
//!    iteration() ── err ──► teardown() ──► CRASHED
//!    sleep(poll_delay())          (cancellable wait)
//! ```
//!
//! ## Rules
//! - The token is checked **between** iterations only; a worker mid-iteration
//!   runs its slice to the end. Keeping iterations short is the worker's job.
//! - `teardown` runs exactly once on every exit path; its errors are logged
//!   and swallowed.
//! - `WorkerError::Canceled` returned from an iteration counts as a clean
//!   stop, not a crash — it is how a worker acknowledges cancellation it
//!   noticed on its own.

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::workers::{Worker, WorkerContext};

/// Runs the full lifecycle of one worker instance.
///
/// Returns `Ok(())` for a clean stop (cancellation observed at a boundary)
/// and the causing error for a crash. The caller owns logging and cleanup.
pub(crate) async fn run_worker(
    mut worker: Box<dyn Worker>,
    ctx: WorkerContext,
    token: CancellationToken,
) -> Result<(), WorkerError> {
    let result = match worker.setup(&ctx).await {
        Err(WorkerError::Canceled) => Ok(()),
        Err(e) => Err(e),
        Ok(()) => drive_loop(worker.as_mut(), &ctx, &token).await,
    };

    if let Err(e) = worker.teardown(&ctx).await {
        tracing::warn!(worker = ctx.name(), error = %e, "teardown failed");
    }

    result
}

/// The RUNNING phase: iterations separated by cancellable sleeps.
async fn drive_loop(
    worker: &mut dyn Worker,
    ctx: &WorkerContext,
    token: &CancellationToken,
) -> Result<(), WorkerError> {
    loop {
        if token.is_cancelled() {
            return Ok(());
        }

        match worker.iteration(ctx).await {
            Ok(()) => {}
            Err(WorkerError::Canceled) => return Ok(()),
            Err(e) => return Err(e),
        }

        let delay = worker.poll_delay();
        if delay.is_zero() {
            // zero-delay loops still need a suspension point
            tokio::task::yield_now().await;
        } else {
            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;
    use crate::state::SharedState;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct Probe {
        setups: Arc<AtomicU32>,
        iterations: Arc<AtomicU32>,
        teardowns: Arc<AtomicU32>,
        fail_setup: bool,
        fail_after: Option<u32>,
    }

    #[async_trait]
    impl Worker for Probe {
        async fn setup(&mut self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
            self.setups.fetch_add(1, Ordering::SeqCst);
            if self.fail_setup {
                return Err(WorkerError::Setup {
                    error: "no disk".into(),
                });
            }
            Ok(())
        }

        async fn iteration(&mut self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
            let n = self.iterations.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_after.is_some_and(|limit| n > limit) {
                return Err(WorkerError::Iteration {
                    error: "boom".into(),
                });
            }
            Ok(())
        }

        async fn teardown(&mut self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
            self.teardowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn poll_delay(&self) -> std::time::Duration {
            Duration::from_millis(10)
        }
    }

    fn ctx() -> WorkerContext {
        WorkerContext::new("probe", SharedState::new(), EventQueue::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_at_boundary_is_clean_stop() {
        let iterations = Arc::new(AtomicU32::new(0));
        let teardowns = Arc::new(AtomicU32::new(0));
        let worker = Box::new(Probe {
            setups: Arc::new(AtomicU32::new(0)),
            iterations: iterations.clone(),
            teardowns: teardowns.clone(),
            fail_setup: false,
            fail_after: None,
        });

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_worker(worker, ctx(), token.clone()));

        time::sleep(Duration::from_millis(35)).await;
        token.cancel();
        let result = handle.await.unwrap();

        assert!(result.is_ok(), "boundary cancellation is STOPPED, not CRASHED");
        assert!(iterations.load(Ordering::SeqCst) >= 1);
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_setup_failure_still_tears_down() {
        let setups = Arc::new(AtomicU32::new(0));
        let iterations = Arc::new(AtomicU32::new(0));
        let teardowns = Arc::new(AtomicU32::new(0));
        let worker = Box::new(Probe {
            setups: setups.clone(),
            iterations: iterations.clone(),
            teardowns: teardowns.clone(),
            fail_setup: true,
            fail_after: None,
        });

        let result = run_worker(worker, ctx(), CancellationToken::new()).await;

        assert!(matches!(result, Err(WorkerError::Setup { .. })));
        assert_eq!(iterations.load(Ordering::SeqCst), 0, "loop never entered");
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_iteration_error_is_crash() {
        let teardowns = Arc::new(AtomicU32::new(0));
        let worker = Box::new(Probe {
            setups: Arc::new(AtomicU32::new(0)),
            iterations: Arc::new(AtomicU32::new(0)),
            teardowns: teardowns.clone(),
            fail_setup: false,
            fail_after: Some(2),
        });

        let result = run_worker(worker, ctx(), CancellationToken::new()).await;

        assert!(matches!(result, Err(WorkerError::Iteration { .. })));
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }
}

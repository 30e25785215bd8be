//! # Supervisor: keep the crew of required workers alive.
//!
//! The [`Supervisor`] owns the registry (pool), the shared state handle, and
//! the event queue. It runs a single cooperative tick loop: probe liveness of
//! every named worker, respawn the absent ones, settle, repeat — and drains
//! the whole pool on a termination signal.
//!
//! ## Per-name state machine
//! ```text
//! ABSENT ──probe finds no live runner──► SPAWNING ──(optimistic, next tick)──► ALIVE
//!    ▲                                                                          │
//!    └───────────────────────probe finds runner gone───────────────────────────┘
//! ```
//! `SPAWNING → ALIVE` is implicit: the supervisor never waits for
//! confirmation, it widens the next delay to the settle period instead.
//!
//! ## Tick
//! ```text
//! for every WorkerSpec:
//!   recorded runner alive? ──► yes: leave it be
//!     │ no
//!     ├─► clear the stale slot (self-healing, even for non-required names)
//!     └─► required right now? ──► Registry::spawn (exactly one submission)
//! sleep: settle (5s) if anything spawned this pass, else tick (0.1s)
//! ```
//!
//! ## Shutdown path
//! ```text
//! wait_for_shutdown_signal()
//!   └─► stop ticking
//!   └─► Registry::close()        (no new admissions)
//!   └─► cancel runtime token     (propagates to every worker token)
//!   └─► Registry::drain(grace):
//!         ├─ all stopped in time → Ok(())
//!         └─ stragglers          → aborted, Err(GraceExceeded { stuck })
//! ```
//!
//! ## Rules
//! - Respawn has **no backoff and no retry cap**: a worker that crashes on
//!   every spawn is retried each tick, bounded only by the tick/settle delay.
//!   The supervisor is deliberately self-healing, not judgmental.
//! - Workers and supervisor never talk synchronously; everything goes through
//!   [`SharedState`] and the [`EventQueue`].
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use foreman::{
//!     EventQueue, SharedState, Supervisor, SupervisorConfig,
//!     Worker, WorkerContext, WorkerError, WorkerSpec,
//! };
//!
//! struct Ticker;
//!
//! #[async_trait]
//! impl Worker for Ticker {
//!     async fn iteration(&mut self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
//!         Ok(())
//!     }
//!
//!     fn poll_delay(&self) -> Duration {
//!         Duration::from_millis(50)
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
//!     let specs = vec![WorkerSpec::new("ticker", || Box::new(Ticker))];
//!
//!     // In a binary, use `sup.run(specs)` to drain on SIGINT/SIGTERM.
//!     sup.run_until(specs, tokio::time::sleep(Duration::from_millis(200))).await
//! }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::SupervisorConfig;
use crate::core::monitor::ProcessMonitor;
use crate::core::registry::Registry;
use crate::core::shutdown;
use crate::error::RuntimeError;
use crate::events::EventQueue;
use crate::state::SharedState;
use crate::workers::WorkerSpec;

/// Coordinates liveness probing, respawning, and graceful drain for a fixed
/// table of named workers.
pub struct Supervisor {
    cfg: SupervisorConfig,
    state: SharedState,
    queue: EventQueue,
    registry: Arc<Registry>,
    monitor: Arc<dyn ProcessMonitor>,
}

impl Supervisor {
    /// Creates a supervisor around the given state and queue handles.
    ///
    /// The handles are shared: keep clones to seed fields before `run` and to
    /// consume events from outside the crew.
    pub fn new(cfg: SupervisorConfig, state: SharedState, queue: EventQueue) -> Self {
        let registry = Registry::new(state.clone(), queue.clone(), cfg.pool_limit());
        let monitor: Arc<dyn ProcessMonitor> = registry.clone();
        Self {
            cfg,
            state,
            queue,
            registry,
            monitor,
        }
    }

    /// The runtime configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Handle to the shared state store.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Handle to the event queue.
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Supervises the crew until a termination signal arrives, then drains.
    ///
    /// Returns `Ok(())` after a clean drain, or
    /// [`RuntimeError::GraceExceeded`] when stragglers had to be aborted.
    pub async fn run(&self, specs: Vec<WorkerSpec>) -> Result<(), RuntimeError> {
        self.run_until(specs, async {
            if let Err(e) = shutdown::wait_for_shutdown_signal().await {
                error!(error = %e, "signal listener failed; draining");
            }
        })
        .await
    }

    /// Supervises the crew until `shutdown` completes, then drains.
    ///
    /// The signal-driven [`run`](Supervisor::run) is this with the OS signal
    /// future; embedders and tests plug in their own shutdown condition.
    pub async fn run_until<F>(&self, specs: Vec<WorkerSpec>, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let token = CancellationToken::new();

        tokio::select! {
            _ = shutdown => {}
            _ = self.tick_loop(&specs, &token) => {}
        }

        self.drain(token).await
    }

    /// One liveness pass. Returns true if anything was spawned.
    fn tick(&self, specs: &[WorkerSpec], token: &CancellationToken) -> bool {
        let mut spawned = false;
        for spec in specs {
            let name = spec.name();
            let alive = self
                .state
                .runner(name)
                .map(|id| self.monitor.is_alive(id))
                .unwrap_or(false);
            if alive {
                continue;
            }

            if self.state.runner(name).is_some() {
                // self-healing: the recorded runner is gone, clear the slot
                // whether or not this name gets respawned below
                info!(worker = name, "recorded runner is gone");
                self.state.set_runner(name, None);
            }

            if !spec.is_required() {
                continue;
            }

            self.registry.spawn(spec, token);
            spawned = true;
        }
        spawned
    }

    /// Delay before the next pass: settle after any spawn, else the tight tick.
    fn next_delay(&self, spawned: bool) -> Duration {
        if spawned {
            self.cfg.settle
        } else {
            self.cfg.tick
        }
    }

    /// Probe/respawn forever; only `run_until`'s select ever exits this.
    async fn tick_loop(&self, specs: &[WorkerSpec], token: &CancellationToken) {
        loop {
            let spawned = self.tick(specs, token);
            time::sleep(self.next_delay(spawned)).await;
        }
    }

    /// Stops the pool, cancels every worker, waits out the grace window.
    async fn drain(&self, token: CancellationToken) -> Result<(), RuntimeError> {
        info!("shutdown requested; draining workers");
        self.registry.close();
        token.cancel();

        let stuck = self.registry.drain(self.cfg.grace).await;
        if stuck.is_empty() {
            info!("all workers stopped within grace");
            Ok(())
        } else {
            Err(RuntimeError::GraceExceeded {
                grace: self.cfg.grace,
                stuck,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkerError;
    use crate::workers::{Worker, WorkerContext};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use crate::core::monitor::RunnerId;

    /// Scripted liveness: only ids explicitly marked alive probe alive.
    #[derive(Default)]
    struct FakeMonitor {
        alive: Mutex<HashSet<RunnerId>>,
    }

    impl FakeMonitor {
        fn mark_alive(&self, id: RunnerId) {
            self.alive.lock().unwrap().insert(id);
        }
    }

    impl ProcessMonitor for FakeMonitor {
        fn is_alive(&self, id: RunnerId) -> bool {
            self.alive.lock().unwrap().contains(&id)
        }
    }

    /// Worker that idles at a long poll delay until cancelled.
    struct Parked;

    #[async_trait]
    impl Worker for Parked {
        async fn iteration(&mut self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
            Ok(())
        }

        fn poll_delay(&self) -> Duration {
            Duration::from_secs(3600)
        }
    }

    fn parked_spec(name: &str) -> WorkerSpec {
        WorkerSpec::new(name, || Box::new(Parked))
    }

    fn supervisor_with_fake(cfg: SupervisorConfig) -> (Supervisor, Arc<FakeMonitor>) {
        let state = SharedState::new();
        let queue = EventQueue::new();
        let registry = Registry::new(state.clone(), queue.clone(), cfg.pool_limit());
        let fake = Arc::new(FakeMonitor::default());
        let monitor: Arc<dyn ProcessMonitor> = fake.clone();
        (
            Supervisor {
                cfg,
                state,
                queue,
                registry,
                monitor,
            },
            fake,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_respawn_scenario_server_and_bot() {
        let (sup, fake) = supervisor_with_fake(SupervisorConfig::default());
        let specs = vec![parked_spec("server"), parked_spec("bot")];
        let token = CancellationToken::new();

        // tick 1: both absent, both spawned, settle delay
        let spawned = sup.tick(&specs, &token);
        assert!(spawned);
        assert_eq!(sup.next_delay(spawned), sup.cfg.settle);
        let server_1 = sup.state.runner("server").expect("server slot recorded");
        let bot_1 = sup.state.runner("bot").expect("bot slot recorded");

        // tick 2: server alive, bot crashed during setup → only bot respawned
        fake.mark_alive(server_1);
        let spawned = sup.tick(&specs, &token);
        assert!(spawned);
        assert_eq!(sup.next_delay(spawned), sup.cfg.settle);
        assert_eq!(
            sup.state.runner("server"),
            Some(server_1),
            "live worker keeps its runner"
        );
        let bot_2 = sup.state.runner("bot").expect("bot respawned");
        assert_ne!(bot_2, bot_1, "respawn allocates a fresh runner id");

        // tick 3: both alive → nothing spawned, tight delay
        fake.mark_alive(bot_2);
        let spawned = sup.tick(&specs, &token);
        assert!(!spawned);
        assert_eq!(sup.next_delay(spawned), sup.cfg.tick);

        token.cancel();
        sup.registry.drain(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_slot_healed_even_when_not_required() {
        let (sup, _fake) = supervisor_with_fake(SupervisorConfig::default());
        let specs = vec![parked_spec("archiver").with_required(|| false)];
        let token = CancellationToken::new();

        // stale record from a previous life; the fake reports it dead
        sup.state.set_runner("archiver", Some(999));

        let spawned = sup.tick(&specs, &token);

        assert!(!spawned, "non-required workers are never spawned");
        assert_eq!(
            sup.state.runner("archiver"),
            None,
            "the probe still clears the dead slot"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_double_spawns_a_live_worker() {
        let (sup, fake) = supervisor_with_fake(SupervisorConfig::default());
        let specs = vec![parked_spec("server")];
        let token = CancellationToken::new();

        sup.tick(&specs, &token);
        let id = sup.state.runner("server").unwrap();
        fake.mark_alive(id);

        for _ in 0..5 {
            assert!(!sup.tick(&specs, &token));
            assert_eq!(sup.state.runner("server"), Some(id));
        }

        token.cancel();
        sup.registry.drain(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_crashed_worker_respawned_through_real_registry() {
        struct Dying;

        #[async_trait]
        impl Worker for Dying {
            async fn iteration(&mut self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
                Err(WorkerError::Iteration {
                    error: "died immediately".into(),
                })
            }
        }

        let sup = Supervisor::new(
            SupervisorConfig::default(),
            SharedState::new(),
            EventQueue::new(),
        );
        let specs = vec![WorkerSpec::new("bot", || Box::new(Dying))];
        let token = CancellationToken::new();

        assert!(sup.tick(&specs, &token));
        let first = sup.state.runner("bot").expect("first spawn recorded");

        // let the worker run and crash
        time::sleep(Duration::from_millis(5)).await;

        assert!(sup.tick(&specs, &token), "dead runner triggers respawn");
        let second = sup.state.runner("bot").expect("respawn recorded");
        assert_ne!(first, second);

        token.cancel();
        sup.registry.drain(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drains_running_and_queued_workers() {
        let cfg = SupervisorConfig {
            max_workers: 2,
            ..SupervisorConfig::default()
        };
        let sup = Supervisor::new(cfg, SharedState::new(), EventQueue::new());
        let specs = vec![
            parked_spec("server"),
            parked_spec("bot"),
            parked_spec("archiver"),
        ];

        // 2 workers run, the third queues on the pool; shutdown takes all 3
        let result = sup
            .run_until(specs, time::sleep(Duration::from_millis(10)))
            .await;

        assert!(result.is_ok());
        assert_eq!(sup.registry.active(), 0, "pool fully drained");
    }

    #[tokio::test(start_paused = true)]
    async fn test_grace_exceeded_reports_and_aborts_stuck() {
        struct Stubborn;

        #[async_trait]
        impl Worker for Stubborn {
            async fn iteration(&mut self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
                time::sleep(Duration::from_secs(86_400)).await;
                Ok(())
            }
        }

        let cfg = SupervisorConfig {
            grace: Duration::from_millis(50),
            ..SupervisorConfig::default()
        };
        let sup = Supervisor::new(cfg, SharedState::new(), EventQueue::new());
        let specs = vec![WorkerSpec::new("hls", || Box::new(Stubborn))];

        let result = sup
            .run_until(specs, time::sleep(Duration::from_millis(10)))
            .await;

        match result {
            Err(RuntimeError::GraceExceeded { stuck, .. }) => {
                assert_eq!(stuck, vec!["hls".to_string()]);
            }
            other => panic!("expected GraceExceeded, got {other:?}"),
        }
        assert_eq!(sup.registry.active(), 0, "stragglers were aborted");
    }
}

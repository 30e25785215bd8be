//! # Demo: crew
//!
//! A two-worker crew where one member keeps crashing: the supervisor clears
//! its dead slot and respawns it every settle period while the steady worker
//! runs untouched.
//!
//! ## Flow
//! ```text
//! tick ──► "steady" alive, "flaky" absent
//!   ├─► Registry::spawn("flaky")          (fresh worker from the factory)
//!   ├─► sleep(settle)
//!   ├─► flaky crashes on its 3rd iteration
//!   └─► next tick finds the runner gone → respawn, forever
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example crew
//! ```

use std::time::Duration;

use async_trait::async_trait;
use foreman::{
    EventQueue, SharedState, Supervisor, SupervisorConfig, Worker, WorkerContext, WorkerError,
    WorkerSpec,
};

/// Steady member: ticks quietly until cancelled.
struct Steady;

#[async_trait]
impl Worker for Steady {
    async fn iteration(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        println!("[{}] tick", ctx.name());
        Ok(())
    }

    fn poll_delay(&self) -> Duration {
        Duration::from_secs(2)
    }
}

/// Flaky member: dies after a few iterations, every life.
struct Flaky {
    lives_left: u32,
}

#[async_trait]
impl Worker for Flaky {
    async fn setup(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        println!("[{}] fresh spawn", ctx.name());
        Ok(())
    }

    async fn iteration(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        if self.lives_left == 0 {
            println!("[{}] crashing", ctx.name());
            return Err(WorkerError::Iteration {
                error: "ran out of lives".into(),
            });
        }
        self.lives_left -= 1;
        println!("[{}] {} iterations until crash", ctx.name(), self.lives_left + 1);
        Ok(())
    }

    fn poll_delay(&self) -> Duration {
        Duration::from_millis(500)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), foreman::RuntimeError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 1. Tighten the cadence so the demo is lively
    let cfg = SupervisorConfig {
        settle: Duration::from_secs(2),
        ..SupervisorConfig::default()
    };

    // 2. Create the supervisor around fresh coordination handles
    let sup = Supervisor::new(cfg, SharedState::new(), EventQueue::new());

    // 3. Crew table: every respawn builds a fresh worker from the factory
    let specs = vec![
        WorkerSpec::new("steady", || Box::new(Steady)),
        WorkerSpec::new("flaky", || Box::new(Flaky { lives_left: 3 })),
    ];

    // 4. Let it run for a while, then drain
    println!("supervising for 15s; watch the flaky worker get respawned");
    sup.run_until(specs, tokio::time::sleep(Duration::from_secs(15)))
        .await
}

//! # Demo: status_monitor
//!
//! Runs the bundled [`StatusMonitor`] against a local endpoint that (almost
//! certainly) is not there, alongside a reactive worker that consumes the
//! monitor's escalations from the event queue.
//!
//! ## Flow
//! ```text
//! status-monitor ──probe /channels/──► failure
//!   ├─► cadence drops to the fast interval
//!   ├─► 4th consecutive failure → push ResetUpstream("bad status check")
//!   └─► every further failure → another ResetUpstream
//! responder ──pop(queue)──► "would reset the upstream now"
//! ```
//!
//! Start something that answers `GET http://127.0.0.1:9999/channels/` with
//! JSON to watch the success path: cadence snaps back to slow and
//! `ChannelsUpdated` carries the body.
//!
//! ## Run
//! ```bash
//! cargo run --example status_monitor
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use foreman::{
    fields, EventKind, EventQueue, HttpChannelProbe, SharedState, StatusConfig, StatusMonitor,
    Supervisor, SupervisorConfig, Worker, WorkerContext, WorkerError, WorkerSpec,
};

/// Reactive worker: drains the queue and acts on what the monitor found.
struct Responder;

#[async_trait]
impl Worker for Responder {
    async fn iteration(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        if let Some(msg) = ctx.queue().pop(Duration::from_millis(250)).await {
            match msg.kind {
                EventKind::ResetUpstream => {
                    println!("[responder] {} says: would reset the upstream now", msg.source);
                }
                EventKind::ChannelsUpdated => {
                    println!("[responder] fresh channels: {}", msg.payload);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 1. Shrink the monitor cadence so the demo escalates within seconds
    let status_cfg = StatusConfig {
        slow: Duration::from_secs(5),
        fast: Duration::from_secs(1),
        probe_timeout: Duration::from_secs(2),
        ..StatusConfig::default()
    };
    let probe = Arc::new(HttpChannelProbe::new(&status_cfg)?);

    // 2. Coordination handles; the guard flag gates probing
    let state = SharedState::new();
    let queue = EventQueue::new();
    state.set_flag(fields::UPSTREAM_RUNNING, true);

    // 3. Supervise the monitor and the responder until Ctrl-C
    let sup = Supervisor::new(SupervisorConfig::default(), state, queue);
    let specs = vec![
        StatusMonitor::spec(status_cfg, probe),
        WorkerSpec::new("responder", || Box::new(Responder)),
    ];

    println!("probing http://127.0.0.1:9999/channels/ — Ctrl-C to stop");
    sup.run(specs).await?;
    Ok(())
}

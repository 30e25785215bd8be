//! # Status monitor: adaptive health probing of the upstream resource.
//!
//! A looped [`Worker`] that periodically verifies the upstream dependency is
//! responsive and escalates over the event queue when it is not.
//!
//! ## Algorithm
//! ```text
//! each iteration:
//!   guard field false ──► no-op (sleep only)
//!   probe /channels/ ──► ok:   delay := slow, failures := 0,
//!   (bounded timeout)          push ChannelsUpdated(payload)
//!                      └─ err: delay := fast, failures += 1,
//!                              failures > threshold ──► push ResetUpstream
//! ```
//!
//! ## Rules
//! - The failure counter is **not** reset by escalating: once past the
//!   threshold, every failing iteration pushes another `ResetUpstream` until
//!   a success resets the counter. Redundant escalation beats missed
//!   recovery.
//! - A success snaps the cadence straight back to the slow baseline,
//!   regardless of how long the failure streak was.
//! - Probing is behind the [`ChannelProbe`] seam so tests script outcomes
//!   without a server; production uses [`HttpChannelProbe`] (reqwest).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::WorkerError;
use crate::events::EventKind;
use crate::state::fields;
use crate::workers::context::WorkerContext;
use crate::workers::spec::WorkerSpec;
use crate::workers::worker::Worker;

/// Errors produced by a health probe attempt.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Transport-level failure (connect, timeout, malformed body).
    #[error("probe request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("probe returned status {code}")]
    Status {
        /// HTTP status code of the failed response.
        code: u16,
    },
}

/// Settings for the status monitor.
///
/// ## Field semantics
/// - `host`/`port`: where the upstream's local HTTP endpoint listens.
///   A `0.0.0.0` bind host is probed via `127.0.0.1`.
/// - `slow`: poll interval while the upstream is healthy
/// - `fast`: poll interval while probes are failing
/// - `threshold`: consecutive failures tolerated before escalation;
///   escalation fires strictly *after* this count is exceeded
/// - `probe_timeout`: hard bound on one probe request
#[derive(Clone, Debug)]
pub struct StatusConfig {
    /// Host of the upstream health endpoint.
    pub host: String,
    /// Port of the upstream health endpoint.
    pub port: u16,
    /// Healthy poll interval.
    pub slow: Duration,
    /// Degraded poll interval.
    pub fast: Duration,
    /// Consecutive-failure count that must be exceeded to escalate.
    pub threshold: u32,
    /// Per-request probe timeout.
    pub probe_timeout: Duration,
}

impl Default for StatusConfig {
    /// Defaults: `127.0.0.1:9999`, slow 30s, fast 5s, threshold 3,
    /// probe timeout 10s.
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9999,
            slow: Duration::from_secs(30),
            fast: Duration::from_secs(5),
            threshold: 3,
            probe_timeout: Duration::from_secs(10),
        }
    }
}

/// One bounded health check against the upstream's channel listing.
#[async_trait]
pub trait ChannelProbe: Send + Sync + 'static {
    /// Fetches the channel listing; any error counts as a failed probe.
    async fn fetch_channels(&self) -> Result<Value, ProbeError>;
}

/// Production probe: `GET http://{host}:{port}/channels/` via reqwest.
pub struct HttpChannelProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpChannelProbe {
    /// Builds a probe with the config's bounded request timeout.
    pub fn new(cfg: &StatusConfig) -> Result<Self, ProbeError> {
        // An all-interfaces bind address is not routable as a target.
        let host = if cfg.host == "0.0.0.0" {
            "127.0.0.1"
        } else {
            cfg.host.as_str()
        };
        let client = reqwest::Client::builder()
            .timeout(cfg.probe_timeout)
            .build()?;
        Ok(Self {
            client,
            url: format!("http://{host}:{port}/channels/", port = cfg.port),
        })
    }
}

#[async_trait]
impl ChannelProbe for HttpChannelProbe {
    async fn fetch_channels(&self) -> Result<Value, ProbeError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProbeError::Status {
                code: status.as_u16(),
            });
        }
        Ok(resp.json::<Value>().await?)
    }
}

/// Canonical looped worker: adaptive upstream health monitoring.
///
/// See the module docs for the algorithm. Cadence and counters are
/// loop-local: a respawn starts the monitor fresh at the slow baseline.
pub struct StatusMonitor {
    cfg: StatusConfig,
    probe: Arc<dyn ChannelProbe>,
    delay: Duration,
    failures: u32,
}

impl StatusMonitor {
    /// Creates a monitor using the given probe implementation.
    pub fn new(cfg: StatusConfig, probe: Arc<dyn ChannelProbe>) -> Self {
        let delay = cfg.slow;
        Self {
            cfg,
            probe,
            delay,
            failures: 0,
        }
    }

    /// Convenience: a [`WorkerSpec`] for the slot name `"status-monitor"`.
    pub fn spec(cfg: StatusConfig, probe: Arc<dyn ChannelProbe>) -> WorkerSpec {
        WorkerSpec::new("status-monitor", move || {
            Box::new(StatusMonitor::new(cfg.clone(), probe.clone()))
        })
    }

    async fn check_upstream(&mut self, ctx: &WorkerContext) {
        if !ctx.state().flag(fields::UPSTREAM_RUNNING) {
            return;
        }

        debug!(worker = ctx.name(), "checking upstream status");
        match self.probe.fetch_channels().await {
            Ok(payload) => {
                self.delay = self.cfg.slow;
                self.failures = 0;
                ctx.push_event(EventKind::ChannelsUpdated, payload);
            }
            Err(err) => {
                self.delay = self.cfg.fast;
                self.failures += 1;
                warn!(
                    worker = ctx.name(),
                    failures = self.failures,
                    error = %err,
                    "upstream status check failed"
                );
                if self.failures > self.cfg.threshold {
                    ctx.push_event(EventKind::ResetUpstream, json!("bad status check"));
                }
            }
        }
    }
}

#[async_trait]
impl Worker for StatusMonitor {
    async fn iteration(&mut self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        self.check_upstream(ctx).await;
        Ok(())
    }

    fn poll_delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;
    use crate::state::SharedState;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Probe that replays a scripted sequence of outcomes.
    struct ScriptedProbe {
        outcomes: Mutex<VecDeque<Result<Value, u16>>>,
    }

    impl ScriptedProbe {
        fn new(outcomes: Vec<Result<Value, u16>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
            })
        }
    }

    #[async_trait]
    impl ChannelProbe for ScriptedProbe {
        async fn fetch_channels(&self) -> Result<Value, ProbeError> {
            let next = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("probe called more times than scripted");
            next.map_err(|code| ProbeError::Status { code })
        }
    }

    fn monitor_with(outcomes: Vec<Result<Value, u16>>) -> (StatusMonitor, WorkerContext) {
        let ctx = WorkerContext::new("status-monitor", SharedState::new(), EventQueue::new());
        ctx.state().set_flag(fields::UPSTREAM_RUNNING, true);
        let monitor = StatusMonitor::new(StatusConfig::default(), ScriptedProbe::new(outcomes));
        (monitor, ctx)
    }

    async fn drain_kinds(ctx: &WorkerContext) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Some(msg) = ctx.queue().pop(Duration::from_millis(5)).await {
            kinds.push(msg.kind);
        }
        kinds
    }

    #[tokio::test]
    async fn test_guard_off_is_noop() {
        let (mut monitor, ctx) = monitor_with(vec![]);
        ctx.state().set_flag(fields::UPSTREAM_RUNNING, false);

        monitor.iteration(&ctx).await.unwrap();

        assert_eq!(monitor.failures, 0);
        assert_eq!(monitor.poll_delay(), StatusConfig::default().slow);
        assert!(drain_kinds(&ctx).await.is_empty(), "no probe, no events");
    }

    #[tokio::test]
    async fn test_failure_shrinks_delay_and_counts() {
        let (mut monitor, ctx) = monitor_with(vec![Err(500)]);

        monitor.iteration(&ctx).await.unwrap();

        assert_eq!(monitor.failures, 1);
        assert_eq!(monitor.poll_delay(), StatusConfig::default().fast);
        assert!(drain_kinds(&ctx).await.is_empty(), "below threshold");
    }

    #[tokio::test]
    async fn test_escalates_on_fourth_failure_and_every_one_after() {
        let (mut monitor, ctx) = monitor_with(vec![Err(500); 6]);

        for expected in [0usize, 0, 0, 1, 1, 1] {
            monitor.iteration(&ctx).await.unwrap();
            let resets = drain_kinds(&ctx)
                .await
                .iter()
                .filter(|k| **k == EventKind::ResetUpstream)
                .count();
            assert_eq!(resets, expected, "failure {} of 6", monitor.failures);
        }
        assert_eq!(monitor.failures, 6, "counter never self-resets");
    }

    #[tokio::test]
    async fn test_three_failures_then_success_never_escalates() {
        let (mut monitor, ctx) = monitor_with(vec![
            Err(500),
            Err(500),
            Err(500),
            Ok(json!([{"id": "ch-1"}])),
        ]);

        let mut observed = Vec::new();
        for _ in 0..4 {
            monitor.iteration(&ctx).await.unwrap();
            observed.push(monitor.failures);
        }
        assert_eq!(observed, vec![1, 2, 3, 0]);

        let kinds = drain_kinds(&ctx).await;
        assert!(
            !kinds.contains(&EventKind::ResetUpstream),
            "threshold 3 is exceeded only on the 4th consecutive failure"
        );
        assert_eq!(
            kinds,
            vec![EventKind::ChannelsUpdated],
            "the one success publishes fresh channel data"
        );
    }

    #[tokio::test]
    async fn test_success_resets_regardless_of_streak() {
        let (mut monitor, ctx) = monitor_with(vec![
            Err(502),
            Err(502),
            Err(502),
            Err(502),
            Err(502),
            Ok(json!([])),
        ]);

        for _ in 0..6 {
            monitor.iteration(&ctx).await.unwrap();
        }

        assert_eq!(monitor.failures, 0);
        assert_eq!(monitor.poll_delay(), StatusConfig::default().slow);
    }

    #[tokio::test]
    async fn test_success_payload_reaches_queue() {
        let payload = json!([{"id": "ch-44", "name": "deep cuts"}]);
        let (mut monitor, ctx) = monitor_with(vec![Ok(payload.clone())]);

        monitor.iteration(&ctx).await.unwrap();

        let msg = ctx.queue().pop(Duration::from_millis(5)).await.unwrap();
        assert_eq!(msg.kind, EventKind::ChannelsUpdated);
        assert_eq!(msg.source, "status-monitor");
        assert_eq!(msg.payload, payload);
    }

    #[test]
    fn test_probe_url_rewrites_wildcard_host() {
        let cfg = StatusConfig {
            host: "0.0.0.0".to_string(),
            ..StatusConfig::default()
        };
        let probe = HttpChannelProbe::new(&cfg).unwrap();
        assert_eq!(probe.url, "http://127.0.0.1:9999/channels/");
    }
}

//! Error types used by the foreman runtime and workers.
//!
//! This module defines two error enums:
//!
//! - [`RuntimeError`] — errors raised by the supervision runtime itself.
//! - [`WorkerError`] — errors raised by individual worker lifecycles.
//!
//! Both types provide `as_label` for stable snake_case identifiers in
//! logs, plus helpers such as [`WorkerError::is_crash`].

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the foreman runtime.
///
/// These represent failures of the supervision machinery itself, such as a
/// shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; the listed workers did not stop
    /// cooperatively and were force-aborted.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}; workers were aborted")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of workers that had to be force-aborted.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use foreman::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # Errors produced by a worker lifecycle.
///
/// A worker that returns [`WorkerError::Canceled`] stopped cooperatively in
/// response to shutdown; any other variant is a crash. The supervisor does
/// not distinguish crash flavors — an absent worker is respawned on the next
/// tick either way — but the labels keep the logs honest about which phase
/// died.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// One-time setup failed; the worker never reached its loop.
    #[error("setup failed: {error}")]
    Setup {
        /// The underlying error message.
        error: String,
    },

    /// A loop iteration failed; the worker's task exits.
    #[error("iteration failed: {error}")]
    Iteration {
        /// The underlying error message.
        error: String,
    },

    /// The worker observed cancellation and stopped cleanly.
    #[error("worker canceled")]
    Canceled,
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use foreman::WorkerError;
    ///
    /// let err = WorkerError::Iteration { error: "boom".into() };
    /// assert_eq!(err.as_label(), "worker_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Setup { .. } => "worker_setup_failed",
            WorkerError::Iteration { .. } => "worker_failed",
            WorkerError::Canceled => "worker_canceled",
        }
    }

    /// True for terminal states the supervisor counts as CRASHED.
    ///
    /// [`WorkerError::Canceled`] is the one graceful exit; everything else
    /// means the worker died and will be respawned by the next liveness tick.
    ///
    /// # Example
    /// ```
    /// use foreman::WorkerError;
    ///
    /// assert!(WorkerError::Setup { error: "no disk".into() }.is_crash());
    /// assert!(!WorkerError::Canceled.is_crash());
    /// ```
    pub fn is_crash(&self) -> bool {
        !matches!(self, WorkerError::Canceled)
    }
}

//! # Global runtime configuration.
//!
//! Provides [`SupervisorConfig`] centralized settings for the supervision
//! runtime.
//!
//! ## Sentinel values
//! - `max_workers = 0` → unlimited (no pool semaphore created)
//!
//! ## Cadence model
//! The supervisor sleeps between liveness passes. Two delays exist:
//! - `tick`: the tight delay used when every required worker was found alive;
//! - `settle`: the widened delay applied after any spawn, so a fresh worker
//!   is not re-probed before its runner record lands.

use std::time::Duration;

/// Global configuration for the supervision runtime.
///
/// ## Field semantics
/// - `tick`: delay between liveness passes when nothing was spawned
/// - `settle`: delay after a pass that spawned at least one worker
/// - `grace`: maximum wait for workers to stop cooperatively on shutdown
///   (`0s` = abort immediately)
/// - `max_workers`: pool bound for simultaneously running workers
///   (`0` = unlimited)
///
/// All fields are public for flexibility. Prefer the helper accessors over
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Delay between liveness passes when all required workers are alive.
    pub tick: Duration,

    /// Delay applied after any pass that submitted a spawn.
    ///
    /// Spawned workers record their runner id asynchronously; probing again
    /// too early would read an empty slot and double-spawn. One settle period
    /// covers every spawn submitted in the same pass.
    pub settle: Duration,

    /// Maximum time to wait for cooperative shutdown before force-aborting.
    ///
    /// When a termination signal is received:
    /// - workers are cancelled via their `CancellationToken`s
    /// - the supervisor waits up to `grace` for the pool to drain
    /// - stragglers are aborted and reported via
    ///   [`RuntimeError::GraceExceeded`](crate::RuntimeError::GraceExceeded)
    pub grace: Duration,

    /// Maximum number of workers running simultaneously.
    ///
    /// - `0` = unlimited (no semaphore)
    /// - `n > 0` = at most `n` workers run at once; further spawns queue
    ///   until a slot frees
    pub max_workers: usize,
}

impl SupervisorConfig {
    /// Returns the pool bound as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` concurrent workers
    #[inline]
    pub fn pool_limit(&self) -> Option<usize> {
        if self.max_workers == 0 {
            None
        } else {
            Some(self.max_workers)
        }
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `tick = 100ms` (tight liveness cadence)
    /// - `settle = 5s` (post-spawn settle window)
    /// - `grace = 10s` (cooperative shutdown window)
    /// - `max_workers = 0` (unlimited)
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            settle: Duration::from_secs(5),
            grace: Duration::from_secs(10),
            max_workers: 0,
        }
    }
}

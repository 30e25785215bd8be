//! # Worker specification: the supervisor's dispatch table entry.
//!
//! [`WorkerSpec`] bundles a slot name, a factory that builds a fresh worker
//! per spawn, and a required-ness predicate. The supervisor holds a table of
//! these and never constructs workers any other way — dispatch is closed at
//! startup instead of passing types around.
//!
//! ## Rules
//! - The factory runs once per (re)spawn, so loop-local state (counters,
//!   adaptive delays) starts fresh after every crash.
//! - Required-ness is re-evaluated every tick: a spec whose predicate says
//!   `false` is skipped, not probed, not spawned (e.g. an archiver that is
//!   only required when archival is enabled).

use std::sync::Arc;

use crate::workers::worker::Worker;

type Factory = dyn Fn() -> Box<dyn Worker> + Send + Sync;
type RequiredFn = dyn Fn() -> bool + Send + Sync;

/// Specification for one named worker slot.
///
/// ## Example
/// ```
/// use async_trait::async_trait;
/// use foreman::{Worker, WorkerContext, WorkerError, WorkerSpec};
///
/// struct Archiver { enabled: bool }
///
/// #[async_trait]
/// impl Worker for Archiver {
///     async fn iteration(&mut self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
///         Ok(())
///     }
/// }
///
/// let archival_enabled = false;
/// let spec = WorkerSpec::new("archiver", || Box::new(Archiver { enabled: true }))
///     .with_required(move || archival_enabled);
///
/// assert_eq!(spec.name(), "archiver");
/// assert!(!spec.is_required());
/// ```
#[derive(Clone)]
pub struct WorkerSpec {
    name: Arc<str>,
    factory: Arc<Factory>,
    required: Option<Arc<RequiredFn>>,
}

impl WorkerSpec {
    /// Creates a spec that is always required.
    pub fn new(
        name: impl Into<Arc<str>>,
        factory: impl Fn() -> Box<dyn Worker> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
            required: None,
        }
    }

    /// Returns a spec gated on the given predicate, evaluated every tick.
    pub fn with_required(mut self, required: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.required = Some(Arc::new(required));
        self
    }

    /// The slot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this worker should be alive right now.
    pub fn is_required(&self) -> bool {
        self.required.as_ref().map_or(true, |f| f())
    }

    /// Builds a fresh worker instance for one spawn.
    pub(crate) fn build(&self) -> Box<dyn Worker> {
        (self.factory)()
    }
}

//! Catalogue of well-known shared-state field names.
//!
//! Workers own their domain fields and are free to define more; the names
//! below are the ones the runtime and the bundled status monitor agree on.

/// Whether the worker owning the upstream resource believes it is active.
///
/// Guard field for the status monitor: while `false`, probe iterations are
/// no-ops.
pub const UPSTREAM_RUNNING: &str = "upstream_running";

/// Identifier of the currently active upstream resource, if any.
pub const ACTIVE_UPSTREAM_ID: &str = "active_upstream_id";

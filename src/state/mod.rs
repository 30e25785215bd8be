//! Shared coordination state.
//!
//! This module groups the **single source of truth** every worker and the
//! supervisor read and write:
//! - [`SharedState`] the lock-guarded named-field store plus the `runners`
//!   sub-mapping
//! - [`fields`] the catalogue of well-known field names
//!
//! ## Quick reference
//! - **Writers**: workers (their own domain fields), the registry (runner
//!   slots at spawn), the supervisor (clearing dead runner slots).
//! - **Readers**: everyone; any control decision reads through the store's
//!   internal lock.

pub mod fields;
mod store;

pub use store::SharedState;

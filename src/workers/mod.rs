//! # Worker abstractions and the bundled status monitor.
//!
//! This module provides the worker-facing types:
//! - [`Worker`] - trait for implementing the setup/iteration/teardown lifecycle
//! - [`WorkerContext`] - injected handles to shared state and the event queue
//! - [`WorkerSpec`] - name + factory + required-ness bundle the supervisor runs
//! - [`StatusMonitor`] - canonical looped worker probing upstream health
//! - [`ChannelProbe`] / [`HttpChannelProbe`] - the probe seam and its HTTP
//!   implementation

mod context;
mod spec;
mod status;
mod worker;

pub use context::WorkerContext;
pub use spec::WorkerSpec;
pub use status::{ChannelProbe, HttpChannelProbe, ProbeError, StatusConfig, StatusMonitor};
pub use worker::Worker;

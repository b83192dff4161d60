// src/exec/executor.rs

//! Pluggable execution service abstraction.
//!
//! The fallback engine schedules continuations and local runs on an
//! `ExecutorService` instead of calling `tokio::spawn` directly. Production
//! code uses [`TokioExecutor`]; tests can substitute a service that records
//! or reorders submissions.

use crate::exec::handle::BoxedUnitFuture;

/// Where local execution and internal continuations are scheduled.
///
/// Shared across all rule invocations using the same context; must accept
/// arbitrary concurrent submission.
pub trait ExecutorService: Send + Sync {
    fn spawn(&self, fut: BoxedUnitFuture);
}

/// Executor service backed by the ambient Tokio runtime.
#[derive(Debug, Default)]
pub struct TokioExecutor;

impl TokioExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutorService for TokioExecutor {
    fn spawn(&self, fut: BoxedUnitFuture) {
        tokio::spawn(fut);
    }
}

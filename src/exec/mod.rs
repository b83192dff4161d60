// src/exec/mod.rs

//! Execution layer.
//!
//! - [`handle`] defines the asynchronous, cancellable [`ExecutionHandle`] and
//!   its [`Completer`] write side.
//! - [`executor`] provides the `ExecutorService` trait and the concrete
//!   [`TokioExecutor`] that production code schedules continuations on, and
//!   which tests can replace with their own implementation.
//! - [`local`] runs a rule's build steps on this machine; it is the
//!   production implementation behind the strategy context's
//!   "run default behavior" operation.

pub mod executor;
pub mod handle;
pub mod local;

pub use executor::{ExecutorService, TokioExecutor};
pub use handle::{Completer, ExecutionError, ExecutionHandle, Resolution};
pub use local::spawn_local_build;

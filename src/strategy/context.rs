// src/strategy/context.rs

//! Execution context supplied by the build engine.

use std::path::PathBuf;
use std::sync::Arc;

use crate::exec::executor::ExecutorService;
use crate::exec::handle::ExecutionHandle;
use crate::exec::local::spawn_local_build;
use crate::rules::BuildRule;

/// What the fallback engine needs from its caller for one rule invocation:
/// the remote attempt already in flight, a way to run the rule's default
/// (local) behaviour, and somewhere to schedule that run and its bookkeeping
/// continuations.
pub trait StrategyContext: Send + Sync {
    /// Handle for the remote attempt of this rule. Already in flight when the
    /// context reaches the strategy; the strategy only ever reads it.
    fn remote_handle(&self) -> ExecutionHandle;

    /// Start the rule's local (non-remote) execution path.
    ///
    /// Called at most once per fallback result.
    fn run_default_behavior(&self) -> ExecutionHandle;

    /// Execution service for local runs and internal continuations. Shared
    /// across rule invocations; must accept arbitrary concurrent submission.
    fn executor(&self) -> Arc<dyn ExecutorService>;
}

/// Production context: the default behaviour runs the rule's build steps
/// through the local step runner.
pub struct RuleExecutionContext {
    rule: Arc<dyn BuildRule>,
    gen_dir: PathBuf,
    remote: ExecutionHandle,
    executor: Arc<dyn ExecutorService>,
}

impl RuleExecutionContext {
    pub fn new(
        rule: Arc<dyn BuildRule>,
        gen_dir: impl Into<PathBuf>,
        remote: ExecutionHandle,
        executor: Arc<dyn ExecutorService>,
    ) -> Self {
        Self {
            rule,
            gen_dir: gen_dir.into(),
            remote,
            executor,
        }
    }
}

impl StrategyContext for RuleExecutionContext {
    fn remote_handle(&self) -> ExecutionHandle {
        self.remote.clone()
    }

    fn run_default_behavior(&self) -> ExecutionHandle {
        spawn_local_build(
            Arc::clone(&self.rule),
            self.gen_dir.clone(),
            self.executor.as_ref(),
        )
    }

    fn executor(&self) -> Arc<dyn ExecutorService> {
        Arc::clone(&self.executor)
    }
}

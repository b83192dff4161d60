// src/strategy/mod.rs

//! Remote-with-local-fallback execution strategy.
//!
//! The strategy does not decide *whether* to attempt remote execution; the
//! in-flight remote handle arrives via the [`StrategyContext`]. Its sole job
//! is the fallback policy: observe the remote attempt's resolution, decide
//! whether the rule must be rebuilt locally, and publish exactly one terminal
//! resolution per rule invocation.
//!
//! - [`decision`] holds the pure classification of remote resolutions; the
//!   async shell lives in [`fallback`].
//! - [`context`] defines what the build engine supplies per invocation.

pub mod context;
pub mod decision;
pub mod fallback;

use std::sync::Arc;

use tracing::debug;

use crate::types::RuleName;

pub use context::{RuleExecutionContext, StrategyContext};
pub use decision::{decide_remote, RemoteDecision, RemoteFailure};
pub use fallback::{FallbackBuildResult, FallbackState};

/// Tunable strategy behaviour, loaded from `[strategy]` in the config file.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPolicy {
    /// When false, a remote failure is published unchanged instead of
    /// triggering a local rebuild.
    pub local_fallback_enabled: bool,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            local_fallback_enabled: true,
        }
    }
}

/// The strategy façade. Stateless beyond construction; safe to invoke
/// concurrently for independent rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFallbackStrategy {
    policy: FallbackPolicy,
}

impl LocalFallbackStrategy {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    /// Wrap the context's in-flight remote attempt for `rule` into a
    /// fallback result. Synchronous call, asynchronous result.
    pub fn build_rule(
        &self,
        rule: impl Into<RuleName>,
        context: Arc<dyn StrategyContext>,
    ) -> FallbackBuildResult {
        let rule = rule.into();
        debug!(rule = %rule, "wrapping remote attempt with local fallback");
        FallbackBuildResult::new(rule, context, self.policy)
    }
}

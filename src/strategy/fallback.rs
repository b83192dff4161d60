// src/strategy/fallback.rs

//! The fallback coordination state machine.
//!
//! A [`FallbackBuildResult`] owns the decision of whether and when to start
//! the local run for one rule invocation. It attaches a single continuation
//! to the remote handle; depending on the classification of the remote
//! resolution it either republishes the remote outcome or starts the
//! context's default (local) behaviour and republishes *its* result. Callers
//! observe exactly one terminal resolution through the published handle.
//!
//! The local run starts at most once: the one-shot continuation guarantees
//! it, and the `local_started` compare-and-swap guards re-entrancy on top.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::exec::handle::{ExecutionHandle, Resolution};
use crate::strategy::context::StrategyContext;
use crate::strategy::decision::{decide_remote, RemoteDecision, RemoteFailure};
use crate::strategy::FallbackPolicy;
use crate::types::RuleName;

/// Where a fallback result currently stands. Diagnostic only; the published
/// handle is the source of truth for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    /// The remote attempt has not resolved yet.
    AwaitingRemote,
    /// The remote attempt was unusable; the local attempt is in flight.
    AwaitingLocal,
    /// The remote result was published verbatim.
    RemoteAccepted,
    /// The local attempt committed an outcome (successful or not) and it was
    /// published.
    LocalAccepted,
    /// The local attempt died with an execution error, which became the
    /// terminal error.
    LocalRejected,
    /// Cancelled before either attempt committed a result.
    Cancelled,
}

/// Cancellation routing: which attempt a cancel call must reach.
struct Routing {
    cancelled: bool,
    local: Option<ExecutionHandle>,
}

struct FallbackShared {
    rule: RuleName,
    context: Arc<dyn StrategyContext>,
    policy: FallbackPolicy,
    local_started: AtomicBool,
    routing: Mutex<Routing>,
    remote_failure: Mutex<Option<RemoteFailure>>,
    state: Mutex<FallbackState>,
}

impl FallbackShared {
    fn set_state(&self, state: FallbackState) {
        *self.state.lock().unwrap() = state;
    }
}

/// Per-rule-invocation result of the fallback strategy.
///
/// Exposes one externally observable handle; its resolution mirrors
/// whichever branch of the fallback policy fired. Cancelling routes to
/// whichever attempt is currently active.
pub struct FallbackBuildResult {
    shared: Arc<FallbackShared>,
    remote: ExecutionHandle,
    published: ExecutionHandle,
}

impl FallbackBuildResult {
    pub(crate) fn new(
        rule: RuleName,
        context: Arc<dyn StrategyContext>,
        policy: FallbackPolicy,
    ) -> Self {
        let remote = context.remote_handle();
        let executor = context.executor();

        let shared = Arc::new(FallbackShared {
            rule,
            context,
            policy,
            local_started: AtomicBool::new(false),
            routing: Mutex::new(Routing {
                cancelled: false,
                local: None,
            }),
            remote_failure: Mutex::new(None),
            state: Mutex::new(FallbackState::AwaitingRemote),
        });

        let continuation_shared = Arc::clone(&shared);
        let published = remote.then_on(executor.as_ref(), move |resolution| {
            handle_remote_resolution(continuation_shared, resolution)
        });

        Self {
            shared,
            remote,
            published,
        }
    }

    pub fn rule(&self) -> &str {
        &self.shared.rule
    }

    /// The externally published handle. Clones observe the same single
    /// terminal resolution.
    pub fn handle(&self) -> ExecutionHandle {
        self.published.clone()
    }

    pub async fn wait(&self) -> Resolution {
        self.published.wait().await
    }

    /// Blocking wait for the outermost synchronous caller.
    pub fn wait_blocking(&self) -> Resolution {
        self.published.wait_blocking()
    }

    pub fn is_done(&self) -> bool {
        self.published.is_done()
    }

    /// Cancel this rule invocation.
    ///
    /// Propagates to whichever attempt is currently active: the remote
    /// attempt while it is still pending, the local attempt once fallback has
    /// started one. A no-op after a terminal resolution.
    pub fn cancel(&self) {
        let local = {
            let mut routing = self.shared.routing.lock().unwrap();
            routing.cancelled = true;
            routing.local.clone()
        };

        match local {
            Some(local) => local.cancel(),
            None => self.remote.cancel(),
        }

        if self.published.cancel_now() {
            info!(rule = %self.shared.rule, "build cancelled");
            self.shared.set_state(FallbackState::Cancelled);
        }
    }

    /// Current state, for diagnostics.
    pub fn state(&self) -> FallbackState {
        *self.shared.state.lock().unwrap()
    }

    /// Why the remote attempt was unusable, if fallback was triggered.
    ///
    /// Never part of the published result; retained for logging and
    /// diagnostics only.
    pub fn remote_failure(&self) -> Option<RemoteFailure> {
        self.shared.remote_failure.lock().unwrap().clone()
    }
}

impl std::fmt::Debug for FallbackBuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackBuildResult")
            .field("rule", &self.shared.rule)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Continuation attached to the remote handle; produces the published
/// resolution.
async fn handle_remote_resolution(
    shared: Arc<FallbackShared>,
    resolution: Resolution,
) -> Resolution {
    match decide_remote(resolution, shared.policy.local_fallback_enabled) {
        RemoteDecision::Accept(outcome) => {
            debug!(rule = %shared.rule, "remote attempt accepted");
            shared.set_state(FallbackState::RemoteAccepted);
            Resolution::Finished(outcome)
        }
        RemoteDecision::Publish(resolution) => {
            let state = if resolution.is_cancelled() {
                FallbackState::Cancelled
            } else {
                FallbackState::RemoteAccepted
            };
            shared.set_state(state);
            debug!(rule = %shared.rule, ?state, "publishing remote resolution unchanged");
            resolution
        }
        RemoteDecision::FallBack(failure) => {
            log_remote_failure(&shared.rule, &failure);
            *shared.remote_failure.lock().unwrap() = Some(failure);
            run_local(shared).await
        }
    }
}

fn log_remote_failure(rule: &str, failure: &RemoteFailure) {
    match failure {
        RemoteFailure::BuildFailed(outcome) => {
            let cause = outcome
                .failure_cause()
                .map(|e| e.to_string())
                .unwrap_or_default();
            warn!(rule = %rule, error = %cause, "remote attempt failed to build; falling back to local");
        }
        RemoteFailure::Faulted(error) => {
            warn!(rule = %rule, error = %error.message(), "remote attempt died; falling back to local");
        }
    }
}

/// Start the local attempt (at most once) and adopt its resolution.
async fn run_local(shared: Arc<FallbackShared>) -> Resolution {
    if shared.local_started.swap(true, Ordering::SeqCst) {
        // Unreachable under one-shot continuation semantics; observe the
        // existing local attempt rather than starting another.
        warn!(rule = %shared.rule, "local run already started; ignoring duplicate notification");
        let existing = shared.routing.lock().unwrap().local.clone();
        return match existing {
            Some(local) => local.wait().await,
            None => Resolution::Cancelled,
        };
    }

    shared.set_state(FallbackState::AwaitingLocal);
    info!(rule = %shared.rule, "running rule locally");

    let local = shared.context.run_default_behavior();

    // Record the handle for cancellation routing; if a cancel raced in before
    // we got here, it never saw the local attempt, so cancel it ourselves.
    let cancelled_already = {
        let mut routing = shared.routing.lock().unwrap();
        routing.local = Some(local.clone());
        routing.cancelled
    };
    if cancelled_already {
        local.cancel();
    }

    match local.wait().await {
        Resolution::Finished(outcome) => {
            // A local failure is still the final answer; there is no further
            // fallback tier.
            debug!(
                rule = %shared.rule,
                success = outcome.is_success(),
                "local attempt finished"
            );
            shared.set_state(FallbackState::LocalAccepted);
            Resolution::Finished(outcome)
        }
        Resolution::Faulted(error) => {
            warn!(rule = %shared.rule, error = %error.message(), "local attempt died");
            shared.set_state(FallbackState::LocalRejected);
            Resolution::Faulted(error)
        }
        Resolution::Cancelled => {
            shared.set_state(FallbackState::Cancelled);
            Resolution::Cancelled
        }
    }
}

// src/strategy/decision.rs

//! Pure fallback decision logic.
//!
//! This module contains the synchronous, deterministic classification of a
//! remote attempt's resolution. The async shell in [`super::fallback`] feeds
//! resolutions in and acts on the decisions; keeping the policy here lets it
//! be tested without Tokio, channels, or processes.

use crate::exec::handle::{ExecutionError, Resolution};
use crate::build::BuildOutcome;
use crate::types::BuildStatus;

/// Why the remote attempt was unusable. Kept for diagnostics; never part of
/// the published result once the local attempt runs.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteFailure {
    /// The remote attempt committed a `Fail` outcome.
    BuildFailed(BuildOutcome),
    /// The remote attempt died with an infrastructure error.
    Faulted(ExecutionError),
}

/// What to do with a remote attempt's resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteDecision {
    /// The remote outcome is the final answer; publish it verbatim.
    Accept(BuildOutcome),
    /// The remote attempt is unusable; run the rule locally.
    FallBack(RemoteFailure),
    /// Publish this resolution as-is (cancellation, or any remote result
    /// when local fallback is disabled).
    Publish(Resolution),
}

/// Classify the remote attempt's resolution.
///
/// A successful outcome is always accepted. A `Fail` outcome and an
/// execution error are treated identically: both mean the rule may still be
/// buildable locally. With fallback disabled, whatever the remote produced is
/// published unchanged.
pub fn decide_remote(resolution: Resolution, local_fallback_enabled: bool) -> RemoteDecision {
    match resolution {
        Resolution::Finished(outcome) if outcome.status() == BuildStatus::Success => {
            RemoteDecision::Accept(outcome)
        }
        Resolution::Finished(outcome) => {
            if local_fallback_enabled {
                RemoteDecision::FallBack(RemoteFailure::BuildFailed(outcome))
            } else {
                RemoteDecision::Publish(Resolution::Finished(outcome))
            }
        }
        Resolution::Faulted(error) => {
            if local_fallback_enabled {
                RemoteDecision::FallBack(RemoteFailure::Faulted(error))
            } else {
                RemoteDecision::Publish(Resolution::Faulted(error))
            }
        }
        Resolution::Cancelled => RemoteDecision::Publish(Resolution::Cancelled),
    }
}

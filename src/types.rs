use std::fmt;

/// Canonical rule name type used throughout the engine.
///
/// Full target form, e.g. `//lib/server:api`.
pub type RuleName = String;

/// Terminal classification of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    Fail,
}

/// How a successful attempt was produced.
///
/// Present on an outcome iff its status is [`BuildStatus::Success`]. The
/// fallback engine carries this through without interpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessKind {
    /// Built by running the rule's steps on this machine.
    BuiltLocally,
    /// Built by the remote execution service.
    BuiltRemotely,
    /// Outputs fetched from the artifact cache.
    FetchedFromCache,
    /// Outputs already present for an identical rule key.
    MatchingRuleKey,
}

impl fmt::Display for SuccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SuccessKind::BuiltLocally => "built locally",
            SuccessKind::BuiltRemotely => "built remotely",
            SuccessKind::FetchedFromCache => "fetched from cache",
            SuccessKind::MatchingRuleKey => "matching rule key",
        };
        f.write_str(s)
    }
}

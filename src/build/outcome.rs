// src/build/outcome.rs

//! The immutable record of one execution attempt.

use std::sync::Arc;

use crate::types::{BuildStatus, RuleName, SuccessKind};

/// Result of a lookup in the artifact cache.
///
/// Produced by the cache collaborator and carried through on every
/// [`BuildOutcome`]; the fallback engine never interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheResult {
    kind: CacheResultKind,
    source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheResultKind {
    Hit,
    Miss,
    Error,
    Skipped,
}

impl CacheResult {
    pub fn hit(source: impl Into<String>) -> Self {
        Self {
            kind: CacheResultKind::Hit,
            source: Some(source.into()),
        }
    }

    pub fn miss() -> Self {
        Self {
            kind: CacheResultKind::Miss,
            source: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: CacheResultKind::Error,
            source: Some(message.into()),
        }
    }

    /// The cache was not consulted for this attempt.
    pub fn skipped() -> Self {
        Self {
            kind: CacheResultKind::Skipped,
            source: None,
        }
    }

    pub fn kind(&self) -> CacheResultKind {
        self.kind
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Immutable record describing how one execution of a build rule concluded.
///
/// Invariant: exactly one of `success_kind` / `failure` is present, matching
/// `status`. The only constructors are [`BuildOutcome::success`] and
/// [`BuildOutcome::failure`], which enforce this.
///
/// Outcomes are created once per attempt (remote or local) by the subsystem
/// that ran it and never mutated afterwards. The failure cause lives behind an
/// `Arc` so clones republished to every poller share the same underlying
/// error.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    rule: RuleName,
    status: BuildStatus,
    success_kind: Option<SuccessKind>,
    failure: Option<Arc<anyhow::Error>>,
    cache_result: CacheResult,
}

impl BuildOutcome {
    pub fn success(rule: impl Into<RuleName>, kind: SuccessKind, cache_result: CacheResult) -> Self {
        Self {
            rule: rule.into(),
            status: BuildStatus::Success,
            success_kind: Some(kind),
            failure: None,
            cache_result,
        }
    }

    pub fn failure(
        rule: impl Into<RuleName>,
        cause: anyhow::Error,
        cache_result: CacheResult,
    ) -> Self {
        Self {
            rule: rule.into(),
            status: BuildStatus::Fail,
            success_kind: None,
            failure: Some(Arc::new(cause)),
            cache_result,
        }
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn status(&self) -> BuildStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Success
    }

    pub fn success_kind(&self) -> Option<SuccessKind> {
        self.success_kind
    }

    /// The recorded cause of a failed attempt, if any.
    pub fn failure_cause(&self) -> Option<&anyhow::Error> {
        self.failure.as_deref()
    }

    pub fn cache_result(&self) -> &CacheResult {
        &self.cache_result
    }
}

// Failure causes are compared by message: two outcomes republished from the
// same attempt share the same Arc'd cause and always compare equal.
impl PartialEq for BuildOutcome {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule
            && self.status == other.status
            && self.success_kind == other.success_kind
            && self.cache_result == other.cache_result
            && self.failure.as_ref().map(|e| e.to_string())
                == other.failure.as_ref().map(|e| e.to_string())
    }
}

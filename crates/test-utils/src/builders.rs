#![allow(dead_code)]

use std::path::Path;

use anyhow::anyhow;
use fallbuild::build::{BuildOutcome, CacheResult};
use fallbuild::errors::Result;
use fallbuild::exec::{ExecutionError, ExecutionHandle, Resolution};
use fallbuild::rules::key::{RuleKey, RuleKeyBuilder};
use fallbuild::rules::steps::BuildStep;
use fallbuild::rules::target::BuildTarget;
use fallbuild::rules::{BuildRule, RuleType};
use fallbuild::types::SuccessKind;

/// A successful outcome for `rule`, as the remote service would report it.
pub fn success_outcome(rule: &str) -> BuildOutcome {
    BuildOutcome::success(rule, SuccessKind::BuiltRemotely, CacheResult::miss())
}

/// A successful outcome for `rule`, as a local build would report it.
pub fn local_success_outcome(rule: &str) -> BuildOutcome {
    BuildOutcome::success(rule, SuccessKind::BuiltLocally, CacheResult::miss())
}

/// A failed outcome for `rule`; the cause message is the rule name, which
/// keeps assertions on "which failure won" easy to write.
pub fn failed_outcome(rule: &str) -> BuildOutcome {
    BuildOutcome::failure(rule, anyhow!("{rule}"), CacheResult::miss())
}

/// Handle already resolved with a finished outcome.
pub fn finished_handle(outcome: BuildOutcome) -> ExecutionHandle {
    ExecutionHandle::resolved(Resolution::Finished(outcome))
}

/// Handle already resolved with an execution error.
pub fn faulted_handle(message: &str) -> ExecutionHandle {
    ExecutionHandle::resolved(Resolution::Faulted(ExecutionError::new(anyhow!(
        "{message}"
    ))))
}

/// A rule with a fixed list of steps, for driving the local step runner
/// without a real rule definition.
pub struct ScriptedRule {
    target: BuildTarget,
    steps: Vec<BuildStep>,
}

impl ScriptedRule {
    pub fn new(target: &str, steps: Vec<BuildStep>) -> Self {
        Self {
            target: BuildTarget::parse(target).expect("valid test target"),
            steps,
        }
    }
}

impl BuildRule for ScriptedRule {
    fn target(&self) -> &BuildTarget {
        &self.target
    }

    fn rule_type(&self) -> RuleType {
        RuleType::JarBinary
    }

    fn rule_key(&self) -> Result<RuleKey> {
        Ok(RuleKeyBuilder::new("scripted")
            .set("target", &self.target.full_name())
            .set_all("steps", self.steps.iter().map(|s| format!("{s:?}")))
            .build())
    }

    fn build_steps(&self, _gen_dir: &Path) -> Result<Vec<BuildStep>> {
        Ok(self.steps.clone())
    }
}

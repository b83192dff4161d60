// src/exec/local.rs

//! Local step runner.
//!
//! Executes a rule's generated steps on this machine, in order, and reports
//! the result through an [`ExecutionHandle`]:
//!
//! - a step exiting non-zero (or a filesystem step failing) is a *build
//!   failure*: a recorded [`BuildOutcome`] with `Fail` status;
//! - failing to launch a step process at all is an *execution error* on the
//!   handle's fault channel;
//! - if the handle is cancelled, the in-flight step future is dropped and the
//!   child process dies with it (`kill_on_drop`).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::build::{BuildOutcome, CacheResult};
use crate::exec::executor::ExecutorService;
use crate::exec::handle::{Completer, ExecutionError, ExecutionHandle};
use crate::rules::steps::BuildStep;
use crate::rules::BuildRule;
use crate::types::SuccessKind;

/// Start building `rule` locally on `executor` and return a handle for the
/// result.
pub fn spawn_local_build(
    rule: Arc<dyn BuildRule>,
    gen_dir: PathBuf,
    executor: &dyn ExecutorService,
) -> ExecutionHandle {
    let (completer, handle) = ExecutionHandle::new_pair();
    executor.spawn(Box::pin(async move {
        run_local_build(rule, gen_dir, completer).await;
    }));
    handle
}

async fn run_local_build(rule: Arc<dyn BuildRule>, gen_dir: PathBuf, completer: Completer) {
    let rule_name = rule.target().full_name();

    let steps = match rule.build_steps(&gen_dir) {
        Ok(steps) => steps,
        Err(err) => {
            completer.fault(ExecutionError::new(
                anyhow::Error::from(err)
                    .context(format!("generating build steps for {rule_name}")),
            ));
            return;
        }
    };

    info!(rule = %rule_name, steps = steps.len(), "starting local build");

    for step in &steps {
        // Cancellation drops the step future; a running child process is
        // killed with it.
        let step_result = tokio::select! {
            _ = completer.cancelled() => {
                info!(rule = %rule_name, step = step.short_name(), "local build cancelled");
                return;
            }
            result = execute_step(step) => result,
        };

        match step_result {
            Ok(()) => {
                debug!(rule = %rule_name, step = step.short_name(), "step finished");
            }
            Err(StepError::Failed(cause)) => {
                warn!(
                    rule = %rule_name,
                    step = step.short_name(),
                    error = %cause,
                    "build step failed"
                );
                completer.finish(BuildOutcome::failure(
                    rule_name.clone(),
                    cause,
                    CacheResult::miss(),
                ));
                return;
            }
            Err(StepError::Infra(cause)) => {
                completer.fault(ExecutionError::new(cause));
                return;
            }
        }
    }

    info!(rule = %rule_name, "local build finished");
    completer.finish(BuildOutcome::success(
        rule_name,
        SuccessKind::BuiltLocally,
        CacheResult::miss(),
    ));
}

/// Why a step did not finish cleanly.
enum StepError {
    /// The step ran and failed; recorded as a build failure.
    Failed(anyhow::Error),
    /// The step could not be run at all; surfaced as an execution error.
    Infra(anyhow::Error),
}

async fn execute_step(step: &BuildStep) -> Result<(), StepError> {
    match step {
        BuildStep::Mkdir { path } => tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("creating directory '{}'", path.display()))
            .map_err(StepError::Failed),

        BuildStep::MakeCleanDirectory { path } => make_clean_directory(path)
            .await
            .map_err(StepError::Failed),

        BuildStep::MkdirAndSymlinkFile { source, target } => {
            mkdir_and_symlink(source, target).await.map_err(StepError::Failed)
        }

        BuildStep::Shell {
            description,
            command,
        } => run_shell_step(description, command).await,
    }
}

async fn make_clean_directory(path: &Path) -> anyhow::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(anyhow::Error::from(err)
                .context(format!("clearing directory '{}'", path.display())));
        }
    }
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("recreating directory '{}'", path.display()))
}

async fn mkdir_and_symlink(source: &Path, target: &Path) -> anyhow::Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating parent of '{}'", target.display()))?;
    }
    #[cfg(unix)]
    {
        tokio::fs::symlink(source, target)
            .await
            .with_context(|| {
                format!(
                    "symlinking '{}' at '{}'",
                    source.display(),
                    target.display()
                )
            })
    }
    #[cfg(not(unix))]
    {
        tokio::fs::copy(source, target)
            .await
            .map(|_| ())
            .with_context(|| {
                format!("copying '{}' to '{}'", source.display(), target.display())
            })
    }
}

async fn run_shell_step(description: &str, command: &str) -> Result<(), StepError> {
    debug!(step = description, cmd = command, "running shell step");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // A spawn failure is infrastructure, not a build failure.
    let child = cmd
        .spawn()
        .with_context(|| format!("spawning process for step '{description}'"))
        .map_err(StepError::Infra)?;

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for process of step '{description}'"))
        .map_err(StepError::Infra)?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        debug!(step = description, "stderr: {}", line);
    }

    let code = output.status.code().unwrap_or(-1);
    Err(StepError::Failed(anyhow!(
        "step '{description}' exited with code {code}"
    )))
}

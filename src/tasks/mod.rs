//! Named steps of a run and the loop that executes them.
mod context;
pub mod dotfiles;
pub mod nvim;
pub mod preflight;
mod processing;
pub mod pull;
mod report;
pub mod sshd;
pub mod terminal;

pub use context::Context;
pub use processing::{TaskResult, TaskStats, process_resource};
pub use report::{RecordedFailure, RunRecorder, RunReport, StepEntry, StepStatus};

use anyhow::Result;

use crate::error::BootstrapError;
use preflight::Identity;

/// What happens when a task's `run` returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure in the run report and continue with the next task.
    Record,
    /// Stop the run; the failure is returned to the caller.
    Propagate,
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task should run on the current platform and options.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot complete. Errors carrying a
    /// [`BootstrapError`] keep their kind in the run report.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;

    /// How errors returned by [`run`](Self::run) are handled.
    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Record
    }
}

/// The steps of `install`, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(preflight::PrepareDirectories),
        Box::new(dotfiles::ReconcileDotfiles),
        Box::new(nvim::LinkNeovimConfig),
        Box::new(terminal::SyncTerminalSettings),
        Box::new(sshd::InstallSshdConfig),
    ]
}

/// The steps of `pull`, in execution order.
#[must_use]
pub fn all_pull_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(pull::PullDotfiles),
        Box::new(pull::PullSshdConfig),
        Box::new(pull::PullTerminalSettings),
    ]
}

/// Recover the typed error from a task failure.
fn classify(step: &str, err: anyhow::Error) -> BootstrapError {
    match err.downcast::<BootstrapError>() {
        Ok(typed) => typed,
        Err(other) => BootstrapError::tool(step, other),
    }
}

/// Execute a task, recording its outcome in the run recorder.
///
/// Returns the failure of a [`FailurePolicy::Propagate`] task so the caller
/// can stop the run.
pub fn execute(task: &dyn Task, ctx: &Context) -> Option<RecordedFailure> {
    let name = task.name();
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {name} (not applicable)"));
        ctx.recorder.record_step(name, StepStatus::NotApplicable, None);
        return None;
    }

    ctx.log.stage(name);
    let failures_before = ctx.recorder.failure_count();

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            let recorded = ctx.recorder.failure_count().saturating_sub(failures_before);
            if recorded > 0 {
                record_failed(ctx, name, recorded);
            } else {
                ctx.recorder.record_step(name, StepStatus::Ok, None);
            }
            None
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.recorder.record_step(name, StepStatus::Skipped, Some(&reason));
            None
        }
        Ok(TaskResult::DryRun) => {
            ctx.recorder.record_step(name, StepStatus::DryRun, None);
            None
        }
        Err(e) => {
            let error = classify(name, e);
            match task.failure_policy() {
                FailurePolicy::Record => {
                    ctx.record_failure(name, error);
                    let recorded = ctx.recorder.failure_count().saturating_sub(failures_before);
                    record_failed(ctx, name, recorded);
                    None
                }
                FailurePolicy::Propagate => {
                    let msg = error.to_string();
                    ctx.log.error(&format!("{name}: {msg}"));
                    ctx.recorder.record_step(name, StepStatus::Failed, Some(&msg));
                    Some(RecordedFailure {
                        step: name.to_string(),
                        error,
                    })
                }
            }
        }
    }
}

fn record_failed(ctx: &Context, name: &str, recorded: usize) {
    let msg = format!("{recorded} failure(s) recorded");
    ctx.recorder.record_step(name, StepStatus::Failed, Some(&msg));
}

/// Run `tasks` in order for the user described by `identity`.
///
/// The root guard runs first: when it trips nothing is touched and the
/// [`BootstrapError::PermissionViolation`] is returned. Otherwise every task
/// runs until one with [`FailurePolicy::Propagate`] fails; that failure is
/// kept in [`RunReport::aborted`].
///
/// # Errors
///
/// Returns [`BootstrapError::PermissionViolation`] when run as root.
pub fn run(
    identity: &Identity,
    tasks: &[&dyn Task],
    ctx: &Context,
) -> Result<RunReport, BootstrapError> {
    preflight::assert_not_root(identity)?;

    let mut aborted = None;
    for task in tasks {
        if let Some(failure) = execute(*task, ctx) {
            aborted = Some(failure);
            break;
        }
    }

    Ok(ctx.recorder.finish(
        ctx.options.dest_dir.clone(),
        ctx.options.backup_dir.clone(),
        aborted,
    ))
}

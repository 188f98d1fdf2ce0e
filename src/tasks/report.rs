//! Outcome of one run: per-step results and recorded failures.
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::BootstrapError;

/// Final status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Completed, nothing failed.
    Ok,
    /// Not applicable to this platform or these options.
    NotApplicable,
    /// Skipped at run time (payload missing, tool absent, testing mode).
    Skipped,
    /// Ran in dry-run mode.
    DryRun,
    /// Aborted, or completed with recorded failures.
    Failed,
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    /// Step name.
    pub name: String,
    /// Final status.
    pub status: StepStatus,
    /// Skip reason or failure detail.
    pub message: Option<String>,
}

/// A failure attributed to a step.
#[derive(Debug)]
pub struct RecordedFailure {
    /// Name of the step that produced the failure.
    pub step: String,
    /// What went wrong.
    pub error: BootstrapError,
}

/// Result of a complete run, returned from the top-level operation.
#[derive(Debug)]
pub struct RunReport {
    /// Directory the dotfiles were installed into.
    pub dest_dir: PathBuf,
    /// Directory holding the `.orig` backups.
    pub backup_dir: PathBuf,
    /// Outcome of every step, in execution order.
    pub steps: Vec<StepEntry>,
    /// Non-fatal failures, in the order they were recorded.
    pub failures: Vec<RecordedFailure>,
    /// Failure of a step whose errors propagate; the run stopped there.
    pub aborted: Option<RecordedFailure>,
}

impl RunReport {
    /// Failures recorded by `step`, in order.
    pub fn failures_of<'a>(&'a self, step: &'a str) -> impl Iterator<Item = &'a RecordedFailure> {
        self.failures.iter().filter(move |f| f.step == step)
    }

    /// Number of steps that ended with `status`.
    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// `true` when nothing failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.aborted.is_none()
    }

    /// The two closing lines shown after every install.
    #[must_use]
    pub fn summary_lines(&self) -> [String; 2] {
        [
            format!("dotfiles copied to {}", self.dest_dir.display()),
            format!("backups created @ {}", self.backup_dir.display()),
        ]
    }

    /// Surface the propagated failure, if any, as an error.
    ///
    /// # Errors
    ///
    /// Returns the error of the step that aborted the run.
    pub fn into_result(mut self) -> Result<Self, BootstrapError> {
        match self.aborted.take() {
            Some(failure) => Err(failure.error),
            None => Ok(self),
        }
    }
}

/// Collects step outcomes and failures while tasks run.
///
/// Owned by the task [`Context`](super::Context) for a single run and turned
/// into a [`RunReport`] at the end.
#[derive(Debug, Default)]
pub struct RunRecorder {
    steps: Mutex<Vec<StepEntry>>,
    failures: Mutex<Vec<RecordedFailure>>,
}

impl RunRecorder {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the final status of a step.
    pub fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push(StepEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Record a non-fatal failure for `step`.
    pub fn record_failure(&self, step: &str, error: BootstrapError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(RecordedFailure {
                step: step.to_string(),
                error,
            });
        }
    }

    /// Number of failures recorded so far.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.lock().map_or(0, |f| f.len())
    }

    /// Build the final report, draining everything recorded so far.
    #[must_use]
    pub fn finish(
        &self,
        dest_dir: PathBuf,
        backup_dir: PathBuf,
        aborted: Option<RecordedFailure>,
    ) -> RunReport {
        let steps = self
            .steps
            .lock()
            .map(|mut s| std::mem::take(&mut *s))
            .unwrap_or_default();
        let failures = self
            .failures
            .lock()
            .map(|mut f| std::mem::take(&mut *f))
            .unwrap_or_default();
        RunReport {
            dest_dir,
            backup_dir,
            steps,
            failures,
            aborted,
        }
    }
}

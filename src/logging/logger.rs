//! [`Log`] implementation on top of [`tracing`], and the run summary.
use std::path::{Path, PathBuf};

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::Log;
use crate::tasks::{RunReport, StepStatus};

const RESET: &str = "\x1b[0m";

/// Icon and colour of a step line in the summary.
const fn style(status: StepStatus) -> (&'static str, &'static str) {
    match status {
        StepStatus::Ok => ("✓", "\x1b[32m"),
        StepStatus::NotApplicable => ("·", "\x1b[2m"),
        StepStatus::Skipped => ("○", "\x1b[33m"),
        StepStatus::DryRun => ("~", "\x1b[37m"),
        StepStatus::Failed => ("✗", "\x1b[31m"),
    }
}

/// Labels of the totals line, in display order.
const TOTALS: &[(StepStatus, &str)] = &[
    (StepStatus::Ok, "ok"),
    (StepStatus::NotApplicable, "n/a"),
    (StepStatus::Skipped, "skipped"),
    (StepStatus::DryRun, "dry-run"),
    (StepStatus::Failed, "failed"),
];

/// Emits messages as [`tracing`] events.
///
/// The subscriber installed by [`init_subscriber`](super::init_subscriber)
/// renders them on the console and in the command's log file.
#[derive(Debug, Default)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger; `log_file` is where the subscriber writes, if anywhere.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self { log_file }
    }

    /// The file receiving the full log of this run.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Print one line per step of `report` with its recorded failures
    /// underneath, then the totals and the log file location.
    pub fn print_summary(&self, report: &RunReport) {
        if report.steps.is_empty() {
            return;
        }
        self.stage("Summary");

        for step in &report.steps {
            let (icon, color) = style(step.status);
            let suffix = step
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}{RESET}", step.name));
            for failure in report.failures_of(&step.name) {
                self.info(&format!("    {}", failure.error));
            }
        }

        let totals: Vec<String> = TOTALS
            .iter()
            .map(|&(status, label)| {
                let (_, color) = style(status);
                format!("{color}{} {label}{RESET}", report.count(status))
            })
            .collect();
        self.info(&format!(
            "{} steps: {}",
            report.steps.len(),
            totals.join(", ")
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}{RESET}", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }
}

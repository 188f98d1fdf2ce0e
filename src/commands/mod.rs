pub mod completions;
pub mod install;
pub mod pull;
pub mod version;

use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::{self, Options, Overrides};
use crate::error::BootstrapError;
use crate::exec::Executor;
use crate::logging::{self, Log, Logger};
use crate::platform::Platform;
use crate::tasks::preflight::{self, Identity};
use crate::tasks::{self, Context, RunReport, Task};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates the root guard, config directory lookup, option layering,
/// and platform detection so that each command does not have to repeat the
/// boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// The user running the command.
    pub identity: Identity,
    /// Layered run options.
    pub options: Options,
    /// Detected or overridden platform.
    pub platform: Platform,
}

impl CommandSetup {
    /// Set up a run for the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset, or on any failure described in
    /// [`resolve`](Self::resolve).
    pub fn init(global: &GlobalOpts, verbose: bool, reset_terminal_settings: bool) -> Result<Self> {
        let identity = Identity::current()?;
        Self::resolve(identity, global, verbose, reset_terminal_settings)
    }

    /// Check `identity`, then resolve options and platform.
    ///
    /// The root guard runs before anything is read from disk.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::PermissionViolation`] when run as root, an
    /// error if the config directory cannot be found, or
    /// [`BootstrapError::InvalidConfig`] for a malformed options file.
    pub fn resolve(
        identity: Identity,
        global: &GlobalOpts,
        verbose: bool,
        reset_terminal_settings: bool,
    ) -> Result<Self> {
        preflight::assert_not_root(&identity)?;

        let config_dir = config::resolve_config_dir(global.config_dir.as_deref())?;
        let overrides = Overrides {
            dest_dir: global.dest_dir.clone(),
            backup_dir: global.backup_dir.clone(),
            ssh_dir: global.ssh_dir.clone(),
            verbose,
            testing: global.testing,
            reset_terminal_settings,
        };
        let options = Options::resolve(&config_dir, &identity.home, &overrides)?;

        let platform = match global.platform {
            Some(os) => Platform::new(os),
            None => Platform::detect()?,
        };

        Ok(Self {
            identity,
            options,
            platform,
        })
    }

    /// Install the tracing subscriber and create the logger for `command`.
    #[must_use]
    pub fn start_logging(&self, command: &str) -> Arc<Logger> {
        let log_file = logging::init_subscriber(self.options.verbose, command);
        Arc::new(Logger::new(log_file))
    }

    /// Build the task context for this run.
    #[must_use]
    pub fn context(
        &self,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
    ) -> Context {
        Context::new(
            self.options.clone(),
            self.platform.clone(),
            log,
            dry_run,
            executor,
        )
    }
}

/// Select tasks by `--only` (takes precedence) or `--skip`.
///
/// Both match a case-insensitive substring of the task name.
#[must_use]
pub fn filter_tasks<'a>(
    all_tasks: &'a [Box<dyn Task>],
    skip: &[String],
    only: &[String],
) -> Vec<&'a dyn Task> {
    all_tasks
        .iter()
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !only.is_empty() {
                return only.iter().any(|o| name.contains(&o.to_lowercase()));
            }
            if !skip.is_empty() {
                return !skip.iter().any(|s| name.contains(&s.to_lowercase()));
            }
            true
        })
        .map(AsRef::as_ref)
        .collect()
}

/// Filter `all_tasks` and run the selection for `identity`.
///
/// # Errors
///
/// Returns [`BootstrapError::PermissionViolation`] when run as root.
pub fn run_selected(
    identity: &Identity,
    all_tasks: &[Box<dyn Task>],
    skip: &[String],
    only: &[String],
    ctx: &Context,
) -> Result<RunReport, BootstrapError> {
    let selected = filter_tasks(all_tasks, skip, only);
    tasks::run(identity, &selected, ctx)
}

/// Print the step summary and turn the report into the command's result.
///
/// # Errors
///
/// Returns the error of an aborted step, or an error when any non-fatal
/// failure was recorded.
pub fn finish(report: RunReport, log: &Logger) -> Result<RunReport> {
    log.print_summary(&report);
    let report = report.into_result()?;
    let count = report.failures.len();
    if count > 0 {
        anyhow::bail!("{count} failure(s) recorded");
    }
    Ok(report)
}

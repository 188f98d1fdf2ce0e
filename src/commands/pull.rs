use anyhow::Result;
use std::sync::Arc;

use super::CommandSetup;
use crate::cli::{GlobalOpts, PullOpts};
use crate::exec::SystemExecutor;
use crate::logging::Log;
use crate::tasks;

/// Run the pull command.
///
/// # Errors
///
/// Returns an error when run as root, when options cannot be resolved, or
/// when any step failed.
pub fn run(global: &GlobalOpts, opts: &PullOpts, verbose: bool) -> Result<()> {
    let setup = CommandSetup::init(global, verbose, false)?;
    let log = setup.start_logging("pull");

    let dyn_log: Arc<dyn Log> = log.clone();
    let ctx = setup.context(dyn_log, global.dry_run, Arc::new(SystemExecutor));

    let all_tasks = tasks::all_pull_tasks();
    let report = super::run_selected(&setup.identity, &all_tasks, &opts.skip, &opts.only, &ctx)?;

    log.info(&format!(
        "dotfiles pulled into {}",
        setup.options.config_dir.display()
    ));
    super::finish(report, &log)?;
    Ok(())
}

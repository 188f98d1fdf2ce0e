use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, version};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::exec::SystemExecutor;
use crate::logging::Log;
use crate::tasks;

/// Run the install command.
///
/// # Errors
///
/// Returns an error when run as root, when options cannot be resolved, when
/// the sshd step fails, or when any failure was recorded during the run.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, verbose: bool) -> Result<()> {
    let setup = CommandSetup::init(global, verbose, opts.reset_terminal_settings)?;
    let log = setup.start_logging("install");
    log.info(&format!("vps-cli {}", version::current()));
    log.debug(&format!("config dir: {}", setup.options.config_dir.display()));
    log.debug(&format!("platform: {}", setup.platform.os));

    let dyn_log: Arc<dyn Log> = log.clone();
    let ctx = setup.context(dyn_log, global.dry_run, Arc::new(SystemExecutor));

    let all_tasks = tasks::all_install_tasks();
    let report = super::run_selected(&setup.identity, &all_tasks, &opts.skip, &opts.only, &ctx)?;

    for line in report.summary_lines() {
        log.info(&line);
    }
    super::finish(report, &log)?;
    Ok(())
}

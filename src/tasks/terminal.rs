//! Terminal emulator settings sync through `dconf`.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::config::rules::TERMINAL_SETTINGS;
use crate::error::BootstrapError;
use crate::resources::dconf::{DCONF, Dconf, DconfLoadResource, TERMINAL_PATH};
use crate::resources::Applicable;

/// Dump the live terminal settings once, then load the bundled ones.
///
/// Failures are recorded and never stop the run.
#[derive(Debug)]
pub struct SyncTerminalSettings;

impl Task for SyncTerminalSettings {
    fn name(&self) -> &'static str {
        "Sync terminal settings"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_unix_family()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let payload = ctx.options.bundled(TERMINAL_SETTINGS);
        if !payload.exists() {
            return Ok(TaskResult::Skipped(format!("{} not found", payload.display())));
        }
        if ctx.options.testing {
            return Ok(TaskResult::Skipped("testing mode".to_string()));
        }
        if !ctx.executor.which(DCONF) {
            return Err(BootstrapError::tool(DCONF, "not found on PATH").into());
        }

        let dconf = Dconf::new(TERMINAL_PATH, ctx.executor.as_ref());
        let backup = ctx.options.backup_dir.join(format!("{TERMINAL_SETTINGS}.orig"));
        let load = DconfLoadResource::new(payload, ctx.options.reset_terminal_settings, dconf);

        if ctx.dry_run {
            if !backup.exists() {
                ctx.log.dry_run(&format!(
                    "would dump {TERMINAL_PATH} to {}",
                    backup.display()
                ));
            }
            if load.reset_first {
                ctx.log.dry_run(&format!("would reset {TERMINAL_PATH}"));
            }
            ctx.log.dry_run(&format!("would run {}", load.description()));
            return Ok(TaskResult::DryRun);
        }

        if backup.exists() {
            ctx.log.info(&format!(
                "{} already exists, backup not created",
                backup.display()
            ));
        } else {
            let dump = dconf.dump()?;
            std::fs::write(&backup, dump).map_err(|e| {
                BootstrapError::tool(DCONF, format!("writing {}: {e}", backup.display()))
            })?;
            ctx.log.info(&format!("saved current settings to {}", backup.display()));
        }

        load.apply()?;
        ctx.log.info(&format!("loaded {TERMINAL_SETTINGS} into {TERMINAL_PATH}"));
        Ok(TaskResult::Ok)
    }
}

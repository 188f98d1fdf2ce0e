//! Copy live files back into the bundled config directory.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats, process_resource};
use crate::config::entries;
use crate::config::rules::{SSHD_CONFIG, TERMINAL_SETTINGS};
use crate::error::BootstrapError;
use crate::resources::dconf::{DCONF, Dconf, TERMINAL_PATH};
use crate::resources::dotfile::DotfileResource;

/// Copy every installed dotfile back over its bundled entry.
#[derive(Debug)]
pub struct PullDotfiles;

impl Task for PullDotfiles {
    fn name(&self) -> &'static str {
        "Pull dotfiles"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let scan = entries::scan(&ctx.options.config_dir, &ctx.rules)?;
        let mut stats = TaskStats::new();
        for entry in &scan.entries {
            let live = entry.dest_path(&ctx.options.dest_dir);
            if live.symlink_metadata().is_err() {
                ctx.log.debug(&format!("not installed: {}", live.display()));
                stats.skipped += 1;
                continue;
            }
            let resource = DotfileResource::new(live.clone(), entry.source.clone());
            match process_resource(ctx, &resource, "pull") {
                Ok(delta) => stats += delta,
                Err(e) => {
                    let error = BootstrapError::copy_failure(e, &live, &entry.source);
                    ctx.record_failure(self.name(), error);
                    stats.skipped += 1;
                }
            }
        }
        Ok(stats.finish(ctx))
    }
}

/// Copy the system `sshd_config` back into the config directory.
#[derive(Debug)]
pub struct PullSshdConfig;

impl Task for PullSshdConfig {
    fn name(&self) -> &'static str {
        "Pull sshd config"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let live = ctx.options.sshd_config.clone();
        if !live.exists() {
            return Ok(TaskResult::Skipped(format!("{} not found", live.display())));
        }
        let bundled = ctx.options.bundled(SSHD_CONFIG);
        let resource = DotfileResource::new(live.clone(), bundled.clone());
        let stats = process_resource(ctx, &resource, "pull")
            .map_err(|e| BootstrapError::copy_failure(e, &live, &bundled))?;
        Ok(stats.finish(ctx))
    }
}

/// Dump the live terminal settings into the bundled payload.
#[derive(Debug)]
pub struct PullTerminalSettings;

impl Task for PullTerminalSettings {
    fn name(&self) -> &'static str {
        "Pull terminal settings"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_unix_family()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.options.testing {
            return Ok(TaskResult::Skipped("testing mode".to_string()));
        }
        if !ctx.executor.which(DCONF) {
            return Ok(TaskResult::Skipped(format!("{DCONF} not found on PATH")));
        }

        let payload = ctx.options.bundled(TERMINAL_SETTINGS);
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would dump {TERMINAL_PATH} to {}",
                payload.display()
            ));
            return Ok(TaskResult::DryRun);
        }

        let dump = Dconf::new(TERMINAL_PATH, ctx.executor.as_ref()).dump()?;
        let mut stats = TaskStats::new();
        if std::fs::read_to_string(&payload).is_ok_and(|current| current == dump) {
            stats.already_ok += 1;
        } else {
            std::fs::write(&payload, dump).map_err(|e| {
                BootstrapError::tool(DCONF, format!("writing {}: {e}", payload.display()))
            })?;
            stats.changed += 1;
        }
        Ok(stats.finish(ctx))
    }
}

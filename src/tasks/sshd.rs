//! Install the bundled SSH daemon configuration.
use anyhow::Result;

use super::{Context, FailurePolicy, Task, TaskResult, TaskStats, process_resource};
use crate::config::rules::SSHD_CONFIG;
use crate::error::BootstrapError;
use crate::resources::backup::BackupResource;
use crate::resources::privileged::{CopyMode, PrivilegedCopyResource};
use crate::resources::{Applicable, ResourceChange};

/// Printed when the system has no SSH configuration directory.
pub const NO_SSH_DIR: &str = "No ssh dir found. sshd_config not copied";

/// Copy the bundled `sshd_config` over the system one with elevated
/// privileges. Failures stop the run.
#[derive(Debug)]
pub struct InstallSshdConfig;

impl Task for InstallSshdConfig {
    fn name(&self) -> &'static str {
        "Install sshd config"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.options.ssh_dir().is_dir() {
            ctx.log.info(NO_SSH_DIR);
            return Ok(TaskResult::Skipped(NO_SSH_DIR.to_string()));
        }

        let source = ctx.options.bundled(SSHD_CONFIG);
        if !source.exists() {
            return Ok(TaskResult::Skipped(
                BootstrapError::SourceNotFound { path: source }.to_string(),
            ));
        }

        let target = ctx.options.sshd_config.clone();
        if target.exists() {
            let backup = BackupResource::new(
                target.clone(),
                ctx.options.backup_dir.join(format!("{SSHD_CONFIG}.orig")),
            );
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would back up {}", backup.description()));
            } else if let ResourceChange::Skipped { reason } = backup.apply()? {
                ctx.log.info(&format!("backup not created: {reason}"));
            } else {
                ctx.log.info(&format!("backed up {}", backup.description()));
            }
        } else {
            ctx.log.info(&format!(
                "{} not found, nothing to back up",
                target.display()
            ));
        }

        let mode = if ctx.options.testing {
            CopyMode::Plain
        } else {
            CopyMode::Elevated {
                command: ctx.options.privilege_command.clone(),
            }
        };
        let resource = PrivilegedCopyResource::new(source, target, mode, ctx.executor.as_ref());

        let mut stats = TaskStats::new();
        stats += process_resource(ctx, &resource, "install")?;
        Ok(stats.finish(ctx))
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Propagate
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::execute;
    use crate::tasks::test_helpers::{ContextBuilder, read, write_file};

    fn run_ok(ctx: &Context) {
        let result = InstallSshdConfig.run(ctx).unwrap();
        assert!(matches!(result, TaskResult::Ok));
    }

    #[test]
    fn elevated_copy_uses_privilege_command() {
        let (ctx, dirs) = ContextBuilder::new()
            .bundled(SSHD_CONFIG, "Port 2222\n")
            .executor(MockExecutor::ok(""))
            .build();

        run_ok(&ctx);

        assert_eq!(
            dirs.executor.commands(),
            vec![format!(
                "sudo cp {} {}",
                dirs.config.join(SSHD_CONFIG).display(),
                dirs.ssh.join(SSHD_CONFIG).display()
            )]
        );
    }

    #[test]
    fn live_config_is_backed_up_once() {
        let (ctx, dirs) = ContextBuilder::new()
            .testing()
            .bundled(SSHD_CONFIG, "Port 2222\n")
            .build();
        std::fs::create_dir_all(&dirs.backup).unwrap();
        write_file(&dirs.ssh.join(SSHD_CONFIG), "Port 22\n");

        run_ok(&ctx);
        write_file(&dirs.ssh.join(SSHD_CONFIG), "Port 23\n");
        run_ok(&ctx);

        assert_eq!(read(&dirs.backup_file(SSHD_CONFIG)), "Port 22\n");
        assert_eq!(read(&dirs.ssh.join(SSHD_CONFIG)), "Port 2222\n");
        assert_eq!(dirs.executor.call_count(), 0);
    }

    #[test]
    fn no_ssh_dir_is_a_skip() {
        let (ctx, dirs) = ContextBuilder::new()
            .without_ssh_dir()
            .bundled(SSHD_CONFIG, "Port 2222\n")
            .build();

        let result = InstallSshdConfig.run(&ctx).unwrap();
        assert!(matches!(result, TaskResult::Skipped(ref r) if r == NO_SSH_DIR));
        assert!(dirs.log.contains(NO_SSH_DIR));
    }

    #[test]
    fn missing_bundled_file_is_a_skip() {
        let (ctx, _dirs) = ContextBuilder::new().build();
        let result = InstallSshdConfig.run(&ctx).unwrap();
        assert!(matches!(result, TaskResult::Skipped(ref r) if r.contains("source not found")));
    }

    #[test]
    fn elevated_failure_propagates() {
        let (ctx, _dirs) = ContextBuilder::new()
            .bundled(SSHD_CONFIG, "Port 2222\n")
            .executor(MockExecutor::fail())
            .build();

        let failure = execute(&InstallSshdConfig, &ctx).unwrap();
        assert_eq!(failure.step, "Install sshd config");
        assert_eq!(failure.error.kind(), "ExternalToolFailed");
        assert_eq!(ctx.recorder.failure_count(), 0);
    }

    #[test]
    fn matching_config_skips_elevation() {
        let (ctx, dirs) = ContextBuilder::new()
            .bundled(SSHD_CONFIG, "Port 2222\n")
            .build();
        std::fs::create_dir_all(&dirs.backup).unwrap();
        write_file(&dirs.ssh.join(SSHD_CONFIG), "Port 2222\n");

        run_ok(&ctx);
        assert_eq!(dirs.executor.call_count(), 0);
    }
}

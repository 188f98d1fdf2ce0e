//! Root guard and directory preparation.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Context, FailurePolicy, Task, TaskResult};
use crate::error::BootstrapError;

/// Who is running the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Effective user id is 0.
    pub euid_is_root: bool,
    /// Home directory of the invoking user.
    pub home: PathBuf,
}

impl Identity {
    /// Identity of the current process.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is not set.
    pub fn current() -> Result<Self> {
        Ok(Self {
            euid_is_root: effective_uid_is_root(),
            home: crate::config::home_dir()?,
        })
    }
}

#[cfg(unix)]
fn effective_uid_is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
const fn effective_uid_is_root() -> bool {
    false
}

/// Refuse to run as root or with `/root` as home directory.
///
/// # Errors
///
/// Returns [`BootstrapError::PermissionViolation`] when either check trips.
pub fn assert_not_root(identity: &Identity) -> Result<(), BootstrapError> {
    if identity.euid_is_root {
        return Err(BootstrapError::PermissionViolation {
            reason: "effective uid is 0".to_string(),
        });
    }
    if identity.home == Path::new("/root") {
        return Err(BootstrapError::PermissionViolation {
            reason: "home directory is /root".to_string(),
        });
    }
    Ok(())
}

/// Create the destination and backup directories when absent.
#[derive(Debug)]
pub struct PrepareDirectories;

impl Task for PrepareDirectories {
    fn name(&self) -> &'static str {
        "Prepare directories"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut created = 0u32;
        for dir in [&ctx.options.dest_dir, &ctx.options.backup_dir] {
            if dir.is_dir() {
                ctx.log.debug(&format!("exists: {}", dir.display()));
                continue;
            }
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would create {}", dir.display()));
                continue;
            }
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            ctx.log.info(&format!("created {}", dir.display()));
            created += 1;
        }
        ctx.log.debug(&format!("{created} directories created"));

        Ok(if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        })
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Propagate
    }
}

//! Back up and overwrite every bundled dotfile.
use anyhow::Result;
use std::path::Path;

use super::{Context, Task, TaskResult, TaskStats};
use crate::config::entries::{self, ConfigEntry};
use crate::config::rules::SkipReason;
use crate::error::BootstrapError;
use crate::resources::backup::BackupResource;
use crate::resources::dotfile::DotfileResource;
use crate::resources::{Applicable, Resource, ResourceChange, ResourceState};

/// Copy each bundled entry to `<dest>/.<name>`, keeping a first-wins backup
/// of whatever was there before.
#[derive(Debug)]
pub struct ReconcileDotfiles;

impl Task for ReconcileDotfiles {
    fn name(&self) -> &'static str {
        "Reconcile dotfiles"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let scan = entries::scan(&ctx.options.config_dir, &ctx.rules)?;
        for skipped in &scan.skipped {
            match skipped.reason {
                SkipReason::Excluded => ctx.log.info(&format!(
                    "{} excluded on {}",
                    skipped.name.to_string_lossy(),
                    ctx.platform.os
                )),
                SkipReason::Control | SkipReason::Hidden => {
                    ctx.log.debug(&format!("not a dotfile: {}", skipped.name.to_string_lossy()));
                }
            }
        }

        let mut stats = TaskStats::new();
        for entry in &scan.entries {
            let dest = entry.dest_path(&ctx.options.dest_dir);
            let backup = entry.backup_path(&ctx.options.backup_dir);
            match reconcile(ctx, entry, &dest, &backup) {
                Ok(delta) => stats += delta,
                Err(e) => {
                    ctx.record_failure(self.name(), e);
                    stats.skipped += 1;
                }
            }
        }
        Ok(stats.finish(ctx))
    }
}

/// Back up `dest` once, then overwrite it with `entry`.
///
/// # Errors
///
/// Returns [`BootstrapError::CopyFailed`] if the backup or the copy fails, or
/// if `dest` is a directory where `entry` is a file (or the reverse).
pub fn reconcile(
    ctx: &Context,
    entry: &ConfigEntry,
    dest: &Path,
    backup: &Path,
) -> Result<TaskStats, BootstrapError> {
    let dotfile = DotfileResource::new(entry.source.clone(), dest.to_path_buf());
    let state = dotfile
        .current_state()
        .map_err(|e| BootstrapError::copy_failure(e, &entry.source, dest))?;
    if let ResourceState::Invalid { reason } = &state {
        return Err(BootstrapError::CopyFailed {
            from: entry.source.clone(),
            to: dest.to_path_buf(),
            source: std::io::Error::other(reason.clone()),
        });
    }

    back_up(ctx, dest, backup)?;

    let mut delta = TaskStats::new();
    let desc = dotfile.description();
    match state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        _ if ctx.dry_run => {
            ctx.log.dry_run(&format!("would copy {desc}"));
            delta.changed += 1;
        }
        _ => {
            let change = dotfile
                .apply()
                .map_err(|e| BootstrapError::copy_failure(e, &entry.source, dest))?;
            if change == ResourceChange::AlreadyCorrect {
                delta.already_ok += 1;
            } else {
                ctx.log.debug(&format!("copied {desc}"));
                delta.changed += 1;
            }
        }
    }
    Ok(delta)
}

fn back_up(ctx: &Context, dest: &Path, backup: &Path) -> Result<(), BootstrapError> {
    let resource = BackupResource::new(dest.to_path_buf(), backup.to_path_buf());
    let state = resource
        .current_state()
        .map_err(|e| BootstrapError::copy_failure(e, dest, backup))?;

    match state {
        ResourceState::Correct => ctx.log.info(&format!(
            "{} already exists, backup not created",
            backup.display()
        )),
        ResourceState::Invalid { .. } => ctx.log.info(&format!(
            "{} not found, nothing to back up",
            dest.display()
        )),
        ResourceState::Missing | ResourceState::Incorrect { .. } if ctx.dry_run => {
            ctx.log.dry_run(&format!("would back up {}", resource.description()));
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } => {
            resource
                .apply()
                .map_err(|e| BootstrapError::copy_failure(e, dest, backup))?;
            ctx.log.info(&format!("backed up {}", resource.description()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::Os;
    use crate::tasks::test_helpers::{ContextBuilder, read, write_file};

    fn run_once(ctx: &Context) {
        std::fs::create_dir_all(&ctx.options.backup_dir).unwrap();
        ReconcileDotfiles.run(ctx).unwrap();
    }

    #[test]
    fn fresh_destination_gets_copy_and_no_backup() {
        let (ctx, dirs) = ContextBuilder::new().bundled("vimrc", "set nu\n").build();
        run_once(&ctx);

        assert_eq!(read(&dirs.dest_file("vimrc")), "set nu\n");
        assert!(!dirs.backup_file("vimrc").exists());
        assert!(dirs.log.contains("nothing to back up"));
    }

    #[test]
    fn existing_destination_is_backed_up_then_overwritten() {
        let (ctx, dirs) = ContextBuilder::new().bundled("vimrc", "set nu\n").build();
        write_file(&dirs.dest_file("vimrc"), "test");
        run_once(&ctx);

        assert_eq!(read(&dirs.backup_file("vimrc")), "test");
        assert_eq!(read(&dirs.dest_file("vimrc")), "set nu\n");
    }

    #[test]
    fn first_backup_wins() {
        let (ctx, dirs) = ContextBuilder::new().bundled("vimrc", "set nu\n").build();
        write_file(&dirs.dest_file("vimrc"), "A");
        run_once(&ctx);
        write_file(&dirs.dest_file("vimrc"), "B");
        run_once(&ctx);

        assert_eq!(read(&dirs.backup_file("vimrc")), "A");
        assert_eq!(read(&dirs.dest_file("vimrc")), "set nu\n");
        assert!(dirs.log.contains("backup not created"));
    }

    #[test]
    fn second_run_reports_already_ok() {
        let (ctx, dirs) = ContextBuilder::new().bundled("vimrc", "set nu\n").build();
        run_once(&ctx);
        run_once(&ctx);

        assert_eq!(read(&dirs.dest_file("vimrc")), "set nu\n");
        assert!(dirs.log.contains("0 changed, 1 already ok"));
    }

    #[test]
    fn linux_never_installs_cygwin_entries() {
        let (ctx, dirs) = ContextBuilder::new()
            .bundled("zshrc", "unix")
            .bundled("cygwin_zshrc", "cygwin")
            .bundled("minttyrc", "mintty")
            .build();
        run_once(&ctx);

        assert_eq!(read(&dirs.dest_file("zshrc")), "unix");
        assert!(!dirs.dest_file("cygwin_zshrc").exists());
        assert!(!dirs.dest_file("minttyrc").exists());
    }

    #[test]
    fn cygwin_installs_renamed_zshrc() {
        let (ctx, dirs) = ContextBuilder::new()
            .os(Os::Cygwin)
            .bundled("zshrc", "unix")
            .bundled("cygwin_zshrc", "cygwin")
            .bundled("minttyrc", "mintty")
            .build();
        write_file(&dirs.dest_file("zshrc"), "previous");
        run_once(&ctx);

        assert_eq!(read(&dirs.dest_file("zshrc")), "cygwin");
        assert_eq!(read(&dirs.backup_file("zshrc")), "previous");
        assert!(!dirs.dest_file("cygwin_zshrc").exists());
        assert_eq!(read(&dirs.dest_file("minttyrc")), "mintty");
    }

    #[test]
    fn control_entries_are_not_installed() {
        let (ctx, dirs) = ContextBuilder::new()
            .bundled("sshd_config", "Port 22")
            .bundled("gnome_terminal_settings", "[legacy]")
            .build();
        run_once(&ctx);

        assert!(!dirs.dest_file("sshd_config").exists());
        assert!(!dirs.dest_file("gnome_terminal_settings").exists());
    }

    #[test]
    fn directory_entries_are_backed_up_and_copied() {
        let (ctx, dirs) = ContextBuilder::new()
            .bundled("vim/colors/dark.vim", "hi Normal")
            .build();
        write_file(&dirs.dest_file("vim").join("old.vim"), "old");
        run_once(&ctx);

        assert_eq!(read(&dirs.dest_file("vim").join("colors/dark.vim")), "hi Normal");
        assert_eq!(read(&dirs.backup_file("vim").join("old.vim")), "old");
    }

    #[test]
    fn type_conflict_is_recorded_and_other_entries_continue() {
        let (ctx, dirs) = ContextBuilder::new()
            .bundled("gitconfig", "[user]")
            .bundled("vimrc", "set nu")
            .build();
        std::fs::create_dir_all(dirs.dest_file("gitconfig")).unwrap();
        run_once(&ctx);

        assert!(dirs.dest_file("gitconfig").is_dir());
        assert_eq!(read(&dirs.dest_file("vimrc")), "set nu");
        assert_eq!(ctx.recorder.failure_count(), 1);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let (ctx, dirs) = ContextBuilder::new()
            .dry_run()
            .bundled("vimrc", "set nu")
            .build();
        write_file(&dirs.dest_file("vimrc"), "test");

        let result = ReconcileDotfiles.run(&ctx).unwrap();
        assert!(matches!(result, TaskResult::DryRun));
        assert_eq!(read(&dirs.dest_file("vimrc")), "test");
        assert!(!dirs.backup_file("vimrc").exists());
        assert!(dirs.log.contains("would copy"));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_in_directory_is_kept_in_backup() {
        let (ctx, dirs) = ContextBuilder::new()
            .bundled("vim/colors/dark.vim", "bundled")
            .build();
        write_file(&dirs.dest_file("vim").join("colors/dark.vim"), "user");
        std::os::unix::fs::symlink("/nonexistent", dirs.dest_file("vim").join("undo")).unwrap();
        run_once(&ctx);
        run_once(&ctx);

        assert_eq!(ctx.recorder.failure_count(), 0);
        let backup = dirs.backup_file("vim");
        assert_eq!(read(&backup.join("colors/dark.vim")), "user");
        assert_eq!(
            std::fs::read_link(backup.join("undo")).unwrap(),
            std::path::PathBuf::from("/nonexistent")
        );
        assert_eq!(read(&dirs.dest_file("vim").join("colors/dark.vim")), "bundled");
    }

    #[cfg(unix)]
    #[test]
    fn failed_directory_backup_never_lets_the_copy_through() {
        let (ctx, dirs) = ContextBuilder::new()
            .bundled("vim/colors/dark.vim", "bundled")
            .build();
        write_file(&dirs.dest_file("vim").join("colors/dark.vim"), "user");
        let _listener =
            std::os::unix::net::UnixListener::bind(dirs.dest_file("vim").join("server.sock"))
                .unwrap();
        run_once(&ctx);
        run_once(&ctx);

        assert_eq!(ctx.recorder.failure_count(), 2);
        assert!(dirs.backup_file("vim").symlink_metadata().is_err());
        assert_eq!(read(&dirs.dest_file("vim").join("colors/dark.vim")), "user");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_destination_is_backed_up_and_replaced() {
        let (ctx, dirs) = ContextBuilder::new()
            .bundled("vim/colors/dark.vim", "bundled")
            .build();
        let linked = ctx.options.dest_dir.join("dotrepo/vim");
        write_file(&linked.join("colors/dark.vim"), "user");
        std::os::unix::fs::symlink(&linked, dirs.dest_file("vim")).unwrap();
        run_once(&ctx);

        assert_eq!(ctx.recorder.failure_count(), 0);
        assert!(!dirs.dest_file("vim").symlink_metadata().unwrap().is_symlink());
        assert_eq!(read(&dirs.dest_file("vim").join("colors/dark.vim")), "bundled");
        assert_eq!(read(&linked.join("colors/dark.vim")), "user");
        assert_eq!(read(&dirs.backup_file("vim").join("colors/dark.vim")), "user");
    }
}

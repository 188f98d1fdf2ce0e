//! Point neovim at the installed vimrc.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats, process_resource};
use crate::resources::backup::BackupResource;
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable, ResourceChange};

/// Replace `~/.config/nvim/init.vim` with a link to `~/.vimrc` (Linux only).
#[derive(Debug)]
pub struct LinkNeovimConfig;

impl Task for LinkNeovimConfig {
    fn name(&self) -> &'static str {
        "Link neovim config"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_linux()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let vimrc = ctx.options.dest_dir.join(".vimrc");
        if !vimrc.exists() && !ctx.dry_run {
            return Ok(TaskResult::Skipped(format!("{} not found", vimrc.display())));
        }

        let init_vim = ctx.options.dest_dir.join(".config/nvim/init.vim");
        let is_real_file = init_vim
            .symlink_metadata()
            .is_ok_and(|m| m.file_type().is_file());

        let mut stats = TaskStats::new();
        if is_real_file {
            let backup = BackupResource::new(
                init_vim.clone(),
                ctx.options.backup_dir.join("init.vim.orig"),
            );
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would back up {}", backup.description()));
            } else if let ResourceChange::Skipped { reason } = backup.apply()? {
                ctx.log.info(&format!("backup not created: {reason}"));
            } else {
                ctx.log.info(&format!("backed up {}", backup.description()));
            }
        }

        stats += process_resource(ctx, &SymlinkResource::new(vimrc, init_vim), "link")?;
        Ok(stats.finish(ctx))
    }
}

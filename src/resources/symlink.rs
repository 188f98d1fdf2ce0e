//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A symbolic link at `link` pointing to `target`.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// What the link points to.
    pub target: PathBuf,
    /// Where the link lives.
    pub link: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(target: PathBuf, link: PathBuf) -> Self {
        Self { target, link }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.link.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => return Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => return Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {}
        }

        super::fs::ensure_parent_dir(&self.link)?;
        super::fs::remove_existing(&self.link)?;
        create_symlink(&self.target, &self.link)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.target.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("link target does not exist: {}", self.target.display()),
            });
        }

        if super::fs::is_real_dir(&self.link) {
            return Ok(ResourceState::Invalid {
                reason: format!("{} is a real directory", self.link.display()),
            });
        }

        match std::fs::read_link(&self.link) {
            Ok(existing) if existing == self.target => Ok(ResourceState::Correct),
            Ok(existing) => Ok(ResourceState::Incorrect {
                current: format!("points to {}", existing.display()),
            }),
            Err(_) if self.link.symlink_metadata().is_ok() => Ok(ResourceState::Incorrect {
                current: "regular file".to_string(),
            }),
            Err(_) => Ok(ResourceState::Missing),
        }
    }
}

#[cfg(unix)]
fn create_symlink(target: &std::path::Path, link: &std::path::Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).with_context(|| {
        format!(
            "creating symlink {} -> {}",
            link.display(),
            target.display()
        )
    })
}

#[cfg(not(unix))]
fn create_symlink(target: &std::path::Path, link: &std::path::Path) -> Result<()> {
    anyhow::bail!(
        "symlinks are not supported here: {} -> {}",
        link.display(),
        target.display()
    )
}

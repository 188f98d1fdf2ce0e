//! Bundled entry copied over its destination.
use anyhow::{Result, bail};
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A bundled file or directory that must be present, with identical content,
/// at `target`.
#[derive(Debug, Clone)]
pub struct DotfileResource {
    /// Bundled entry.
    pub source: PathBuf,
    /// Installed location.
    pub target: PathBuf,
}

impl DotfileResource {
    /// Create a new dotfile resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for DotfileResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => return Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => bail!("{}: {reason}", self.target.display()),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {}
        }

        // Replace a symlink instead of writing through it.
        if self.target.symlink_metadata().is_ok_and(|m| m.is_symlink()) {
            super::fs::remove_existing(&self.target)?;
        }
        if self.source.is_dir() {
            super::fs::copy_dir_recursive(&self.source, &self.target)?;
        } else {
            super::fs::ensure_parent_dir(&self.target)?;
            super::fs::copy_file(&self.source, &self.target)?;
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DotfileResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }
        let Ok(target_meta) = self.target.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };

        // A symlink is replaced whatever it points at.
        let source_is_dir = self.source.is_dir();
        if !target_meta.is_symlink() && source_is_dir != target_meta.is_dir() {
            let (want, have) = if source_is_dir {
                ("directory", "file")
            } else {
                ("file", "directory")
            };
            return Ok(ResourceState::Invalid {
                reason: format!("expected a {want} but found a {have}"),
            });
        }

        let matches = if source_is_dir {
            super::fs::tree_contains(&self.source, &self.target)
        } else {
            super::fs::same_content(&self.source, &self.target)
        };
        if matches {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}

//! First-wins backup resource.
use anyhow::Result;
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// Copy of a user's pre-existing file or directory, taken at most once.
///
/// Once the backup exists it is never replaced, so the very first version
/// of the user's file survives any number of later runs. The copy is staged
/// and renamed into place, so a failed copy never counts as the backup.
#[derive(Debug, Clone)]
pub struct BackupResource {
    /// The live file or directory being preserved.
    pub original: PathBuf,
    /// Where the backup is kept.
    pub backup: PathBuf,
}

impl BackupResource {
    /// Create a new backup resource.
    #[must_use]
    pub const fn new(original: PathBuf, backup: PathBuf) -> Self {
        Self { original, backup }
    }
}

impl Applicable for BackupResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.original.display(), self.backup.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => Ok(ResourceChange::Skipped {
                reason: format!("backup {} already exists", self.backup.display()),
            }),
            ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {
                super::fs::ensure_parent_dir(&self.backup)?;
                super::fs::copy_entry_staged(&self.original, &self.backup)?;
                Ok(ResourceChange::Applied)
            }
        }
    }
}

impl Resource for BackupResource {
    fn current_state(&self) -> Result<ResourceState> {
        if self.backup.symlink_metadata().is_ok() {
            return Ok(ResourceState::Correct);
        }
        if self.original.symlink_metadata().is_err() {
            return Ok(ResourceState::Invalid {
                reason: format!(
                    "{} does not exist, nothing to back up",
                    self.original.display()
                ),
            });
        }
        Ok(ResourceState::Missing)
    }
}

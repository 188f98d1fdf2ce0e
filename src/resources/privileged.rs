//! Copy into a root-owned location through a privilege helper.
use anyhow::Result;
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::BootstrapError;
use crate::exec::Executor;

/// How the copy is performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyMode {
    /// `<command> cp <source> <target>` (e.g. `sudo cp`).
    Elevated {
        /// Privilege helper program.
        command: String,
    },
    /// Plain copy at the current privilege level.
    Plain,
}

/// A system file that must match a bundled copy.
#[derive(Debug)]
pub struct PrivilegedCopyResource<'a> {
    /// Bundled copy.
    pub source: PathBuf,
    /// Live system file.
    pub target: PathBuf,
    /// How the copy is performed.
    pub mode: CopyMode,
    executor: &'a dyn Executor,
}

impl<'a> PrivilegedCopyResource<'a> {
    /// Create a new privileged copy resource.
    #[must_use]
    pub const fn new(
        source: PathBuf,
        target: PathBuf,
        mode: CopyMode,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            source,
            target,
            mode,
            executor,
        }
    }
}

impl Applicable for PrivilegedCopyResource<'_> {
    fn description(&self) -> String {
        match &self.mode {
            CopyMode::Elevated { command } => format!(
                "{command} cp {} {}",
                self.source.display(),
                self.target.display()
            ),
            CopyMode::Plain => format!("cp {} {}", self.source.display(), self.target.display()),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if !self.source.exists() {
            return Err(BootstrapError::SourceNotFound {
                path: self.source.clone(),
            }
            .into());
        }

        match &self.mode {
            CopyMode::Elevated { command } => {
                let source = self.source.to_string_lossy();
                let target = self.target.to_string_lossy();
                self.executor
                    .run(command, &["cp", &source, &target])
                    .map_err(|e| BootstrapError::tool(command, e))?;
            }
            CopyMode::Plain => super::fs::copy_file(&self.source, &self.target)?,
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for PrivilegedCopyResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source not found: {}", self.source.display()),
            });
        }
        if !self.target.exists() {
            return Ok(ResourceState::Missing);
        }
        if super::fs::same_content(&self.source, &self.target) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}

//! Terminal settings stored in the `dconf` database.
use anyhow::Result;
use std::path::PathBuf;

use super::{Applicable, ResourceChange};
use crate::error::BootstrapError;
use crate::exec::Executor;

/// Settings subtree holding the terminal profiles.
pub const TERMINAL_PATH: &str = "/org/gnome/terminal/";

/// Program used to read and write the settings database.
pub const DCONF: &str = "dconf";

/// Thin wrapper over the `dconf` command line for one settings subtree.
#[derive(Debug, Clone, Copy)]
pub struct Dconf<'a> {
    path: &'a str,
    executor: &'a dyn Executor,
}

impl<'a> Dconf<'a> {
    /// Address the subtree at `path` through `executor`.
    #[must_use]
    pub const fn new(path: &'a str, executor: &'a dyn Executor) -> Self {
        Self { path, executor }
    }

    /// `dconf dump <path>`
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::ExternalToolFailed`] if `dconf` cannot be run
    /// or exits non-zero.
    pub fn dump(&self) -> Result<String, BootstrapError> {
        self.executor
            .run(DCONF, &["dump", self.path])
            .map(|r| r.stdout)
            .map_err(|e| BootstrapError::tool(DCONF, e))
    }

    /// `dconf reset -f <path>`
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::ExternalToolFailed`] on failure.
    pub fn reset(&self) -> Result<(), BootstrapError> {
        self.executor
            .run(DCONF, &["reset", "-f", self.path])
            .map(|_| ())
            .map_err(|e| BootstrapError::tool(DCONF, e))
    }

    /// `dconf load <path>` with `payload` on standard input.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::ExternalToolFailed`] on failure.
    pub fn load(&self, payload: &[u8]) -> Result<(), BootstrapError> {
        self.executor
            .run_with_input(DCONF, &["load", self.path], payload)
            .map(|_| ())
            .map_err(|e| BootstrapError::tool(DCONF, e))
    }
}

/// The bundled settings dump loaded into the database.
///
/// The live database cannot be compared cheaply with the payload, so the
/// load is always applied.
#[derive(Debug)]
pub struct DconfLoadResource<'a> {
    /// Bundled dump file.
    pub payload: PathBuf,
    /// Reset the subtree before loading.
    pub reset_first: bool,
    dconf: Dconf<'a>,
}

impl<'a> DconfLoadResource<'a> {
    /// Load `payload`, resetting the subtree first when `reset_first` is set.
    #[must_use]
    pub const fn new(payload: PathBuf, reset_first: bool, dconf: Dconf<'a>) -> Self {
        Self {
            payload,
            reset_first,
            dconf,
        }
    }
}

impl Applicable for DconfLoadResource<'_> {
    fn description(&self) -> String {
        format!("{DCONF} load {} < {}", self.dconf.path, self.payload.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let payload = std::fs::read(&self.payload).map_err(|e| {
            BootstrapError::tool(DCONF, format!("reading {}: {e}", self.payload.display()))
        })?;
        if self.reset_first {
            self.dconf.reset()?;
        }
        self.dconf.load(&payload)?;
        Ok(ResourceChange::Applied)
    }
}

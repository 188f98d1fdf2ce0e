//! Domain-specific error types for the bootstrap engine.
//!
//! Internal modules return [`BootstrapError`] where the failure kind matters
//! to the caller (the root guard, the privileged sshd copy, the recorded
//! failures in a [`RunReport`](crate::tasks::RunReport)). Everything else
//! uses [`anyhow::Error`] with context and converts at the CLI boundary via
//! the standard `?` operator.
//!
//! # Error policies
//!
//! ```text
//! PermissionViolation  fatal precondition, aborts before any work
//! CopyFailed           propagated (sshd) or recorded (dotfile entry)
//! ExternalToolFailed   propagated (sudo) or recorded (dconf)
//! SourceNotFound       a bundled payload is missing
//! InvalidConfig        options file could not be parsed
//! UnsupportedPlatform  unknown --platform value
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Typed failures produced by the bootstrap engine.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// The tool was started as root, or with `/root` as home directory.
    #[error("Do not run this as root or sudo. Run as a normal user ({reason})")]
    PermissionViolation {
        /// Which check tripped (effective uid or home directory).
        reason: String,
    },

    /// A bundled file that a step depends on does not exist.
    #[error("source not found: {}", path.display())]
    SourceNotFound {
        /// Path of the missing source.
        path: PathBuf,
    },

    /// A filesystem copy failed.
    #[error("copy {} -> {} failed: {source}", from.display(), to.display())]
    CopyFailed {
        /// Copy source.
        from: PathBuf,
        /// Copy destination.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An external program could not be run or exited non-zero.
    #[error("{program} failed: {message}")]
    ExternalToolFailed {
        /// Program name (e.g. `dconf`, `sudo`).
        program: String,
        /// Exit status and captured stderr, or the spawn error.
        message: String,
    },

    /// The options file is malformed.
    #[error("invalid options file {}: {message}", path.display())]
    InvalidConfig {
        /// Path to the options file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The requested platform name is not known.
    #[error("unsupported platform '{0}': must be one of linux, macos, cygwin")]
    UnsupportedPlatform(String),
}

impl BootstrapError {
    /// Short, stable name of the error kind, used in the run summary.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PermissionViolation { .. } => "PermissionViolation",
            Self::SourceNotFound { .. } => "SourceNotFound",
            Self::CopyFailed { .. } => "CopyFailed",
            Self::ExternalToolFailed { .. } => "ExternalToolFailed",
            Self::InvalidConfig { .. } => "InvalidConfig",
            Self::UnsupportedPlatform(_) => "UnsupportedPlatform",
        }
    }

    /// Build a [`BootstrapError::ExternalToolFailed`] from any displayable error.
    pub fn tool(program: &str, err: impl std::fmt::Display) -> Self {
        Self::ExternalToolFailed {
            program: program.to_string(),
            message: format!("{err:#}"),
        }
    }

    /// Recover the typed error carried by `err`, or describe it as a failed
    /// copy from `from` to `to`.
    #[must_use]
    pub fn copy_failure(err: anyhow::Error, from: &Path, to: &Path) -> Self {
        match err.downcast::<Self>() {
            Ok(typed) => typed,
            Err(other) => Self::CopyFailed {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: std::io::Error::other(format!("{other:#}")),
            },
        }
    }
}

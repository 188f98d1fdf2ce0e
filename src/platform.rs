use std::fmt;
use std::str::FromStr;

use crate::error::BootstrapError;

/// Detected operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS.
    MacOs,
    /// Cygwin on Windows.
    Cygwin,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Cygwin => write!(f, "cygwin"),
        }
    }
}

impl FromStr for Os {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "macos" | "mac" | "darwin" => Ok(Self::MacOs),
            "cygwin" => Ok(Self::Cygwin),
            other => Err(BootstrapError::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::UnsupportedPlatform`] on non-POSIX targets.
    pub fn detect() -> Result<Self, BootstrapError> {
        Ok(Self {
            os: Self::detect_os(std::env::consts::OS)?,
        })
    }

    /// Create a platform with an explicit OS (for overrides and tests).
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// Linux only; the neovim link applies here.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    /// Cygwin, which swaps in its own zshrc and mintty entries.
    #[must_use]
    pub fn is_cygwin(&self) -> bool {
        self.os == Os::Cygwin
    }

    /// Whether the Unix dotfile set applies (Linux and macOS).
    #[must_use]
    pub fn is_unix_family(&self) -> bool {
        matches!(self.os, Os::Linux | Os::MacOs)
    }

    fn detect_os(target: &str) -> Result<Os, BootstrapError> {
        match target {
            "linux" => Ok(Os::Linux),
            "macos" => Ok(Os::MacOs),
            "cygwin" => Ok(Os::Cygwin),
            other => Err(BootstrapError::UnsupportedPlatform(other.to_string())),
        }
    }
}

//! Run options: bundled config directory, destination and backup paths, and
//! behaviour switches.
//!
//! Options are layered: built-in defaults, then the optional
//! `<config_dir>/vps-cli.toml` file, then command-line overrides.
pub mod entries;
pub mod rules;
pub mod toml_loader;

use anyhow::{Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::BootstrapError;

/// Environment variable naming the bundled config directory.
pub const CONFIG_DIR_ENV: &str = "VPS_CLI_CONFIG_DIR";

/// Name of the bundled config directory shipped next to the binary.
pub const CONFIG_DIR_NAME: &str = "config_files";

/// Default system SSH configuration directory.
pub const DEFAULT_SSH_DIR: &str = "/etc/ssh";

/// Default command used to elevate the sshd copy.
pub const DEFAULT_PRIVILEGE_COMMAND: &str = "sudo";

/// Keys accepted in `vps-cli.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsFile {
    /// Install directory; `~/` is expanded.
    pub dest_dir: Option<String>,
    /// Backup directory; `~/` is expanded.
    pub backup_dir: Option<String>,
    /// System SSH directory holding `sshd_config`.
    pub ssh_dir: Option<String>,
    /// Full path of the live sshd config; wins over `ssh_dir`.
    pub local_sshd_config: Option<String>,
    /// Show debug messages on the console.
    pub verbose: Option<bool>,
    /// Test mode.
    pub testing: Option<bool>,
    /// Reset the terminal settings before loading the bundled ones.
    pub reset_terminal_settings: Option<bool>,
    /// Program prefixed to the sshd copy, `sudo` by default.
    pub privilege_command: Option<String>,
    /// Extra entry names never installed.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Values supplied on the command line. Switches only ever turn a setting on.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--dest-dir`
    pub dest_dir: Option<PathBuf>,
    /// `--backup-dir`
    pub backup_dir: Option<PathBuf>,
    /// `--ssh-dir`
    pub ssh_dir: Option<PathBuf>,
    /// `-v`
    pub verbose: bool,
    /// `--testing`
    pub testing: bool,
    /// `--reset-terminal-settings`
    pub reset_terminal_settings: bool,
}

/// Fully resolved options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Directory holding the bundled entries.
    pub config_dir: PathBuf,
    /// Where dotfiles are installed (normally `$HOME`).
    pub dest_dir: PathBuf,
    /// Where first-time backups are kept.
    pub backup_dir: PathBuf,
    /// Path of the live system `sshd_config`.
    pub sshd_config: PathBuf,
    /// Show debug messages on the console.
    pub verbose: bool,
    /// Test mode: plain sshd copy, no terminal settings sync.
    pub testing: bool,
    /// Run `dconf reset` before loading the terminal settings.
    pub reset_terminal_settings: bool,
    /// Program prefixed to the sshd copy.
    pub privilege_command: String,
    /// Names excluded on every platform, in addition to the built-in lists.
    pub extra_excludes: Vec<String>,
}

impl Options {
    /// Built-in defaults for a user whose home directory is `home`.
    #[must_use]
    pub fn defaults(config_dir: &Path, home: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            dest_dir: home.to_path_buf(),
            backup_dir: home.join("backup_files"),
            sshd_config: Path::new(DEFAULT_SSH_DIR).join(rules::SSHD_CONFIG),
            verbose: false,
            testing: false,
            reset_terminal_settings: false,
            privilege_command: DEFAULT_PRIVILEGE_COMMAND.to_string(),
            extra_excludes: Vec::new(),
        }
    }

    /// Resolve options from defaults, the options file in `config_dir`, and
    /// command-line `overrides`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::InvalidConfig`] if the options file exists
    /// but cannot be parsed or contains unknown keys.
    pub fn resolve(
        config_dir: &Path,
        home: &Path,
        overrides: &Overrides,
    ) -> Result<Self, BootstrapError> {
        let file: OptionsFile = toml_loader::load_config(&config_dir.join(rules::OPTIONS_FILE))?;
        let mut options = Self::defaults(config_dir, home);
        options.apply_file(file, home);
        options.apply_overrides(overrides);
        Ok(options)
    }

    fn apply_file(&mut self, file: OptionsFile, home: &Path) {
        if let Some(dir) = file.dest_dir {
            self.dest_dir = expand_home(&dir, home);
        }
        if let Some(dir) = file.backup_dir {
            self.backup_dir = expand_home(&dir, home);
        }
        if let Some(dir) = file.ssh_dir {
            self.sshd_config = expand_home(&dir, home).join(rules::SSHD_CONFIG);
        }
        // An explicit file path wins over the directory.
        if let Some(path) = file.local_sshd_config {
            self.sshd_config = expand_home(&path, home);
        }
        if let Some(command) = file.privilege_command {
            self.privilege_command = command;
        }
        self.verbose = file.verbose.unwrap_or(self.verbose);
        self.testing = file.testing.unwrap_or(self.testing);
        self.reset_terminal_settings = file
            .reset_terminal_settings
            .unwrap_or(self.reset_terminal_settings);
        self.extra_excludes = file.exclude;
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(ref dir) = overrides.dest_dir {
            self.dest_dir.clone_from(dir);
        }
        if let Some(ref dir) = overrides.backup_dir {
            self.backup_dir.clone_from(dir);
        }
        if let Some(ref dir) = overrides.ssh_dir {
            self.sshd_config = dir.join(rules::SSHD_CONFIG);
        }
        self.verbose |= overrides.verbose;
        self.testing |= overrides.testing;
        self.reset_terminal_settings |= overrides.reset_terminal_settings;
    }

    /// Directory the live `sshd_config` lives in.
    #[must_use]
    pub fn ssh_dir(&self) -> &Path {
        self.sshd_config.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// Path of a bundled entry.
    #[must_use]
    pub fn bundled(&self, name: &str) -> PathBuf {
        self.config_dir.join(name)
    }
}

/// Expand a leading `~` or `~/` to `home`.
#[must_use]
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        home.to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}

/// Current user's home directory from `$HOME`.
///
/// # Errors
///
/// Returns an error if `HOME` is unset or empty.
pub fn home_dir() -> Result<PathBuf> {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => bail!("HOME is not set"),
    }
}

/// Resolve the bundled config directory.
///
/// Checks, in order: the explicit `--config-dir` value, the
/// `VPS_CLI_CONFIG_DIR` environment variable, a `config_files/` directory
/// next to the binary (or one level up, for `bin/` layouts), and finally
/// `./config_files`.
///
/// # Errors
///
/// Returns an error if no candidate directory exists.
pub fn resolve_config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidates = [
            parent.join(CONFIG_DIR_NAME),
            parent.join("..").join(CONFIG_DIR_NAME),
        ];
        for candidate in &candidates {
            if candidate.is_dir() {
                return Ok(dunce::canonicalize(candidate)?);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let local = cwd.join(CONFIG_DIR_NAME);
    if local.is_dir() {
        return Ok(local);
    }

    bail!("cannot find {CONFIG_DIR_NAME}/. Use --config-dir or set {CONFIG_DIR_ENV}");
}

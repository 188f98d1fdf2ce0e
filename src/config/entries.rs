//! Bundled config entries and where each one installs.
use anyhow::{Context as _, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::rules::{PlatformRules, SkipReason};

/// A file or directory in the bundled config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Base name in the config directory, as found on disk.
    pub name: OsString,
    /// Name used for the destination and backup (after platform renames).
    pub install_name: OsString,
    /// Absolute path of the bundled entry.
    pub source: PathBuf,
    /// Whether the entry is a directory (symlinks followed).
    pub is_dir: bool,
}

impl ConfigEntry {
    /// `<dest_dir>/.<install_name>`
    #[must_use]
    pub fn dest_path(&self, dest_dir: &Path) -> PathBuf {
        let mut dotted = OsString::from(".");
        dotted.push(&self.install_name);
        dest_dir.join(dotted)
    }

    /// `<backup_dir>/<install_name>.orig`
    #[must_use]
    pub fn backup_path(&self, backup_dir: &Path) -> PathBuf {
        let mut orig = self.install_name.clone();
        orig.push(".orig");
        backup_dir.join(orig)
    }
}

/// An entry present in the config directory but left alone on this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Base name in the config directory.
    pub name: OsString,
    /// Why it is left alone.
    pub reason: SkipReason,
}

/// Result of scanning the config directory.
#[derive(Debug, Default)]
pub struct EntryScan {
    /// Entries to reconcile, sorted by name.
    pub entries: Vec<ConfigEntry>,
    /// Excluded, hidden, and control entries, sorted by name.
    pub skipped: Vec<SkippedEntry>,
}

/// List the entries of `config_dir` and classify them with `rules`.
///
/// Names are kept as the OS reports them, so entries whose names are not
/// valid UTF-8 are installed like any other.
///
/// # Errors
///
/// Returns an error if the directory or any of its entries cannot be read.
pub fn scan(config_dir: &Path, rules: &PlatformRules) -> Result<EntryScan> {
    let reading = || format!("reading config directory {}", config_dir.display());
    let mut names: Vec<(OsString, bool)> = Vec::new();
    for entry in std::fs::read_dir(config_dir).with_context(reading)? {
        let entry = entry.with_context(reading)?;
        // Follows symlinks so a linked directory is treated as a directory.
        names.push((entry.file_name(), entry.path().is_dir()));
    }
    names.sort();

    let mut scan = EntryScan::default();
    for (name, is_dir) in names {
        if let Some(reason) = rules.skip_reason(&name) {
            scan.skipped.push(SkippedEntry { name, reason });
            continue;
        }
        scan.entries.push(ConfigEntry {
            install_name: rules.install_name(&name).to_os_string(),
            source: config_dir.join(&name),
            name,
            is_dir,
        });
    }
    Ok(scan)
}

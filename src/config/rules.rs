//! Platform exclusion and rename rules for bundled entries.
use std::ffi::OsStr;

use crate::platform::Platform;

/// Bundled system SSH daemon configuration, consumed by the sshd step.
pub const SSHD_CONFIG: &str = "sshd_config";
/// Bundled terminal settings dump, consumed by the terminal settings step.
pub const TERMINAL_SETTINGS: &str = "gnome_terminal_settings";
/// Optional options file living next to the bundled entries.
pub const OPTIONS_FILE: &str = "vps-cli.toml";

/// Entries in the config directory that are never installed as dotfiles.
pub const CONTROL_ENTRIES: &[&str] = &[SSHD_CONFIG, TERMINAL_SETTINGS, OPTIONS_FILE];

/// Cygwin-only entries that must not land on Linux or macOS.
const UNIX_EXCLUDES: &[&str] = &["cygwin_zshrc", "minttyrc"];

/// Unix entries that have a Cygwin-specific replacement.
const CYGWIN_EXCLUDES: &[&str] = &["zshrc"];

/// `(source name, install name)` pairs applied on Cygwin.
const CYGWIN_RENAMES: &[(&str, &str)] = &[("cygwin_zshrc", "zshrc")];

/// Why an entry is not reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Payload for a specialised step or the options file.
    Control,
    /// Hidden entry such as `.git`.
    Hidden,
    /// On the exclusion list for this platform.
    Excluded,
}

/// Exclusion and rename rules for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRules {
    excludes: Vec<String>,
    renames: Vec<(String, String)>,
}

impl PlatformRules {
    /// Build the rules for `platform`, adding `extra_excludes` from the
    /// options file.
    #[must_use]
    pub fn for_platform(platform: &Platform, extra_excludes: &[String]) -> Self {
        let (base_excludes, renames): (&[&str], &[(&str, &str)]) = if platform.is_cygwin() {
            (CYGWIN_EXCLUDES, CYGWIN_RENAMES)
        } else {
            (UNIX_EXCLUDES, &[])
        };

        let mut excludes: Vec<String> = base_excludes.iter().map(|s| (*s).to_string()).collect();
        excludes.extend(extra_excludes.iter().cloned());

        Self {
            excludes,
            renames: renames
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }

    /// Return why `name` is skipped, or `None` if it should be reconciled.
    #[must_use]
    pub fn skip_reason(&self, name: &OsStr) -> Option<SkipReason> {
        if CONTROL_ENTRIES.iter().any(|c| name == OsStr::new(c)) {
            Some(SkipReason::Control)
        } else if name.as_encoded_bytes().starts_with(b".") {
            Some(SkipReason::Hidden)
        } else if self.excludes.iter().any(|e| name == OsStr::new(e)) {
            Some(SkipReason::Excluded)
        } else {
            None
        }
    }

    /// Name an entry installs under (without the leading dot).
    #[must_use]
    pub fn install_name<'a>(&'a self, source_name: &'a OsStr) -> &'a OsStr {
        self.renames
            .iter()
            .find(|(from, _)| source_name == OsStr::new(from))
            .map_or(source_name, |(_, to)| OsStr::new(to))
    }
}

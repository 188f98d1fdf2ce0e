//! Log file location, colour stripping and timestamps.
use std::ffi::OsString;
use std::path::PathBuf;

/// `chrono` format of the log file header.
pub(super) const DATETIME: &str = "%Y-%m-%d %H:%M:%S";
/// `chrono` format prefixed to every log line.
pub(super) const TIME: &str = "%H:%M:%S";

/// `<cache>/vps-cli/<command>.log`, where `<cache>` is `$XDG_CACHE_HOME` or
/// `$HOME/.cache`. Nothing is created here.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = log_dir(
        std::env::var_os("XDG_CACHE_HOME"),
        std::env::var_os("HOME"),
    )?;
    Some(dir.join(format!("{command}.log")))
}

fn log_dir(xdg_cache: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let cache = xdg_cache
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            home.filter(|v| !v.is_empty())
                .map(|h| PathBuf::from(h).join(".cache"))
        })?;
    Some(cache.join("vps-cli"))
}

/// Drop ANSI escape sequences: CSI sequences up to their final byte, and
/// two-character escapes such as `ESC M`.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('\x1b') {
        let (text, escape) = rest.split_at(pos);
        out.push_str(text);
        let mut chars = escape.chars();
        chars.next();
        if chars.next() == Some('[') {
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        }
        rest = chars.as_str();
    }
    out.push_str(rest);
    out
}

/// Current UTC time rendered with `format`.
pub(super) fn timestamp(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}

//! Tracing subscriber: coloured console output plus a per-command log file.
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;

use super::utils::{DATETIME, TIME, log_file_path, strip_ansi, timestamp};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "vps_cli::stage";
/// Target used for dry-run notices.
pub(super) const DRY_RUN_TARGET: &str = "vps_cli::dry_run";

/// How an event is rendered, from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    DryRun,
    Info,
    Debug,
    Warn,
    Error,
}

impl Kind {
    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    fn console(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Self::Info => format!("  {msg}"),
            Self::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
            Self::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
            Self::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
        }
    }

    fn plain(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("==> {msg}"),
            Self::DryRun => format!("    [dry run] {msg}"),
            Self::Info => format!("    {msg}"),
            Self::Debug => format!("    [debug] {msg}"),
            Self::Warn => format!("    [warn] {msg}"),
            Self::Error => format!("    [error] {msg}"),
        }
    }
}

/// Pulls the formatted `message` field out of an event.
#[derive(Default)]
struct Message(String);

impl tracing::field::Visit for Message {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }
}

fn message(event: &tracing::Event<'_>) -> String {
    let mut visitor = Message::default();
    event.record(&mut visitor);
    visitor.0
}

/// Appends every event, timestamped and without colour codes, to one file.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Create `path` (and its parent), truncate it and write a header naming
    /// `command`.
    ///
    /// Returns `None` if the file cannot be set up; the run then logs to the
    /// console only.
    pub(super) fn open(path: &Path, command: &str) -> Option<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        let version = option_env!("VPS_CLI_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        let header = format!("# vps-cli {version} {command} {} UTC\n", timestamp(DATETIME));
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let line = Kind::of(event.metadata()).plain(&strip_ansi(&message(event)));
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "[{}] {line}", timestamp(TIME)).ok();
        }
    }
}

/// Console rendering for the `fmt` layer.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        writeln!(writer, "{}", Kind::of(event.metadata()).console(&message(event)))
    }
}

/// Install the global subscriber for `command` and return the log file it
/// writes to.
///
/// The console shows `info` and above (`debug` too when `verbose`), with
/// warnings and errors on stderr. The file at
/// `$XDG_CACHE_HOME/vps-cli/<command>.log` receives everything from `debug`
/// up. Returns `None` when the file could not be opened.
pub fn init_subscriber(verbose: bool, command: &str) -> Option<PathBuf> {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));
    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let log_file = log_file_path(command);
    let file_layer = log_file
        .as_deref()
        .and_then(|path| FileLayer::open(path, command))
        .map(|layer| layer.with_filter(LevelFilter::DEBUG));
    let writes_file = file_layer.is_some();

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();

    log_file.filter(|_| writes_file)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_carry_level_tags() {
        assert_eq!(Kind::Stage.plain("Summary"), "==> Summary");
        assert_eq!(Kind::Warn.plain("careful"), "    [warn] careful");
        assert_eq!(Kind::Info.plain("ok"), "    ok");
    }

    #[test]
    fn console_colours_errors() {
        let line = Kind::Error.console("broken");
        assert!(line.starts_with("\x1b[31mERROR"));
        assert_eq!(strip_ansi(&line), "ERROR broken");
    }

    #[test]
    fn open_creates_parent_and_writes_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/install.log");
        FileLayer::open(&path, "install").expect("file layer");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# vps-cli "));
        assert!(contents.contains(" install "));
    }
}

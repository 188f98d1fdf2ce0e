//! The [`Log`] trait shared by tasks, commands and test doubles.

/// Sink for the messages of a run.
///
/// [`Logger`](super::Logger) turns them into [`tracing`] events; task tests
/// substitute an in-memory recorder.
pub trait Log: Send + Sync {
    /// Log a stage header, one per step.
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (console only when verbose, always in the file).
    fn debug(&self, msg: &str);
    /// Log a warning.
    fn warn(&self, msg: &str);
    /// Log an error.
    fn error(&self, msg: &str);
    /// Log a change that a dry run would have made.
    fn dry_run(&self, msg: &str);
}

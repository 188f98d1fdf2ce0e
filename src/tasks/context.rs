use std::sync::Arc;

use crate::config::Options;
use crate::config::rules::PlatformRules;
use crate::error::BootstrapError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;

use super::report::RunRecorder;

/// Shared context for task execution.
pub struct Context {
    /// Resolved run options.
    pub options: Arc<Options>,
    /// Detected (or overridden) platform.
    pub platform: Arc<Platform>,
    /// Exclusion and rename rules for `platform`.
    pub rules: Arc<PlatformRules>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Step outcomes and failures of the current run.
    pub recorder: Arc<RunRecorder>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("options", &self.options)
            .field("platform", &self.platform)
            .field("rules", &self.rules)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("executor", &self.executor)
            .field("recorder", &self.recorder)
            .finish()
    }
}

impl Context {
    /// Creates a new context for a run.
    #[must_use]
    pub fn new(
        options: Options,
        platform: Platform,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let rules = PlatformRules::for_platform(&platform, &options.extra_excludes);
        Self {
            options: Arc::new(options),
            platform: Arc::new(platform),
            rules: Arc::new(rules),
            log,
            dry_run,
            executor,
            recorder: Arc::new(RunRecorder::new()),
        }
    }

    /// Record a non-fatal failure for `step` and log it.
    pub fn record_failure(&self, step: &str, error: BootstrapError) {
        self.log.error(&format!("{step}: {error}"));
        self.recorder.record_failure(step, error);
    }
}

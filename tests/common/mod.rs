// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed sandbox laid out like a real machine
// (bundled config dir, home, /etc/ssh) and a scripted executor, so each
// integration test can drive a full run without touching the host.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use vps_cli::config::Options;
use vps_cli::config::rules::SSHD_CONFIG;
use vps_cli::exec::{ExecResult, Executor};
use vps_cli::logging::{Log, Logger};
use vps_cli::platform::{Os, Platform};
use vps_cli::tasks::Context;
use vps_cli::tasks::preflight::Identity;

/// Executor that answers from a queue of canned outcomes and records every
/// command line it is asked to run.
///
/// An empty queue answers with success and empty output.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    outcomes: Mutex<VecDeque<bool>>,
    commands: Mutex<Vec<String>>,
    missing_tools: Vec<String>,
}

impl ScriptedExecutor {
    /// Every call succeeds.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Calls succeed or fail in the given order, then succeed.
    pub fn with_outcomes(outcomes: &[bool]) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.iter().copied().collect()),
            ..Self::default()
        }
    }

    /// Report `program` as absent from `PATH`.
    pub fn without_tool(mut self, program: &str) -> Self {
        self.missing_tools.push(program.to_string());
        self
    }

    /// Command lines issued so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("commands lock").clone()
    }

    fn answer(&self, program: &str, args: &[&str]) -> bool {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.commands.lock().expect("commands lock").push(line);
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .pop_front()
            .unwrap_or(true)
    }

    fn checked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        if self.answer(program, args) {
            Ok(ExecResult {
                stdout: String::new(),
                stderr: String::new(),
                success: true,
                code: Some(0),
            })
        } else {
            anyhow::bail!("{program} exited with status 1")
        }
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_with_input(
        &self,
        program: &str,
        args: &[&str],
        _input: &[u8],
    ) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn which(&self, program: &str) -> bool {
        !self.missing_tools.iter().any(|p| p == program)
    }
}

/// An isolated machine backed by a [`tempfile::TempDir`].
///
/// Layout:
/// - `config_files/`  bundled entries
/// - `home/`          destination directory
/// - `home/backup_files/` backup directory (not created up front)
/// - `etc/ssh/`       system SSH directory
pub struct Sandbox {
    root: tempfile::TempDir,
    pub config: PathBuf,
    pub home: PathBuf,
    pub backup: PathBuf,
    pub ssh: PathBuf,
}

impl Sandbox {
    /// Create the directory layout with an empty config dir.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let config = root.path().join("config_files");
        let home = root.path().join("home");
        let ssh = root.path().join("etc/ssh");
        for dir in [&config, &home, &ssh] {
            std::fs::create_dir_all(dir).expect("create sandbox dir");
        }
        let backup = home.join("backup_files");
        Self {
            root,
            config,
            home,
            backup,
            ssh,
        }
    }

    /// Root of the temporary tree.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Add a bundled entry; `name` may contain `/` to create a tree.
    pub fn bundle(self, name: &str, content: &str) -> Self {
        write_file(&self.config.join(name), content);
        self
    }

    /// `$HOME/.<name>`.
    pub fn dotfile(&self, name: &str) -> PathBuf {
        self.home.join(format!(".{name}"))
    }

    /// `<backup>/<name>.orig`.
    pub fn backup_of(&self, name: &str) -> PathBuf {
        self.backup.join(format!("{name}.orig"))
    }

    /// Live `sshd_config` path.
    pub fn sshd_config(&self) -> PathBuf {
        self.ssh.join(SSHD_CONFIG)
    }

    /// Options for a run in testing mode (no elevation, no dconf).
    pub fn options(&self) -> Options {
        let mut options = Options::defaults(&self.config, &self.home);
        options.sshd_config = self.sshd_config();
        options.testing = true;
        options
    }

    /// A regular user whose home is the sandbox home.
    pub fn user(&self) -> Identity {
        Identity {
            euid_is_root: false,
            home: self.home.clone(),
        }
    }

    /// The same home directory, but with effective uid 0.
    pub fn root_user(&self) -> Identity {
        Identity {
            euid_is_root: true,
            home: self.home.clone(),
        }
    }

    /// Build a task context on Linux; the logger writes no log file.
    pub fn context(&self, options: Options, executor: Arc<ScriptedExecutor>) -> Context {
        let log: Arc<dyn Log> = Arc::new(Logger::default());
        Context::new(options, Platform::new(Os::Linux), log, false, executor)
    }

    /// Every path below the sandbox root, relative and sorted.
    pub fn snapshot_tree(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect(self.root(), self.root(), &mut paths);
        paths.sort();
        paths
    }
}

fn collect(base: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in std::fs::read_dir(dir).expect("read dir") {
        let path = entry.expect("dir entry").path();
        out.push(
            path.strip_prefix(base)
                .expect("below base")
                .display()
                .to_string(),
        );
        if path.is_dir() {
            collect(base, &path, out);
        }
    }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// Read `path` to a string.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read file")
}

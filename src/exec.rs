//! External command execution.
//!
//! Tasks never spawn processes directly; they go through the [`Executor`]
//! held by the task [`Context`](crate::tasks::Context) so tests can swap in
//! a recording mock. Calls block until the child exits; there is no timeout.
use anyhow::{Context as _, Result, bail};
use std::io::Write as _;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process execution.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with `input` written to its standard input.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned, the input cannot be
    /// written, or the program exits non-zero.
    fn run_with_input(&self, program: &str, args: &[&str], input: &[u8]) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

/// Turn a finished process into a result, bailing on non-zero exit.
fn check(result: ExecResult, label: &str) -> Result<ExecResult> {
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

fn label(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let label = label(program, args);
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {label}"))?;
        check(ExecResult::from(output), &label)
    }

    fn run_with_input(&self, program: &str, args: &[&str], input: &[u8]) -> Result<ExecResult> {
        let label = label(program, args);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute: {label}"))?;

        // Dropping the handle at the end of the block closes the pipe.
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(input)
        {
            drop(stdin);
            child.wait().ok();
            return Err(e).with_context(|| format!("writing stdin of {label}"));
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("waiting for {label}"))?;
        check(ExecResult::from(output), &label)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

//! Idempotent resource primitives (check + apply pattern).
pub mod backup;
pub mod dconf;
pub mod dotfile;
pub mod fs;
pub mod privileged;
pub mod symlink;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// This method should:
    /// - Create parent directories if needed
    /// - Update the resource to match the desired state
    /// - Return the appropriate `ResourceChange` result
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied. Failures with a
    /// meaningful kind are a wrapped [`BootstrapError`](crate::error::BootstrapError).
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a filesystem or system resource.
///
/// # Examples
///
/// ```
/// use vps_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "content differs".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g. a file would replace a directory).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped (e.g. a backup already exists).
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Interface for resources that can determine their own state.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;
}

/// Shared test helpers for resource and task unit tests.
#[cfg(test)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One call observed by [`MockExecutor`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedCall {
        /// Program and arguments joined with single spaces.
        pub command: String,
        /// Bytes written to standard input, if any.
        pub input: Option<Vec<u8>>,
    }

    /// A configurable mock executor.
    ///
    /// Maintains a queue of `(success, stdout)` responses consumed in FIFO
    /// order.  When the queue is empty any call returns a failed response
    /// (`success = false`, stdout = `"unexpected call"`). Every call is
    /// recorded so tests can assert on the exact command lines issued.
    #[derive(Debug)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<(bool, String)>>,
        calls: Mutex<Vec<RecordedCall>>,
        /// Return value for every [`Executor::which`] call.
        which_result: bool,
    }

    impl MockExecutor {
        /// Create a mock with a single successful response.
        #[must_use]
        pub fn ok(stdout: &str) -> Self {
            Self::with_responses(vec![(true, stdout.to_string())])
        }

        /// Create a mock with a single failed response (empty stdout).
        #[must_use]
        pub fn fail() -> Self {
            Self::with_responses(vec![(false, String::new())])
        }

        /// Create a mock from an ordered list of `(success, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(bool, String)>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
                which_result: true,
            }
        }

        /// Set the value returned by every [`Executor::which`] call.
        #[must_use]
        pub const fn with_which(mut self, result: bool) -> Self {
            self.which_result = result;
            self
        }

        /// Return the total number of executor calls made so far.
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.calls.lock().map_or(0, |c| c.len())
        }

        /// Return every call made so far, in order.
        #[must_use]
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().map_or_else(|_| vec![], |c| c.clone())
        }

        /// Return the command lines issued so far, in order.
        #[must_use]
        pub fn commands(&self) -> Vec<String> {
            self.calls().into_iter().map(|c| c.command).collect()
        }

        fn next(&self, program: &str, args: &[&str], input: Option<&[u8]>) -> (bool, String) {
            if let Ok(mut calls) = self.calls.lock() {
                let mut command = program.to_string();
                for arg in args {
                    command.push(' ');
                    command.push_str(arg);
                }
                calls.push(RecordedCall {
                    command,
                    input: input.map(<[u8]>::to_vec),
                });
            }
            self.responses.lock().map_or_else(
                |_| (false, "mutex poisoned".to_string()),
                |mut guard| {
                    guard
                        .pop_front()
                        .unwrap_or_else(|| (false, "unexpected call".to_string()))
                },
            )
        }

        fn checked(
            &self,
            program: &str,
            args: &[&str],
            input: Option<&[u8]>,
        ) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args, input);
            if success {
                Ok(ExecResult {
                    stdout,
                    stderr: String::new(),
                    success: true,
                    code: Some(0),
                })
            } else {
                anyhow::bail!("mock command failed")
            }
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.checked(program, args, None)
        }

        fn run_with_input(
            &self,
            program: &str,
            args: &[&str],
            input: &[u8],
        ) -> anyhow::Result<ExecResult> {
            self.checked(program, args, Some(input))
        }

        fn which(&self, _: &str) -> bool {
            self.which_result
        }
    }
}

//! Personal environment bootstrap.
//!
//! Copies a bundled set of dotfiles into the user's home directory, keeping a
//! one-time backup of anything it replaces, then links the neovim config,
//! loads the bundled terminal settings through `dconf`, and installs the
//! bundled `sshd_config` with elevated privileges. `pull` runs the copy in
//! reverse so local edits can be brought back into the bundle.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: run options, platform rules, and the bundled entry scan
//! - **[`resources`]**: idempotent `check + apply` primitives (copies, backups, links)
//! - **[`tasks`]**: named steps wired to resources, and the run loop
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `pull`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod tasks;

//! Command: print version information.

/// Version string, overridable at build time with `VPS_CLI_VERSION`.
#[must_use]
pub fn current() -> &'static str {
    option_env!("VPS_CLI_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("vps-cli {}", current());
}

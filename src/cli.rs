use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::platform::Os;

/// Top-level CLI entry point.
/// Top-level command line of vps-cli.
#[derive(Parser, Debug)]
#[command(
    name = "vps-cli",
    about = "Bootstrap a personal environment from a bundled set of dotfiles",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Test mode: plain sshd config copy, no terminal settings sync
    #[arg(long, global = true)]
    pub testing: bool,

    /// Directory holding the bundled dotfiles
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Install destination (defaults to the home directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub dest_dir: Option<PathBuf>,

    /// Where first-time backups are kept
    #[arg(long, global = true, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// System SSH configuration directory
    #[arg(long, global = true, value_name = "DIR")]
    pub ssh_dir: Option<PathBuf>,

    /// Override platform detection (linux, macos, cygwin)
    #[arg(long, global = true)]
    pub platform: Option<Os>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Back up existing dotfiles and install the bundled ones
    #[command(visible_alias = "copy")]
    Install(InstallOpts),
    /// Copy live dotfiles back into the bundled config directory
    Pull(PullOpts),
    /// Print a shell completion script
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip specific steps
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific steps
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Reset the terminal settings tree before loading the bundled one
    #[arg(long)]
    pub reset_terminal_settings: bool,
}

/// Options for the `pull` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct PullOpts {
    /// Skip specific steps
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific steps
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_dry_run() {
        let cli = Cli::parse_from(["vps-cli", "--dry-run", "install"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_install_dry_run_short() {
        let cli = Cli::parse_from(["vps-cli", "-d", "install"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn copy_is_an_alias_for_install() {
        let cli = Cli::parse_from(["vps-cli", "copy"]);
        assert!(matches!(cli.command, Command::Install(_)));
    }

    #[test]
    fn parse_install_skip_tasks() {
        let cli = Cli::parse_from(["vps-cli", "install", "--skip", "sshd,terminal"]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install command");
        };
        assert_eq!(opts.skip, vec!["sshd", "terminal"]);
    }

    #[test]
    fn parse_install_only_and_reset() {
        let cli = Cli::parse_from([
            "vps-cli",
            "install",
            "--only",
            "terminal",
            "--reset-terminal-settings",
        ]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install command");
        };
        assert_eq!(opts.only, vec!["terminal"]);
        assert!(opts.reset_terminal_settings);
    }

    #[test]
    fn parse_pull_only() {
        let cli = Cli::parse_from(["vps-cli", "pull", "--only", "dotfiles"]);
        let Command::Pull(opts) = cli.command else {
            panic!("expected pull command");
        };
        assert_eq!(opts.only, vec!["dotfiles"]);
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["vps-cli", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["vps-cli", "completions", "zsh"]);
        assert!(matches!(
            cli.command,
            Command::Completions { shell: Shell::Zsh }
        ));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["vps-cli", "-v", "install"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_directory_overrides() {
        let cli = Cli::parse_from([
            "vps-cli",
            "--config-dir",
            "/opt/vps/config_files",
            "--dest-dir",
            "/tmp/home",
            "--backup-dir",
            "/tmp/backup",
            "--ssh-dir",
            "/tmp/ssh",
            "install",
        ]);
        assert_eq!(
            cli.global.config_dir,
            Some(PathBuf::from("/opt/vps/config_files"))
        );
        assert_eq!(cli.global.dest_dir, Some(PathBuf::from("/tmp/home")));
        assert_eq!(cli.global.backup_dir, Some(PathBuf::from("/tmp/backup")));
        assert_eq!(cli.global.ssh_dir, Some(PathBuf::from("/tmp/ssh")));
    }

    #[test]
    fn global_flags_accepted_after_subcommand() {
        let cli = Cli::parse_from(["vps-cli", "install", "--testing", "--platform", "cygwin"]);
        assert!(cli.global.testing);
        assert_eq!(cli.global.platform, Some(Os::Cygwin));
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let result = Cli::try_parse_from(["vps-cli", "--platform", "plan9", "install"]);
        assert!(result.is_err());
    }
}

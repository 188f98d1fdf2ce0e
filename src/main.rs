use anyhow::Result;
use clap::Parser;

use vps_cli::{cli, commands};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    match args.command {
        cli::Command::Install(ref opts) => commands::install::run(&args.global, opts, args.verbose),
        cli::Command::Pull(ref opts) => commands::pull::run(&args.global, opts, args.verbose),
        cli::Command::Completions { shell } => {
            commands::completions::run(shell);
            Ok(())
        }
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}

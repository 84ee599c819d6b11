//! Explodomatica CLI
//!
//! Renders a procedural explosion sound to a WAV file.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use explodomatica::cli::commands::{generate, print_report, recovery_hints};
use explodomatica::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Explodomatica v{}", env!("CARGO_PKG_VERSION"));

    let report = generate(&cli)
        .map_err(|err| {
            let hints = recovery_hints(&err);
            if !hints.is_empty() {
                eprintln!("{}", hints);
            }
            err
        })
        .with_context(|| format!("Failed to render explosion to {}", cli.output.display()))?;
    print_report(&report);

    Ok(())
}

//! xauthfwd - command-line front end for X authority cookie forwarding.
//!
//! Exercises the same session engine a login stack would, against the
//! real passwd database and this process's environment.

mod args;
mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Acl {
            direction,
            subject,
            object,
            default,
        } => commands::check_acl(
            direction.into(),
            &subject,
            &object,
            default.into(),
            cli.json,
        ),
        Commands::Forward {
            target,
            keep,
            options,
        } => commands::forward(&target, &options, keep, cli.json),
    }
}

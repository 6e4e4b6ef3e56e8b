//! lintbridge CLI
//!
//! Runs a JavaScript lint engine over a list of files and streams the
//! results to stdout for a build tool or editor to consume.

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod utils;

use cli::{Cli, Commands};
use commands::init::run_init;
use commands::lint::run_lint;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging. Stdout carries the structured stream only.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Commands::Lint(args) => run_lint(cli, args),
        Commands::Init { force } => run_init(*force).map(|_| false),
    }
}

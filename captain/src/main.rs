//! kubectl-captain - Entry Point
//!
//! kubectl plugin to create, upgrade and inspect HelmRequests.

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use captain::app::cli::Cli;
use captain::app::run::run;
use captain::logs::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = init_logging(cli.log_options()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    if let Some(output) = run(cli).await? {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(output.as_bytes())
            .and_then(|_| stdout.flush())
            .context("failed to write to stdout")?;
    }
    Ok(())
}

mod cli;
mod commands;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use ivolution_lib::launcher::Launcher;
use ivolution_lib::logging::initialize_logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logging(cli.global_args.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::failure(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.global_args.load_config()?;
    let launcher = Launcher::new(config, cli.global_args.platform)
        .context("Failed to set up the launcher")?;

    cli.command.run(&launcher).await
}

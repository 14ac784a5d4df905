mod cli;
mod commands;
mod error;
mod logging;
mod session;

use crate::cli::Cli;
use clap::Parser;
use orderly_config::Config;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:?}");
            return ExitCode::FAILURE;
        },
    };
    logging::init(cli.verbose, &config.log_level);

    let dry_run = cli.dry_run || config.dry_run;
    let mut stdout = std::io::stdout().lock();
    match commands::run(cli.command, &config, dry_run, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

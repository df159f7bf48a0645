// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use gs_cli::config::Config;
use gs_cli::{Cli, Commands, Parser};
use gs_logging::CliLogLevel;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let default_level = config.logging.cli_level().unwrap_or(CliLogLevel::Info);
    cli.logging.init("gs-cli", default_level)?;

    match cli.command {
        Commands::Migrate(args) => args.run(&config.discovery).await,
        Commands::Refspecs(args) => args.run(&config).await,
        Commands::Notify(args) => args.run(&config).await,
    }
}

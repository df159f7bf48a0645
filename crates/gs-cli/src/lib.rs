// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use clap::Subcommand;
use gs_logging::CliLoggingArgs;
use std::path::PathBuf;

pub mod config;
pub mod migrate;
pub mod notify;
pub mod refspecs;

pub use clap::Parser;

#[derive(clap::Parser)]
#[command(
    name = "gs",
    about = "Git source configuration and push-notification tools",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file with discovery settings, owners and sources
    #[arg(long, env = "GS_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub logging: CliLoggingArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Migrate(migrate::MigrateArgs),
    Refspecs(refspecs::RefspecsArgs),
    Notify(notify::NotifyArgs),
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for git source configuration

use thiserror::Error;

/// Result type alias for git source operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or composing a git source
#[derive(Debug, Error)]
pub enum Error {
    #[error("Insecure transport rejected for remote {remote}: credentials require an encrypted transport")]
    InsecureTransport { remote: String },

    #[error("Invalid head filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Could not convert extension '{0}' to a trait")]
    Conversion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

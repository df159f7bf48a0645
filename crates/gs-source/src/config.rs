// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Discovery settings shared by every source

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whether remote and credential changes are checked against the transport policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceMode {
    #[default]
    Standard,
    /// Credentials may only travel over encrypted transports
    Restricted,
}

/// `[discovery]` configuration section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoverySettings {
    /// Always want tags, whether or not a tag discovery trait is configured.
    /// Restores the behaviour of installations that fetched tags unconditionally.
    #[serde(default)]
    pub ignore_tag_discovery_trait: bool,

    #[serde(default)]
    pub compliance_mode: ComplianceMode,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsRoot {
    #[serde(default)]
    discovery: DiscoverySettings,
}

impl DiscoverySettings {
    /// Load settings from an optional TOML file overlaid by `GS_` environment variables
    ///
    /// `GS_DISCOVERY__COMPLIANCE_MODE=restricted` maps to
    /// `discovery.compliance-mode`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }
        let built = builder.add_source(env_source()).build()?;
        let root: SettingsRoot = built.try_deserialize()?;
        tracing::debug!(settings = ?root.discovery, "Loaded discovery settings");
        Ok(root.discovery)
    }

    pub fn is_restricted(&self) -> bool {
        self.compliance_mode == ComplianceMode::Restricted
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix("GS")
        .prefix_separator("_")
        .separator("__")
        .convert_case(config::Case::Kebab)
        .try_parsing(true)
}

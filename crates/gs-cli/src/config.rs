// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Root configuration of the `gs` CLI.
//!
//! The file composes the discovery settings, the logging section and the
//! owners with their stored sources:
//!
//! ```toml
//! log-level = "debug"
//!
//! [discovery]
//! compliance-mode = "restricted"
//!
//! [[owners]]
//! id = "platform"
//! display-name = "Platform / Services"
//! url = "https://ci.example.com/job/platform/"
//!
//! [[owners.sources]]
//! id = "services"
//! remote = "https://git.example.com/platform/services.git"
//! includes = "main release/*"
//! ```

use anyhow::{Context, Result};
use gs_logging::logging_config::LoggingConfig;
use gs_logging::redact;
use gs_notify::{InMemorySourceRegistry, Owner};
use gs_source::{DiscoverySettings, GitSource, StoredSource, TraitCatalog, TransportGuard};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An owner and the sources it tracks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    #[serde(flatten)]
    pub owner: Owner,
    #[serde(default)]
    pub sources: Vec<StoredSource>,
}

/// Root configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoverySettings,

    // Logging configuration
    #[serde(flatten)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub owners: Vec<OwnerConfig>,
}

impl Config {
    /// Load the configuration file, then overlay `GS_` environment variables
    /// on the discovery settings
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read configuration {}", path.display()))?;
                toml::from_str::<Config>(&text)
                    .with_context(|| format!("Failed to parse configuration {}", path.display()))?
            }
            None => Config::default(),
        };
        config.discovery =
            DiscoverySettings::load(path).context("Failed to load discovery settings")?;
        Ok(config)
    }

    /// Migrated sources per owner
    ///
    /// Sources rejected by the transport guard are logged and left out.
    pub fn sources(&self, catalog: &dyn TraitCatalog) -> Vec<(Owner, GitSource)> {
        let guard = TransportGuard::from_settings(&self.discovery);
        let mut sources = Vec::new();
        for owner_config in &self.owners {
            for stored in &owner_config.sources {
                match GitSource::from_stored(stored.clone(), catalog, &guard) {
                    Ok(source) => sources.push((owner_config.owner.clone(), source)),
                    Err(e) => tracing::error!(
                        owner = %owner_config.owner.id,
                        source_id = %stored.id,
                        credentials = %stored.credentials_id.as_deref().map(redact).unwrap_or("none"),
                        error = %e,
                        "Skipping source"
                    ),
                }
            }
        }
        sources
    }

    /// Registry tracking every usable configured source
    pub fn registry(&self, catalog: &dyn TraitCatalog) -> InMemorySourceRegistry {
        let registry = InMemorySourceRegistry::new();
        for (owner, source) in self.sources(catalog) {
            registry.track(owner, source);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_source::{ComplianceMode, StaticTraitCatalog};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
log-level = "debug"

[discovery]
compliance-mode = "restricted"

[[owners]]
id = "platform"
display-name = "Platform"

[[owners.sources]]
id = "services"
remote = "https://git.example.com/platform/services.git"
credentials-id = "deploy"
includes = "main"

[[owners.sources]]
id = "plain-http"
remote = "http://git.example.com/platform/legacy.git"
credentials-id = "deploy"
"#;

    #[test]
    fn test_load_and_filter_insecure_sources() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.discovery.compliance_mode, ComplianceMode::Restricted);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.owners[0].sources.len(), 2);

        let sources = config.sources(&StaticTraitCatalog::builtin());
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].1.id().as_str(), "services");
        assert_eq!(
            sources[0].1.traits(),
            &[
                gs_source::SourceTrait::BranchDiscovery,
                gs_source::SourceTrait::wildcard_filter("main", ""),
            ]
        );
    }

    #[test]
    fn test_missing_path_yields_empty_config() {
        let config = Config::load(None).unwrap();
        assert!(config.owners.is_empty());
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Migrate stored sources with legacy fields to trait lists

use anyhow::{Context, Result};
use clap::Args;
use gs_source::{DiscoverySettings, GitSource, StaticTraitCatalog, StoredSource, TransportGuard};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File holding stored sources
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SourcesFile {
    #[serde(default)]
    pub sources: Vec<StoredSource>,
}

/// Arguments for the migrate command
#[derive(Args, Debug, Clone)]
#[command(about = "Convert legacy source fields into traits and print the result")]
pub struct MigrateArgs {
    /// TOML file with `[[sources]]` records
    #[arg(long)]
    pub input: PathBuf,
}

impl MigrateArgs {
    pub async fn run(self, settings: &DiscoverySettings) -> Result<()> {
        let migrated = migrate_file(&self.input, &TransportGuard::from_settings(settings))?;
        print!("{}", migrated);
        Ok(())
    }
}

/// Migrate every source in `path` and render the stored form as TOML
pub fn migrate_file(path: &Path, guard: &TransportGuard) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    migrate_str(&text, guard).with_context(|| format!("Failed to migrate {}", path.display()))
}

/// Migrate every source in `text`; any source rejected by `guard` fails the whole file
pub fn migrate_str(text: &str, guard: &TransportGuard) -> Result<String> {
    let catalog = StaticTraitCatalog::builtin();
    let file: SourcesFile = toml::from_str(text)?;
    let sources = file
        .sources
        .into_iter()
        .map(|stored| {
            let id = stored.id.clone();
            GitSource::from_stored(stored, &catalog, guard)
                .map(|source| source.to_stored())
                .with_context(|| format!("Rejected source {}", id))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(toml::to_string_pretty(&SourcesFile { sources })?)
}

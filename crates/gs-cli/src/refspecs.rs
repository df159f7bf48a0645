// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Print the effective ref specs of the configured sources

use crate::config::Config;
use anyhow::Result;
use clap::Args;
use gs_source::StaticTraitCatalog;
use std::fmt::Write;

/// Arguments for the refspecs command
#[derive(Args, Debug, Clone)]
#[command(about = "Print effective ref specs of every configured source")]
pub struct RefspecsArgs {}

impl RefspecsArgs {
    pub async fn run(self, config: &Config) -> Result<()> {
        print!("{}", render(config)?);
        Ok(())
    }
}

/// One block per source: owner/source header, ref specs, then the flat string
///
/// Sources whose traits do not compose are logged and left out.
pub fn render(config: &Config) -> Result<String> {
    let catalog = StaticTraitCatalog::builtin();
    let mut out = String::new();
    for (owner, source) in config.sources(&catalog) {
        let ref_specs = match source.ref_specs(&config.discovery) {
            Ok(ref_specs) => ref_specs,
            Err(e) => {
                tracing::error!(
                    owner = %owner.id,
                    source_id = %source.id(),
                    error = %e,
                    "Skipping source with invalid traits"
                );
                continue;
            }
        };
        writeln!(out, "{}/{}", owner.id, source.id())?;
        for ref_spec in ref_specs {
            writeln!(out, "  {}", ref_spec)?;
        }
        writeln!(out, "  raw: {}", source.raw_ref_specs())?;
    }
    Ok(out)
}

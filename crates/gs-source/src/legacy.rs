// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! One-shot migration of flat legacy source fields into traits
//!
//! Sources created before trait-based configuration stored a fixed set of
//! fields. They are read once, translated into the equivalent trait list and
//! never written again.

use crate::catalog::{descriptors_for, TraitCatalog};
use crate::refspec::{resolve, DEFAULT_REMOTE_NAME};
use crate::source_trait::{RepositoryBrowser, SourceTrait};
use serde::{Deserialize, Serialize};

/// Include pattern of a source without a wildcard filter
pub const DEFAULT_INCLUDES: &str = "*";

/// Exclude pattern of a source without a wildcard filter
pub const DEFAULT_EXCLUDES: &str = "";

/// A legacy checkout extension as it was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyExtension {
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub settings: serde_json::Value,
}

/// Flat fields of a source configured before traits existed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LegacyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_ref_specs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excludes: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore_on_push_notifications: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<RepositoryBrowser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_tool: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<LegacyExtension>,
}

impl LegacyConfig {
    /// True when no legacy field carries a value
    pub fn is_empty(&self) -> bool {
        *self == LegacyConfig::default()
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn needs_wildcard_filter(includes: Option<&str>, excludes: Option<&str>) -> bool {
    includes.is_some_and(|i| i != DEFAULT_INCLUDES) || excludes.is_some_and(|e| e != DEFAULT_EXCLUDES)
}

fn wildcard_trait(includes: Option<&str>, excludes: Option<&str>) -> SourceTrait {
    SourceTrait::wildcard_filter(
        includes.unwrap_or(DEFAULT_INCLUDES),
        excludes.unwrap_or(DEFAULT_EXCLUDES),
    )
}

fn remote_name_trait(remote_name: Option<&str>) -> Option<SourceTrait> {
    match remote_name {
        Some(name) if !is_blank(Some(name)) && name != DEFAULT_REMOTE_NAME => {
            Some(SourceTrait::remote_name(name))
        }
        _ => None,
    }
}

/// Convert legacy extensions through the catalog
///
/// Extensions no descriptor accepts are skipped; a failing conversion is
/// logged and never aborts the migration.
pub fn convert_extensions(
    extensions: &[LegacyExtension],
    catalog: &dyn TraitCatalog,
) -> Vec<SourceTrait> {
    let mut traits = Vec::new();
    'extensions: for extension in extensions {
        for descriptor in descriptors_for(catalog, extension) {
            match descriptor.convert(extension) {
                Ok(Some(converted)) => {
                    traits.push(converted);
                    continue 'extensions;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        extension = %extension.kind,
                        descriptor = descriptor.display_name(),
                        error = %e,
                        "Could not convert extension to a trait"
                    );
                }
            }
        }
        tracing::debug!(
            extension = %extension.kind,
            "Could not convert extension to a trait (option does not apply to git sources)"
        );
    }
    traits
}

/// Translate the full legacy field set into an ordered trait list
///
/// Every step is decided from the original legacy values.
pub fn migrate(legacy: &LegacyConfig, catalog: &dyn TraitCatalog) -> Vec<SourceTrait> {
    let includes = legacy.includes.as_deref();
    let excludes = legacy.excludes.as_deref();
    let remote_name = legacy.remote_name.as_deref();

    let mut traits = vec![SourceTrait::BranchDiscovery];

    if needs_wildcard_filter(includes, excludes) {
        traits.push(wildcard_trait(includes, excludes));
    }

    traits.extend(convert_extensions(&legacy.extensions, catalog));

    traits.extend(remote_name_trait(remote_name));

    if let Some(tool) = legacy.git_tool.as_deref().filter(|t| !t.trim().is_empty()) {
        traits.push(SourceTrait::tool(tool));
    }

    if let Some(browser) = &legacy.browser {
        traits.push(SourceTrait::Browser {
            browser: browser.clone(),
        });
    }

    if legacy.ignore_on_push_notifications {
        traits.push(SourceTrait::IgnorePushNotifications);
    }

    traits.extend(resolve(legacy.raw_ref_specs.as_deref(), remote_name));

    tracing::debug!(
        traits = traits.len(),
        "Migrated legacy source configuration"
    );
    traits
}

/// Translate the narrower field set accepted by the legacy constructor
///
/// Includes and excludes are always supplied here, so any pair other than
/// the defaults produces a wildcard filter.
pub fn migrate_fields(
    remote_name: Option<&str>,
    raw_ref_specs: Option<&str>,
    includes: &str,
    excludes: &str,
    ignore_on_push_notifications: bool,
) -> Vec<SourceTrait> {
    let mut traits = vec![SourceTrait::BranchDiscovery];
    if includes != DEFAULT_INCLUDES || excludes != DEFAULT_EXCLUDES {
        traits.push(SourceTrait::wildcard_filter(includes, excludes));
    }
    traits.extend(remote_name_trait(remote_name));
    if ignore_on_push_notifications {
        traits.push(SourceTrait::IgnorePushNotifications);
    }
    traits.extend(resolve(raw_ref_specs, remote_name));
    traits
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! A git repository tracked as a dynamic set of branches and tags

use crate::catalog::TraitCatalog;
use crate::compose::{as_set_list, compose, find, replace};
use crate::config::DiscoverySettings;
use crate::context::DiscoveryContext;
use crate::error::Result;
use crate::legacy::{convert_extensions, migrate, migrate_fields, LegacyConfig, LegacyExtension};
use crate::refspec::render_raw;
use crate::security::TransportGuard;
use crate::source_trait::{RepositoryBrowser, SourceTrait, TraitKind};
use crate::types::SourceId;
use serde::{Deserialize, Serialize};

/// A source as persisted, possibly still carrying legacy flat fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoredSource {
    pub id: SourceId,
    pub remote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_id: Option<String>,
    /// Absent on configurations written before traits existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<SourceTrait>>,
    #[serde(flatten)]
    pub legacy: LegacyConfig,
}

/// Live source configuration
///
/// The trait list is only ever replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct GitSource {
    id: SourceId,
    remote: String,
    credentials_id: Option<String>,
    traits: Option<Vec<SourceTrait>>,
}

impl GitSource {
    /// Create a source for `remote`, rejecting insecure transports in restricted mode
    pub fn new(id: impl Into<SourceId>, remote: impl Into<String>, guard: &TransportGuard) -> Result<Self> {
        let remote = remote.into();
        guard.check(None, &remote)?;
        Ok(Self {
            id: id.into(),
            remote,
            credentials_id: None,
            traits: Some(Vec::new()),
        })
    }

    /// Build a source from the fields accepted before traits existed
    #[allow(clippy::too_many_arguments)]
    pub fn from_legacy_fields(
        id: impl Into<SourceId>,
        remote: impl Into<String>,
        credentials_id: Option<&str>,
        remote_name: Option<&str>,
        raw_ref_specs: Option<&str>,
        includes: &str,
        excludes: &str,
        ignore_on_push_notifications: bool,
        guard: &TransportGuard,
    ) -> Result<Self> {
        let remote = remote.into();
        guard.check(credentials_id, &remote)?;
        let traits = migrate_fields(
            remote_name,
            raw_ref_specs,
            includes,
            excludes,
            ignore_on_push_notifications,
        );
        Ok(Self {
            id: id.into(),
            remote,
            credentials_id: credentials_id.map(str::to_string),
            traits: Some(as_set_list(traits)),
        })
    }

    /// Load a persisted source, migrating legacy fields when traits are absent
    ///
    /// The legacy snapshot is consumed either way and never kept on the
    /// live source. Insecure transports are rejected in restricted mode.
    pub fn from_stored(
        stored: StoredSource,
        catalog: &dyn TraitCatalog,
        guard: &TransportGuard,
    ) -> Result<Self> {
        let StoredSource {
            id,
            remote,
            credentials_id,
            traits,
            legacy,
        } = stored;
        guard.check(credentials_id.as_deref(), &remote)?;
        let mut source = Self {
            id,
            remote,
            credentials_id,
            traits: traits.map(as_set_list),
        };
        source.migrate_legacy(&legacy, catalog);
        Ok(source)
    }

    /// Run the legacy migration if and only if the trait list is unset
    ///
    /// Returns whether a migration happened.
    pub fn migrate_legacy(&mut self, legacy: &LegacyConfig, catalog: &dyn TraitCatalog) -> bool {
        if self.traits.is_some() {
            if !legacy.is_empty() {
                tracing::debug!(
                    source_id = %self.id,
                    "Ignoring legacy fields of a source that already has traits"
                );
            }
            return false;
        }
        let traits = migrate(legacy, catalog);
        tracing::info!(
            source_id = %self.id,
            traits = traits.len(),
            "Migrated legacy source configuration to traits"
        );
        self.traits = Some(as_set_list(traits));
        true
    }

    /// Persistable form of this source
    pub fn to_stored(&self) -> StoredSource {
        StoredSource {
            id: self.id.clone(),
            remote: self.remote.clone(),
            credentials_id: self.credentials_id.clone(),
            traits: Some(self.traits().to_vec()),
            legacy: LegacyConfig::default(),
        }
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn credentials_id(&self) -> Option<&str> {
        self.credentials_id.as_deref()
    }

    pub fn traits(&self) -> &[SourceTrait] {
        self.traits.as_deref().unwrap_or_default()
    }

    /// Set the credentials, leaving the source unchanged when the transport is rejected
    pub fn set_credentials_id(&mut self, credentials_id: Option<&str>, guard: &TransportGuard) -> Result<()> {
        guard.check(credentials_id, &self.remote)?;
        self.credentials_id = credentials_id.map(str::to_string);
        Ok(())
    }

    /// Replace the whole trait list, keeping one trait per kind
    pub fn set_traits(&mut self, traits: Vec<SourceTrait>) {
        self.traits = Some(as_set_list(traits));
    }

    pub fn set_browser(&mut self, browser: Option<RepositoryBrowser>) {
        let replacement = browser.map(|browser| SourceTrait::Browser { browser });
        self.set_traits(replace(self.traits(), &TraitKind::Browser, replacement));
    }

    /// Set the tool; blank values clear it
    pub fn set_git_tool(&mut self, tool: Option<&str>) {
        let replacement = tool
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(SourceTrait::tool);
        self.set_traits(replace(self.traits(), &TraitKind::Tool, replacement));
    }

    /// Replace every extension trait with conversions of `extensions`
    pub fn set_extensions(&mut self, extensions: &[LegacyExtension], catalog: &dyn TraitCatalog) {
        let mut traits: Vec<SourceTrait> = self
            .traits()
            .iter()
            .filter(|t| !t.is_extension())
            .cloned()
            .collect();
        traits.extend(convert_extensions(extensions, catalog));
        self.set_traits(traits);
    }

    pub fn is_ignore_on_push_notifications(&self) -> bool {
        find(self.traits(), &TraitKind::IgnorePushNotifications).is_some()
    }

    /// Flat ref-spec string as legacy readers expect it
    pub fn raw_ref_specs(&self) -> String {
        render_raw(self.traits())
    }

    /// A fresh discovery context for the current traits
    pub fn context(&self, settings: &DiscoverySettings) -> Result<DiscoveryContext> {
        compose(self.traits(), settings)
    }

    pub fn ref_specs(&self, settings: &DiscoverySettings) -> Result<Vec<String>> {
        Ok(self.context(settings)?.effective_ref_specs())
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Tracked sources and the owners they belong to

use gs_source::{GitSource, SourceId, SourceTrait};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// The item that owns one or more sources and gets re-indexed on changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Owner {
    pub id: String,
    pub display_name: String,
    /// Absolute URL of the owner, used in response headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Users allowed to see this owner; empty means everyone
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub readers: Vec<String>,
}

impl Owner {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            url: None,
            readers: Vec::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_readers<I, S>(mut self, readers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readers = readers.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_visible_to(&self, scope: &ReadScope) -> bool {
        match scope {
            ReadScope::System => true,
            ReadScope::User(user) => self.readers.is_empty() || self.readers.contains(user),
        }
    }
}

/// Identity under which the registry is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadScope {
    System,
    User(String),
}

impl ReadScope {
    /// Read-only scope that sees every owner
    pub fn elevate(&self) -> ReadScope {
        ReadScope::System
    }
}

/// A source together with its owner, as captured by a snapshot
#[derive(Debug, Clone)]
pub struct TrackedSource {
    pub owner: Arc<Owner>,
    pub source: Arc<GitSource>,
}

/// Process-wide set of tracked sources
pub trait SourceRegistry: Send + Sync {
    /// Every source visible in `scope` at the time of the call
    fn snapshot(&self, scope: &ReadScope) -> Vec<TrackedSource>;
}

#[derive(Debug)]
struct OwnerEntry {
    owner: Arc<Owner>,
    sources: Vec<Arc<GitSource>>,
}

/// Registry kept in memory
///
/// Snapshots clone the `Arc`s, so callers iterate without holding the lock
/// while configuration changes go on concurrently.
#[derive(Debug, Default)]
pub struct InMemorySourceRegistry {
    entries: RwLock<Vec<OwnerEntry>>,
}

impl InMemorySourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `source` under `owner`, replacing a source with the same id
    pub fn track(&self, owner: Owner, source: GitSource) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let source = Arc::new(source);
        match entries.iter_mut().find(|entry| entry.owner.id == owner.id) {
            Some(entry) => {
                entry.owner = Arc::new(owner);
                match entry
                    .sources
                    .iter_mut()
                    .find(|existing| existing.id() == source.id())
                {
                    Some(existing) => *existing = source,
                    None => entry.sources.push(source),
                }
            }
            None => entries.push(OwnerEntry {
                owner: Arc::new(owner),
                sources: vec![source],
            }),
        }
    }

    /// Stop tracking every source of an owner
    pub fn untrack_owner(&self, owner_id: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|entry| entry.owner.id != owner_id);
        entries.len() != before
    }

    /// Swap in a new trait list for a source
    ///
    /// Snapshots taken earlier keep the previous source value.
    pub fn replace_traits(&self, source_id: &SourceId, traits: Vec<SourceTrait>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for entry in entries.iter_mut() {
            if let Some(slot) = entry.sources.iter_mut().find(|s| s.id() == source_id) {
                let mut updated = (**slot).clone();
                updated.set_traits(traits);
                *slot = Arc::new(updated);
                return true;
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().map(|entry| entry.sources.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SourceRegistry for InMemorySourceRegistry {
    fn snapshot(&self, scope: &ReadScope) -> Vec<TrackedSource> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .filter(|entry| entry.owner.is_visible_to(scope))
            .flat_map(|entry| {
                entry.sources.iter().map(|source| TrackedSource {
                    owner: Arc::clone(&entry.owner),
                    source: Arc::clone(source),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_source::TransportGuard;

    fn source(id: &str) -> GitSource {
        GitSource::new(id, "https://example.com/org/repo.git", &TransportGuard::permissive()).unwrap()
    }

    #[test]
    fn test_track_replaces_same_source_id() {
        let registry = InMemorySourceRegistry::new();
        registry.track(Owner::new("folder", "Folder"), source("a"));
        registry.track(Owner::new("folder", "Folder renamed"), source("a"));
        registry.track(Owner::new("folder", "Folder renamed"), source("b"));

        let snapshot = registry.snapshot(&ReadScope::System);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 2);
        assert!(snapshot.iter().all(|t| t.owner.display_name == "Folder renamed"));
    }

    #[test]
    fn test_snapshot_respects_readers() {
        let registry = InMemorySourceRegistry::new();
        registry.track(Owner::new("private", "Private").with_readers(["alice"]), source("a"));
        registry.track(Owner::new("public", "Public"), source("b"));

        assert_eq!(registry.snapshot(&ReadScope::User("bob".into())).len(), 1);
        assert_eq!(registry.snapshot(&ReadScope::User("alice".into())).len(), 2);
        assert_eq!(registry.snapshot(&ReadScope::User("bob".into()).elevate()).len(), 2);
    }

    #[test]
    fn test_replace_traits_leaves_old_snapshot_intact() {
        let registry = InMemorySourceRegistry::new();
        registry.track(Owner::new("folder", "Folder"), source("a"));
        let before = registry.snapshot(&ReadScope::System);

        assert!(registry.replace_traits(&SourceId::new("a"), vec![SourceTrait::IgnorePushNotifications]));
        assert!(!registry.replace_traits(&SourceId::new("missing"), Vec::new()));

        assert!(before[0].source.traits().is_empty());
        let after = registry.snapshot(&ReadScope::System);
        assert!(after[0].source.is_ignore_on_push_notifications());
    }

    #[test]
    fn test_untrack_owner() {
        let registry = InMemorySourceRegistry::new();
        registry.track(Owner::new("folder", "Folder"), source("a"));
        assert!(registry.untrack_owner("folder"));
        assert!(!registry.untrack_owner("folder"));
        assert!(registry.is_empty());
    }
}

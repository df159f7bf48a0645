// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests for loading stored sources and migrating legacy fields

use gs_source::{
    DiscoverySettings, GitSource, SourceTrait, StaticTraitCatalog, StoredSource, TraitKind,
    TransportGuard,
    refspec::{render_raw, resolve},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Vec<StoredSource>,
}

fn load(toml_text: &str) -> Vec<GitSource> {
    let catalog = StaticTraitCatalog::builtin();
    let file: SourcesFile = toml::from_str(toml_text).unwrap();
    file.sources
        .into_iter()
        .map(|stored| GitSource::from_stored(stored, &catalog, &TransportGuard::permissive()).unwrap())
        .collect()
}

const LEGACY_SOURCE: &str = r#"
[[sources]]
id = "legacy"
remote = "https://git.example.com/org/repo.git"
remote-name = "upstream"
raw-ref-specs = "+refs/heads/*:refs/remotes/upstream/* +refs/tags/*:refs/tags/*"
includes = "main release/*"
excludes = "release/old"
ignore-on-push-notifications = true
git-tool = "git-2.40"

[[sources.extensions]]
kind = "lfs-pull"

[[sources.extensions]]
kind = "not-a-git-extension"
"#;

#[test]
fn test_legacy_source_migrates_in_fixed_order() {
    let sources = load(LEGACY_SOURCE);
    assert_eq!(sources.len(), 1);

    let kinds: Vec<String> = sources[0].traits().iter().map(|t| t.kind().to_string()).collect();
    assert_eq!(
        kinds,
        vec![
            "branch-discovery",
            "wildcard-filter",
            "extension:lfs-pull",
            "remote-name",
            "tool",
            "ignore-push-notifications",
            "ref-specs",
        ]
    );

    // The default token keeps the placeholder so remote renames still apply
    assert_eq!(
        gs_source::compose::find(sources[0].traits(), &TraitKind::RefSpecs),
        Some(&SourceTrait::ref_specs([
            "+refs/heads/*:refs/remotes/@{remote}/*",
            "+refs/tags/*:refs/tags/*",
        ]))
    );
}

#[test]
fn test_migration_is_idempotent() {
    let catalog = StaticTraitCatalog::builtin();
    let first = load(LEGACY_SOURCE).remove(0);

    // Storing and reloading must not re-run the migration
    let reloaded = GitSource::from_stored(first.to_stored(), &catalog, &TransportGuard::permissive()).unwrap();
    assert_eq!(reloaded.traits(), first.traits());

    let mut again = reloaded.clone();
    let legacy = toml::from_str::<SourcesFile>(LEGACY_SOURCE)
        .unwrap()
        .sources
        .remove(0)
        .legacy;
    assert!(!again.migrate_legacy(&legacy, &catalog));
    assert_eq!(again.traits(), first.traits());
}

#[test]
fn test_stored_traits_win_over_legacy_fields() {
    let sources = load(
        r#"
[[sources]]
id = "modern"
remote = "git@git.example.com:org/repo.git"
remote-name = "ignored"
includes = "ignored/*"

[[sources.traits]]
kind = "branch-discovery"

[[sources.traits]]
kind = "remote-name"
remote-name = "first"

[[sources.traits]]
kind = "remote-name"
remote-name = "second"
"#,
    );

    assert_eq!(
        sources[0].traits(),
        &[SourceTrait::BranchDiscovery, SourceTrait::remote_name("second")]
    );
}

#[test]
fn test_raw_ref_specs_round_trip() {
    let raw = "+refs/heads/*:refs/remotes/upstream/* +refs/pull/*:refs/remotes/upstream/pr/*";
    let resolved = resolve(Some(raw), Some("upstream")).unwrap();
    let traits = vec![SourceTrait::remote_name("upstream"), resolved];
    assert_eq!(render_raw(&traits), raw);
}

#[test]
fn test_default_ref_specs_resolve_to_no_trait() {
    let sources = load(
        r#"
[[sources]]
id = "plain"
remote = "https://git.example.com/org/repo.git"
raw-ref-specs = "+refs/heads/*:refs/remotes/origin/*"
"#,
    );
    assert_eq!(sources[0].traits(), &[SourceTrait::BranchDiscovery]);
    assert_eq!(
        sources[0].ref_specs(&DiscoverySettings::default()).unwrap(),
        vec!["+refs/heads/*:refs/remotes/origin/*".to_string()]
    );
}

#[test]
fn test_remote_rename_rewrites_effective_ref_specs() {
    let mut source = load(LEGACY_SOURCE).remove(0);
    let mut traits = source.traits().to_vec();
    traits.push(SourceTrait::remote_name("mirror"));
    source.set_traits(traits);

    assert_eq!(
        source.ref_specs(&DiscoverySettings::default()).unwrap(),
        vec![
            "+refs/heads/*:refs/remotes/mirror/*".to_string(),
            "+refs/tags/*:refs/tags/*".to_string(),
        ]
    );
    assert_eq!(
        source.raw_ref_specs(),
        "+refs/heads/*:refs/remotes/mirror/* +refs/tags/*:refs/tags/*"
    );
}

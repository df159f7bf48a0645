// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests for routing push notifications to tracked sources

use gs_notify::{
    scheduler, InMemorySourceRegistry, LooseUriMatcher, Owner, PushNotification,
    PushNotificationMatcher, ReadScope, ResponseContributor,
};
use gs_source::{DiscoverySettings, GitSource, Head, Revision, SourceTrait, TransportGuard};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

const REMOTE: &str = "https://example.com/org/repo.git";

struct Fixture {
    registry: Arc<InMemorySourceRegistry>,
    matcher: PushNotificationMatcher,
    requests: UnboundedReceiver<gs_notify::IndexRequest>,
}

fn fixture(sources: Vec<(&str, &str, Vec<SourceTrait>)>) -> Fixture {
    let registry = Arc::new(InMemorySourceRegistry::new());
    for (id, remote, traits) in sources {
        let mut source = GitSource::new(id, remote, &TransportGuard::permissive()).unwrap();
        source.set_traits(traits);
        registry.track(Owner::new("folder", "Folder"), source);
    }
    let (scheduler, requests) = scheduler::channel();
    let matcher = PushNotificationMatcher::new(
        registry.clone(),
        Arc::new(LooseUriMatcher),
        Arc::new(scheduler),
        DiscoverySettings::default(),
    );
    Fixture {
        registry,
        matcher,
        requests,
    }
}

fn push(branches: &[&str]) -> PushNotification {
    PushNotification::new("hook", "https://example.com/org/repo")
        .with_sha1("abc123")
        .with_branches(branches.iter().copied())
}

#[test]
fn test_matching_source_reports_head_and_revision() {
    let f = fixture(vec![("repo", REMOTE, vec![SourceTrait::BranchDiscovery])]);
    let outcome = f.matcher.on_notify_commit(&ReadScope::System, &push(&["main"]));

    assert!(outcome.consumed);
    assert!(outcome.contributors.is_empty());
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].branch, "main");
    assert_eq!(outcome.events[0].origin, "hook");
    assert_eq!(outcome.events[0].uri, "https://example.com/org/repo");

    let expected: BTreeMap<Head, Option<Revision>> = BTreeMap::from([(
        Head::branch("main"),
        Some(Revision::new(Head::branch("main"), "abc123")),
    )]);
    assert_eq!(outcome.events[0].matches.len(), 1);
    assert_eq!(outcome.events[0].matches[0].heads, expected);
}

#[test]
fn test_ignoring_source_does_not_match() {
    let f = fixture(vec![(
        "repo",
        REMOTE,
        vec![SourceTrait::BranchDiscovery, SourceTrait::IgnorePushNotifications],
    )]);
    let outcome = f.matcher.on_notify_commit(&ReadScope::System, &push(&["main"]));

    assert!(!outcome.consumed);
    assert!(outcome.affected_heads().is_empty());
    assert_eq!(
        outcome.contributors,
        vec![ResponseContributor::no_consumer("https://example.com/org/repo")]
    );
}

#[tokio::test]
async fn test_empty_branch_list_schedules_indexing() {
    let mut f = fixture(vec![("repo", REMOTE, vec![SourceTrait::BranchDiscovery])]);
    let outcome = f.matcher.on_notify_commit(
        &ReadScope::User("anonymous".into()),
        &PushNotification::new("hook", "https://example.com/org/repo"),
    );

    assert!(outcome.consumed);
    assert_eq!(outcome.contributors.len(), 1);
    assert_eq!(outcome.contributors[0].header(), Some(("Triggered", "Folder")));
    assert_eq!(outcome.contributors[0].body(), "Scheduled indexing of Folder");

    let request = f.requests.recv().await.unwrap();
    assert_eq!(request.owner.id, "folder");
    assert_eq!(request.source.as_str(), "repo");
    assert_eq!(request.origin, "hook");
    assert!(f.requests.try_recv().is_err());
}

#[test]
fn test_excluded_branch_matches_without_heads() {
    let f = fixture(vec![(
        "repo",
        REMOTE,
        vec![
            SourceTrait::BranchDiscovery,
            SourceTrait::wildcard_filter("*", "release/*"),
        ],
    )]);
    let outcome = f
        .matcher
        .on_notify_commit(&ReadScope::System, &push(&["release/1.0"]));

    assert!(outcome.consumed);
    assert!(outcome.contributors.is_empty());
    assert_eq!(outcome.events[0].matches.len(), 1);
    assert!(outcome.events[0].matches[0].heads.is_empty());
    assert!(outcome.affected_heads().is_empty());
}

#[test]
fn test_malformed_source_remote_is_skipped() {
    let f = fixture(vec![
        ("broken", "https://exa mple.com/org/repo.git", Vec::new()),
        ("ssh", "git@example.com:org/repo.git", Vec::new()),
        ("other", "https://example.com/org/other.git", Vec::new()),
    ]);
    let outcome = f.matcher.on_notify_commit(&ReadScope::System, &push(&["main"]));

    assert!(outcome.consumed);
    let sources: Vec<&str> = outcome.events[0]
        .matches
        .iter()
        .map(|m| m.source.as_str())
        .collect();
    assert_eq!(sources, vec!["ssh"]);
}

#[test]
fn test_several_branches_produce_one_event_each() {
    let f = fixture(vec![(
        "repo",
        REMOTE,
        vec![SourceTrait::regex_filter("main|feature/.*")],
    )]);
    let outcome = f
        .matcher
        .on_notify_commit(&ReadScope::System, &push(&["main", "feature/x", "wip"]));

    assert_eq!(outcome.events.len(), 3);
    let heads: Vec<String> = outcome
        .affected_heads()
        .into_iter()
        .map(|(_, head, revision)| format!("{} {}", head, revision.map(|r| r.hash.as_str()).unwrap_or("-")))
        .collect();
    assert_eq!(heads, vec!["main abc123", "feature/x abc123"]);
}

#[test]
fn test_matching_tolerates_concurrent_reconfiguration() {
    let f = fixture(vec![("repo", REMOTE, Vec::new())]);
    let source_id = gs_source::SourceId::new("repo");

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..200 {
                let traits = if i % 2 == 0 {
                    vec![SourceTrait::IgnorePushNotifications]
                } else {
                    Vec::new()
                };
                f.registry.replace_traits(&source_id, traits);
            }
        });
        scope.spawn(|| {
            for _ in 0..200 {
                let outcome = f.matcher.on_notify_commit(&ReadScope::System, &push(&["main"]));
                assert_eq!(outcome.events.len(), 1);
                assert_eq!(outcome.consumed, outcome.contributors.is_empty());
            }
        });
    });
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Routing of push notifications to the sources tracking the pushed repository
//!
//! A notification either names the branches that changed, in which case one
//! head event per branch is produced and matched against every source, or it
//! names none, in which case every matching source's owner is scheduled for
//! re-indexing. Matching runs over a registry snapshot read with the system
//! scope, so sources the caller cannot see are still considered. Scheduling
//! indexing grants the caller no access to the resulting builds.

use crate::error::Result;
use crate::registry::{Owner, ReadScope, SourceRegistry, TrackedSource};
use crate::response::ResponseContributor;
use crate::scheduler::{IndexRequest, IndexScheduler};
use crate::uri::{RemoteUri, UriMatcher};
use gs_source::{DiscoveryContext, DiscoverySettings, Head, Revision, SourceId};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A commit notification received from a repository host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNotification {
    /// Free-form label of the sender
    pub origin: String,
    pub uri: String,
    pub sha1: Option<String>,
    /// Changed branches; empty when the sender did not enumerate them
    pub branches: Vec<String>,
}

impl PushNotification {
    pub fn new(origin: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            uri: uri.into(),
            sha1: None,
            branches: Vec::new(),
        }
    }

    pub fn with_sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = Some(sha1.into());
        self
    }

    pub fn with_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches = branches.into_iter().map(Into::into).collect();
        self
    }
}

/// A source that matched a head event
///
/// An empty `heads` map means the source matched but its filters excluded
/// the branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMatch {
    pub owner: Arc<Owner>,
    pub source: SourceId,
    /// `None` revision when the notification carried no hash
    pub heads: BTreeMap<Head, Option<Revision>>,
}

/// Result of matching one branch of a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadEventOutcome {
    pub origin: String,
    pub branch: String,
    /// Repository URI as notified
    pub uri: String,
    pub matches: Vec<SourceMatch>,
}

impl HeadEventOutcome {
    pub fn is_consumed(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Everything produced by one notification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub contributors: Vec<ResponseContributor>,
    pub events: Vec<HeadEventOutcome>,
    /// True when at least one source matched
    pub consumed: bool,
}

impl NotifyOutcome {
    /// Affected heads per source, for the build scheduler
    pub fn affected_heads(&self) -> Vec<(&SourceId, &Head, Option<&Revision>)> {
        self.events
            .iter()
            .flat_map(|event| event.matches.iter())
            .flat_map(|m| {
                m.heads
                    .iter()
                    .map(move |(head, revision)| (&m.source, head, revision.as_ref()))
            })
            .collect()
    }
}

/// A tracked source that matched the notified URI, with its composed context
struct Candidate {
    tracked: TrackedSource,
    context: DiscoveryContext,
}

/// Matches push notifications against the tracked sources
pub struct PushNotificationMatcher {
    registry: Arc<dyn SourceRegistry>,
    uri_matcher: Arc<dyn UriMatcher>,
    scheduler: Arc<dyn IndexScheduler>,
    settings: DiscoverySettings,
}

impl PushNotificationMatcher {
    pub fn new(
        registry: Arc<dyn SourceRegistry>,
        uri_matcher: Arc<dyn UriMatcher>,
        scheduler: Arc<dyn IndexScheduler>,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            registry,
            uri_matcher,
            scheduler,
            settings,
        }
    }

    /// Route one notification
    ///
    /// Never fails: sources that cannot be evaluated are skipped, and a
    /// notification nobody consumes yields a single informational message.
    pub fn on_notify_commit(&self, caller: &ReadScope, notification: &PushNotification) -> NotifyOutcome {
        let scope = caller.elevate();
        if scope != *caller {
            tracing::trace!(?caller, "Matching notification with elevated read scope");
        }

        let mut outcome = NotifyOutcome::default();
        let candidates = match RemoteUri::parse(&notification.uri) {
            Ok(notified) => self.candidates(&scope, &notified),
            Err(e) => {
                tracing::debug!(
                    origin = %notification.origin,
                    error = %e,
                    "Notified URI is malformed, no source can match"
                );
                Vec::new()
            }
        };

        if notification.branches.is_empty() {
            self.schedule_indexing(notification, &candidates, &mut outcome);
        } else {
            for branch in &notification.branches {
                let event = head_event(notification, branch, &candidates);
                outcome.consumed |= event.is_consumed();
                outcome.events.push(event);
            }
        }

        if !outcome.consumed {
            tracing::info!(
                uri = %notification.uri,
                origin = %notification.origin,
                "No git consumers for notification"
            );
            outcome
                .contributors
                .push(ResponseContributor::no_consumer(notification.uri.trim()));
        }
        outcome
    }

    /// Sources that do not ignore notifications and loosely match `notified`
    fn candidates(&self, scope: &ReadScope, notified: &RemoteUri) -> Vec<Candidate> {
        self.registry
            .snapshot(scope)
            .into_iter()
            .filter_map(|tracked| match self.evaluate(&tracked, notified) {
                Ok(Some(context)) => Some(Candidate { tracked, context }),
                Ok(None) => None,
                Err(e) => {
                    tracing::debug!(
                        source_id = %tracked.source.id(),
                        owner = %tracked.owner.id,
                        error = %e,
                        "Skipping source while matching notification"
                    );
                    None
                }
            })
            .collect()
    }

    fn evaluate(&self, tracked: &TrackedSource, notified: &RemoteUri) -> Result<Option<DiscoveryContext>> {
        let context = tracked.source.context(&self.settings)?;
        if context.ignores_push_notifications() {
            return Ok(None);
        }
        let remote = RemoteUri::parse(tracked.source.remote())?;
        if self.uri_matcher.loosely_matches(notified, &remote) {
            Ok(Some(context))
        } else {
            Ok(None)
        }
    }

    fn schedule_indexing(
        &self,
        notification: &PushNotification,
        candidates: &[Candidate],
        outcome: &mut NotifyOutcome,
    ) {
        for candidate in candidates {
            let owner = &candidate.tracked.owner;
            tracing::debug!(
                owner = %owner.display_name,
                origin = %notification.origin,
                "Triggering indexing as a result of a push notification"
            );
            self.scheduler.request_indexing(IndexRequest::new(
                Arc::clone(owner),
                candidate.tracked.source.id().clone(),
                notification.origin.clone(),
            ));
            outcome.contributors.push(ResponseContributor::triggered(owner));
            outcome.consumed = true;
        }
    }
}

fn head_event(notification: &PushNotification, branch: &str, candidates: &[Candidate]) -> HeadEventOutcome {
    let matches = candidates
        .iter()
        .map(|candidate| {
            let head = Head::branch(branch);
            let mut heads = BTreeMap::new();
            if candidate.context.is_excluded(&head) {
                tracing::debug!(
                    source_id = %candidate.tracked.source.id(),
                    branch,
                    "Branch excluded by source filters"
                );
            } else {
                let revision = notification
                    .sha1
                    .as_ref()
                    .map(|sha1| Revision::new(head.clone(), sha1.clone()));
                heads.insert(head, revision);
            }
            SourceMatch {
                owner: Arc::clone(&candidate.tracked.owner),
                source: candidate.tracked.source.id().clone(),
                heads,
            }
        })
        .collect();

    HeadEventOutcome {
        origin: notification.origin.clone(),
        branch: branch.to_string(),
        uri: notification.uri.clone(),
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemorySourceRegistry;
    use crate::scheduler::MockIndexScheduler;
    use crate::uri::{LooseUriMatcher, MockUriMatcher};
    use gs_source::{GitSource, SourceTrait, TransportGuard};

    const REMOTE: &str = "https://example.com/org/repo.git";

    fn registry_with(traits: Vec<SourceTrait>) -> Arc<InMemorySourceRegistry> {
        let registry = Arc::new(InMemorySourceRegistry::new());
        let mut source = GitSource::new("repo", REMOTE, &TransportGuard::permissive()).unwrap();
        source.set_traits(traits);
        registry.track(Owner::new("folder", "Folder").with_readers(["alice"]), source);
        registry
    }

    fn matcher(
        registry: Arc<InMemorySourceRegistry>,
        uri_matcher: Arc<dyn UriMatcher>,
        scheduler: MockIndexScheduler,
    ) -> PushNotificationMatcher {
        PushNotificationMatcher::new(
            registry,
            uri_matcher,
            Arc::new(scheduler),
            DiscoverySettings::default(),
        )
    }

    #[test]
    fn test_ignoring_source_skips_uri_comparison() {
        let mut uri_matcher = MockUriMatcher::new();
        uri_matcher.expect_loosely_matches().never();
        let mut scheduler = MockIndexScheduler::new();
        scheduler.expect_request_indexing().never();

        let matcher = matcher(
            registry_with(vec![SourceTrait::IgnorePushNotifications]),
            Arc::new(uri_matcher),
            scheduler,
        );
        let outcome = matcher.on_notify_commit(
            &ReadScope::System,
            &PushNotification::new("hook", "https://example.com/org/repo"),
        );

        assert!(!outcome.consumed);
        assert_eq!(outcome.contributors.len(), 1);
    }

    #[test]
    fn test_empty_branch_list_schedules_each_match_once() {
        let mut scheduler = MockIndexScheduler::new();
        scheduler
            .expect_request_indexing()
            .withf(|request| request.owner.id == "folder" && request.origin == "hook")
            .times(1)
            .return_const(());

        let matcher = matcher(
            registry_with(vec![SourceTrait::BranchDiscovery]),
            Arc::new(LooseUriMatcher),
            scheduler,
        );
        let outcome = matcher.on_notify_commit(
            &ReadScope::User("bob".into()),
            &PushNotification::new("hook", "git@example.com:org/repo.git"),
        );

        assert!(outcome.consumed);
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.contributors, vec![ResponseContributor::triggered(&Owner::new("folder", "Folder"))]);
    }

    #[test]
    fn test_branch_path_reports_unknown_revision_without_hash() {
        let mut scheduler = MockIndexScheduler::new();
        scheduler.expect_request_indexing().never();

        let matcher = matcher(registry_with(Vec::new()), Arc::new(LooseUriMatcher), scheduler);
        let outcome = matcher.on_notify_commit(
            &ReadScope::System,
            &PushNotification::new("hook", "https://example.com/org/repo").with_branches(["main", "dev"]),
        );

        assert!(outcome.consumed);
        assert!(outcome.contributors.is_empty());
        let heads = outcome.affected_heads();
        assert_eq!(heads.len(), 2);
        assert!(heads.iter().all(|(_, _, revision)| revision.is_none()));
        assert_eq!(heads[0].1, &Head::branch("main"));
        assert_eq!(heads[1].1, &Head::branch("dev"));
    }

    #[test]
    fn test_malformed_notified_uri_consumes_nothing() {
        let mut uri_matcher = MockUriMatcher::new();
        uri_matcher.expect_loosely_matches().never();

        let matcher = matcher(
            registry_with(Vec::new()),
            Arc::new(uri_matcher),
            MockIndexScheduler::new(),
        );
        let outcome = matcher.on_notify_commit(
            &ReadScope::System,
            &PushNotification::new("hook", "https://exa mple.com/org/repo").with_branches(["main"]),
        );

        assert!(!outcome.consumed);
        assert_eq!(outcome.events.len(), 1);
        assert!(!outcome.events[0].is_consumed());
        assert_eq!(
            outcome.contributors,
            vec![ResponseContributor::no_consumer("https://exa mple.com/org/repo")]
        );
    }
}

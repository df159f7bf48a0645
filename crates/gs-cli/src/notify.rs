// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Replay a push notification against the configured sources

use crate::config::Config;
use anyhow::Result;
use clap::Args;
use gs_notify::{
    scheduler, IndexRequest, LooseUriMatcher, NotifyOutcome, PushNotification,
    PushNotificationMatcher, ReadScope,
};
use gs_source::StaticTraitCatalog;
use std::fmt::Write;
use std::sync::Arc;

/// Arguments for the notify command
#[derive(Args, Debug, Clone)]
#[command(about = "Match a push notification against the configured sources")]
pub struct NotifyArgs {
    /// Repository URL the notification is about
    #[arg(long)]
    pub url: String,

    /// Changed branch; repeat for several, omit to request indexing
    #[arg(long = "branch")]
    pub branches: Vec<String>,

    /// Commit hash the branches point to
    #[arg(long)]
    pub sha1: Option<String>,

    /// Label of the notification sender
    #[arg(long, default_value = "cli")]
    pub origin: String,
}

impl NotifyArgs {
    pub fn notification(&self) -> PushNotification {
        let notification = PushNotification::new(&self.origin, &self.url)
            .with_branches(self.branches.iter().cloned());
        match &self.sha1 {
            Some(sha1) => notification.with_sha1(sha1),
            None => notification,
        }
    }

    pub async fn run(self, config: &Config) -> Result<()> {
        let (outcome, requests) = self.dispatch(config).await;
        print!("{}", render(&outcome)?);
        for request in requests {
            tracing::info!(
                owner = %request.owner.id,
                source_id = %request.source,
                origin = %request.origin,
                requested_at = %request.requested_at,
                "Indexing requested"
            );
        }
        Ok(())
    }

    /// Run the matcher and collect the indexing requests it issued
    pub async fn dispatch(&self, config: &Config) -> (NotifyOutcome, Vec<IndexRequest>) {
        let registry = Arc::new(config.registry(&StaticTraitCatalog::builtin()));
        let (scheduler, mut receiver) = scheduler::channel();
        let matcher = PushNotificationMatcher::new(
            registry,
            Arc::new(LooseUriMatcher),
            Arc::new(scheduler),
            config.discovery.clone(),
        );

        let outcome = matcher.on_notify_commit(&ReadScope::User("cli".into()), &self.notification());
        // Closes the channel so the drain below terminates
        drop(matcher);

        let mut requests = Vec::new();
        while let Some(request) = receiver.recv().await {
            requests.push(request);
        }
        (outcome, requests)
    }
}

/// Contributors first, then the affected heads per source
pub fn render(outcome: &NotifyOutcome) -> Result<String> {
    let mut out = String::new();
    for contributor in &outcome.contributors {
        writeln!(out, "{}", contributor)?;
    }
    for event in &outcome.events {
        for source_match in &event.matches {
            if source_match.heads.is_empty() {
                writeln!(out, "{} {}: excluded", source_match.source, event.branch)?;
            }
            for (head, revision) in &source_match.heads {
                match revision {
                    Some(revision) => writeln!(out, "{} {}", source_match.source, revision)?,
                    None => writeln!(out, "{} {}@unknown", source_match.source, head)?,
                }
            }
        }
    }
    Ok(out)
}

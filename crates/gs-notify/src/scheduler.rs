// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Hand-off of re-indexing requests

use crate::registry::Owner;
use chrono::{DateTime, Utc};
use gs_source::SourceId;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Request to re-index the owner of a source
#[derive(Debug, Clone)]
pub struct IndexRequest {
    pub owner: Arc<Owner>,
    pub source: SourceId,
    pub origin: String,
    pub requested_at: DateTime<Utc>,
}

impl IndexRequest {
    pub fn new(owner: Arc<Owner>, source: SourceId, origin: impl Into<String>) -> Self {
        Self {
            owner,
            source,
            origin: origin.into(),
            requested_at: Utc::now(),
        }
    }
}

/// Accepts re-indexing requests without reporting their outcome
#[cfg_attr(test, mockall::automock)]
pub trait IndexScheduler: Send + Sync {
    fn request_indexing(&self, request: IndexRequest);
}

/// Scheduler that forwards requests to a channel drained by an indexing task
#[derive(Debug, Clone)]
pub struct ChannelIndexScheduler {
    sender: mpsc::UnboundedSender<IndexRequest>,
}

/// Create a scheduler and the receiver its requests arrive on
pub fn channel() -> (ChannelIndexScheduler, mpsc::UnboundedReceiver<IndexRequest>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelIndexScheduler { sender }, receiver)
}

impl IndexScheduler for ChannelIndexScheduler {
    fn request_indexing(&self, request: IndexRequest) {
        let owner = request.owner.id.clone();
        if self.sender.send(request).is_err() {
            tracing::warn!(owner = %owner, "Indexing receiver is closed, dropping request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_delivers_requests_in_order() {
        let (scheduler, mut receiver) = channel();
        let owner = Arc::new(Owner::new("folder", "Folder"));

        scheduler.request_indexing(IndexRequest::new(owner.clone(), SourceId::new("a"), "hook"));
        scheduler.request_indexing(IndexRequest::new(owner, SourceId::new("b"), "hook"));

        assert_eq!(receiver.recv().await.unwrap().source, SourceId::new("a"));
        assert_eq!(receiver.recv().await.unwrap().source, SourceId::new("b"));
    }

    #[tokio::test]
    async fn test_closed_receiver_is_ignored() {
        let (scheduler, receiver) = channel();
        drop(receiver);
        scheduler.request_indexing(IndexRequest::new(
            Arc::new(Owner::new("folder", "Folder")),
            SourceId::new("a"),
            "hook",
        ));
    }
}

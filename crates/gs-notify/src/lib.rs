// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Push-notification routing for git sources.
//!
//! This crate provides:
//! - A registry of tracked sources and their owners, read through snapshots
//! - Loose equivalence of repository URIs across schemes and `.git` suffixes
//! - Fire-and-forget scheduling of owner re-indexing
//! - The matcher turning a notification into head events and response records

pub mod error;
pub mod matcher;
pub mod registry;
pub mod response;
pub mod scheduler;
pub mod uri;

pub use error::{NotifyError, Result};
pub use matcher::{HeadEventOutcome, NotifyOutcome, PushNotification, PushNotificationMatcher, SourceMatch};
pub use registry::{InMemorySourceRegistry, Owner, ReadScope, SourceRegistry, TrackedSource};
pub use response::ResponseContributor;
pub use scheduler::{ChannelIndexScheduler, IndexRequest, IndexScheduler};
pub use uri::{LooseUriMatcher, RemoteUri, UriMatcher};

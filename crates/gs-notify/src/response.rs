// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Records returned to the caller of a notification

use crate::registry::Owner;
use std::fmt;

/// Name of the header announcing a scheduled indexing
pub const TRIGGERED_HEADER: &str = "Triggered";

/// One piece of the notification response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseContributor {
    /// Indexing of an owner was scheduled
    Triggered {
        /// Header value: the owner URL, else its display name
        header: String,
        owner_display: String,
    },
    /// Informational text only
    Message(String),
}

impl ResponseContributor {
    pub fn triggered(owner: &Owner) -> Self {
        ResponseContributor::Triggered {
            header: owner
                .url
                .clone()
                .unwrap_or_else(|| owner.display_name.clone()),
            owner_display: owner.display_name.clone(),
        }
    }

    pub fn no_consumer(uri: &str) -> Self {
        ResponseContributor::Message(format!(
            "No Git consumers using SCM API plugin for: {}",
            uri
        ))
    }

    /// Header name and value, if this contributor sets one
    pub fn header(&self) -> Option<(&'static str, &str)> {
        match self {
            ResponseContributor::Triggered { header, .. } => Some((TRIGGERED_HEADER, header)),
            ResponseContributor::Message(_) => None,
        }
    }

    pub fn body(&self) -> String {
        match self {
            ResponseContributor::Triggered { owner_display, .. } => {
                format!("Scheduled indexing of {}", owner_display)
            }
            ResponseContributor::Message(text) => text.clone(),
        }
    }
}

impl fmt::Display for ResponseContributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((name, value)) = self.header() {
            writeln!(f, "{}: {}", name, value)?;
        }
        f.write_str(&self.body())
    }
}

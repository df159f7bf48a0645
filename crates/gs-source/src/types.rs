// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Heads, revisions and source identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category a head is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadCategory {
    /// Branches
    Uncategorized,
    Tag,
}

impl HeadCategory {
    /// Categories a git source exposes, in display order
    pub fn all() -> &'static [HeadCategory] {
        &[HeadCategory::Uncategorized, HeadCategory::Tag]
    }
}

/// A named branch or tag reference
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Head {
    pub name: String,
    pub category: HeadCategory,
}

impl Head {
    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: HeadCategory::Uncategorized,
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: HeadCategory::Tag,
        }
    }

    pub fn is_tag(&self) -> bool {
        self.category == HeadCategory::Tag
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A head bound to a specific commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub head: Head,
    pub hash: String,
}

impl Revision {
    pub fn new(head: Head, hash: impl Into<String>) -> Self {
        Self {
            head,
            hash: hash.into(),
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.head, self.hash)
    }
}

/// Identity of a configured source
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

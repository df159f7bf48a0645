// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Repository URIs and loose equivalence between them

use crate::error::{NotifyError, Result};
use std::fmt;

/// A parsed repository location
///
/// Accepts URLs (`https://host/org/repo.git`, `ssh://git@host:22/org/repo`),
/// scp-like addresses (`git@host:org/repo.git`) and local paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUri {
    raw: String,
    scheme: String,
    host: Option<String>,
    path: String,
}

fn invalid(raw: &str, reason: impl Into<String>) -> NotifyError {
    NotifyError::InvalidUri {
        uri: raw.to_string(),
        reason: reason.into(),
    }
}

impl RemoteUri {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid(raw, "empty URI"));
        }

        if trimmed.contains("://") {
            let url = url::Url::parse(trimmed).map_err(|e| invalid(raw, e.to_string()))?;
            return Ok(Self {
                raw: trimmed.to_string(),
                scheme: url.scheme().to_string(),
                host: url.host_str().map(str::to_ascii_lowercase),
                path: url.path().to_string(),
            });
        }

        if let Some((authority, path)) = trimmed.split_once(':') {
            if !authority.is_empty() && !authority.contains('/') {
                let host = authority
                    .rsplit_once('@')
                    .map_or(authority, |(_, host)| host);
                if host.is_empty() || host.chars().any(char::is_whitespace) {
                    return Err(invalid(raw, "missing or malformed host"));
                }
                return Ok(Self {
                    raw: trimmed.to_string(),
                    scheme: "ssh".to_string(),
                    host: Some(host.to_ascii_lowercase()),
                    path: path.to_string(),
                });
            }
        }

        Ok(Self {
            raw: trimmed.to_string(),
            scheme: "file".to_string(),
            host: None,
            path: trimmed.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Lower-cased host, absent for local paths
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path without surrounding slashes and without a `.git` suffix
    pub fn normalized_path(&self) -> &str {
        let path = self.path.trim_matches('/');
        path.strip_suffix(".git")
            .unwrap_or(path)
            .trim_end_matches('/')
    }
}

impl fmt::Display for RemoteUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decides whether two repository URIs name the same repository
///
/// Implementations must be deterministic and symmetric.
#[cfg_attr(test, mockall::automock)]
pub trait UriMatcher: Send + Sync {
    fn loosely_matches(&self, a: &RemoteUri, b: &RemoteUri) -> bool;
}

/// Host and path equivalence
///
/// Hosts compare case-insensitively and paths compare after normalization;
/// scheme, port and user information are ignored so that the https and ssh
/// forms of one repository match.
#[derive(Debug, Clone, Copy, Default)]
pub struct LooseUriMatcher;

impl UriMatcher for LooseUriMatcher {
    fn loosely_matches(&self, a: &RemoteUri, b: &RemoteUri) -> bool {
        a.host() == b.host() && a.normalized_path() == b.normalized_path()
    }
}

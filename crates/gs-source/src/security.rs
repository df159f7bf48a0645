// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Transport-security checks for remotes and credentials

use crate::config::{ComplianceMode, DiscoverySettings};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Decides whether credentials may be sent to a remote
pub trait TransportPolicy: Send + Sync {
    fn is_transport_secure(&self, credentials_id: Option<&str>, remote: &str) -> bool;
}

/// Rejects credentials over plain `http://`
#[derive(Debug, Clone, Copy, Default)]
pub struct CompliantTlsPolicy;

impl TransportPolicy for CompliantTlsPolicy {
    fn is_transport_secure(&self, credentials_id: Option<&str>, remote: &str) -> bool {
        let has_credentials = credentials_id.is_some_and(|id| !id.trim().is_empty());
        if !has_credentials {
            return true;
        }
        match url::Url::parse(remote.trim()) {
            Ok(parsed) => parsed.scheme() != "http",
            // scp-like and local paths carry no http transport
            Err(_) => true,
        }
    }
}

/// Applies the transport policy when compliance mode is restricted
#[derive(Clone)]
pub struct TransportGuard {
    mode: ComplianceMode,
    policy: Arc<dyn TransportPolicy>,
}

impl TransportGuard {
    pub fn new(mode: ComplianceMode, policy: Arc<dyn TransportPolicy>) -> Self {
        Self { mode, policy }
    }

    pub fn from_settings(settings: &DiscoverySettings) -> Self {
        Self::new(settings.compliance_mode, Arc::new(CompliantTlsPolicy))
    }

    /// Guard that never consults the policy
    pub fn permissive() -> Self {
        Self::new(ComplianceMode::Standard, Arc::new(CompliantTlsPolicy))
    }

    pub fn is_secure(&self, credentials_id: Option<&str>, remote: &str) -> bool {
        self.mode == ComplianceMode::Standard
            || self.policy.is_transport_secure(credentials_id, remote)
    }

    pub fn check(&self, credentials_id: Option<&str>, remote: &str) -> Result<()> {
        if self.is_secure(credentials_id, remote) {
            return Ok(());
        }
        tracing::error!(
            remote,
            "Rejected remote: credentials require an encrypted transport in restricted mode"
        );
        Err(Error::InsecureTransport {
            remote: remote.to_string(),
        })
    }
}

impl std::fmt::Debug for TransportGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportGuard").field("mode", &self.mode).finish()
    }
}

/// Outcome of a configuration form check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCheck {
    Ok,
    Warning(String),
    Error(String),
}

/// Credentials that can be used against a remote
#[cfg_attr(test, mockall::automock)]
pub trait CredentialLookup: Send + Sync {
    fn credentials_for(&self, remote: &str) -> Vec<String>;
}

/// Check a remote entered in a configuration form
pub fn check_remote(guard: &TransportGuard, credentials_id: Option<&str>, remote: &str) -> FormCheck {
    if guard.is_secure(credentials_id, remote) {
        FormCheck::Ok
    } else {
        FormCheck::Error(
            "Credentials require an encrypted transport; use https:// or ssh".to_string(),
        )
    }
}

/// Check a credentials id entered in a configuration form
///
/// Blank values and blank remotes cannot be checked and pass.
pub fn check_credentials_id(
    lookup: &dyn CredentialLookup,
    remote: &str,
    credentials_id: &str,
) -> FormCheck {
    let credentials_id = credentials_id.trim();
    let remote = remote.trim();
    if credentials_id.is_empty() || remote.is_empty() {
        return FormCheck::Ok;
    }
    if lookup
        .credentials_for(remote)
        .iter()
        .any(|id| id == credentials_id)
    {
        FormCheck::Ok
    } else {
        FormCheck::Warning(format!(
            "Cannot find any credentials with id {}",
            credentials_id
        ))
    }
}

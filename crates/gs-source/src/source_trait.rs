// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Behavioural traits of a git source
//!
//! A source's discovery behaviour is not hard-coded. It is assembled from an
//! ordered list of [`SourceTrait`] values, each of which decorates a fresh
//! [`DiscoveryContext`]. The composer only ever calls
//! [`SourceTrait::decorate`]; this module is the single place that knows
//! what each variant contributes.

use crate::context::{DiscoveryContext, Prefilter};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository browser used to render links to commits and files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryBrowser {
    /// Browser flavour, e.g. `github`, `gitlab`, `gitweb`
    pub kind: String,
    pub url: String,
}

/// A legacy extension converted into a trait without loss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionTrait {
    pub name: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub settings: serde_json::Value,
}

/// One pluggable contribution to discovery and notification behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceTrait {
    BranchDiscovery,
    TagDiscovery,
    WildcardFilter {
        includes: String,
        #[serde(default)]
        excludes: String,
    },
    RegexFilter {
        regex: String,
    },
    #[serde(rename_all = "kebab-case")]
    RemoteName {
        remote_name: String,
    },
    RefSpecs {
        templates: Vec<String>,
    },
    IgnorePushNotifications,
    Browser {
        browser: RepositoryBrowser,
    },
    Tool {
        tool: String,
    },
    Extension(ExtensionTrait),
}

/// Identity of a trait variant; a trait list holds at most one trait per kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraitKind {
    BranchDiscovery,
    TagDiscovery,
    WildcardFilter,
    RegexFilter,
    RemoteName,
    RefSpecs,
    IgnorePushNotifications,
    Browser,
    Tool,
    /// Extension traits are distinguished by extension name
    Extension(String),
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraitKind::BranchDiscovery => f.write_str("branch-discovery"),
            TraitKind::TagDiscovery => f.write_str("tag-discovery"),
            TraitKind::WildcardFilter => f.write_str("wildcard-filter"),
            TraitKind::RegexFilter => f.write_str("regex-filter"),
            TraitKind::RemoteName => f.write_str("remote-name"),
            TraitKind::RefSpecs => f.write_str("ref-specs"),
            TraitKind::IgnorePushNotifications => f.write_str("ignore-push-notifications"),
            TraitKind::Browser => f.write_str("browser"),
            TraitKind::Tool => f.write_str("tool"),
            TraitKind::Extension(name) => write!(f, "extension:{}", name),
        }
    }
}

impl SourceTrait {
    pub fn wildcard_filter(includes: impl Into<String>, excludes: impl Into<String>) -> Self {
        SourceTrait::WildcardFilter {
            includes: includes.into(),
            excludes: excludes.into(),
        }
    }

    pub fn regex_filter(regex: impl Into<String>) -> Self {
        SourceTrait::RegexFilter {
            regex: regex.into(),
        }
    }

    pub fn remote_name(remote_name: impl Into<String>) -> Self {
        SourceTrait::RemoteName {
            remote_name: remote_name.into(),
        }
    }

    pub fn ref_specs<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SourceTrait::RefSpecs {
            templates: templates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tool(tool: impl Into<String>) -> Self {
        SourceTrait::Tool { tool: tool.into() }
    }

    pub fn browser(kind: impl Into<String>, url: impl Into<String>) -> Self {
        SourceTrait::Browser {
            browser: RepositoryBrowser {
                kind: kind.into(),
                url: url.into(),
            },
        }
    }

    pub fn kind(&self) -> TraitKind {
        match self {
            SourceTrait::BranchDiscovery => TraitKind::BranchDiscovery,
            SourceTrait::TagDiscovery => TraitKind::TagDiscovery,
            SourceTrait::WildcardFilter { .. } => TraitKind::WildcardFilter,
            SourceTrait::RegexFilter { .. } => TraitKind::RegexFilter,
            SourceTrait::RemoteName { .. } => TraitKind::RemoteName,
            SourceTrait::RefSpecs { .. } => TraitKind::RefSpecs,
            SourceTrait::IgnorePushNotifications => TraitKind::IgnorePushNotifications,
            SourceTrait::Browser { .. } => TraitKind::Browser,
            SourceTrait::Tool { .. } => TraitKind::Tool,
            SourceTrait::Extension(ext) => TraitKind::Extension(ext.name.clone()),
        }
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, SourceTrait::Extension(_))
    }

    /// Contribute this trait to a discovery context
    ///
    /// Fails only when a filter pattern does not compile.
    pub fn decorate(&self, ctx: &mut DiscoveryContext) -> Result<()> {
        match self {
            SourceTrait::BranchDiscovery => ctx.want_branches(),
            SourceTrait::TagDiscovery => ctx.want_tags(),
            SourceTrait::WildcardFilter { includes, excludes } => {
                ctx.add_prefilter(Prefilter::wildcard(includes, excludes)?);
            }
            SourceTrait::RegexFilter { regex } => {
                ctx.add_prefilter(Prefilter::regex(regex)?);
            }
            SourceTrait::RemoteName { remote_name } => ctx.set_remote_name(remote_name),
            SourceTrait::RefSpecs { templates } => {
                for template in templates {
                    ctx.add_ref_spec_template(template);
                }
            }
            SourceTrait::IgnorePushNotifications => ctx.set_ignore_on_push_notifications(),
            SourceTrait::Browser { browser } => ctx.set_browser(browser.clone()),
            SourceTrait::Tool { tool } => ctx.set_tool(tool),
            SourceTrait::Extension(ext) => ctx.add_extension(ext.clone()),
        }
        Ok(())
    }
}

/// Traits a newly created source starts with
pub fn default_traits() -> Vec<SourceTrait> {
    vec![SourceTrait::BranchDiscovery]
}

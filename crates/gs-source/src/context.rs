// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Transient discovery context built by applying a source's traits
//!
//! A context is never persisted. It is rebuilt from the current trait list on
//! every discovery or notification so that configuration changes take effect
//! immediately.

use crate::config::DiscoverySettings;
use crate::error::{Error, Result};
use crate::refspec::{substitute, DEFAULT_REMOTE_NAME, REF_SPEC_DEFAULT};
use crate::source_trait::{ExtensionTrait, RepositoryBrowser};
use crate::types::Head;
use regex::Regex;

/// Predicate excluding candidate heads from discovery
#[derive(Debug, Clone)]
pub enum Prefilter {
    /// Space separated wildcard lists; `*` matches any run of characters
    Wildcard {
        includes: Regex,
        excludes: Option<Regex>,
    },
    /// The head name must match the whole expression
    Regex(Regex),
}

impl Prefilter {
    pub fn wildcard(includes: &str, excludes: &str) -> Result<Self> {
        let excludes = if excludes.trim().is_empty() {
            None
        } else {
            Some(compile_anchored(excludes, &wildcard_pattern(excludes))?)
        };
        Ok(Prefilter::Wildcard {
            includes: compile_anchored(includes, &wildcard_pattern(includes))?,
            excludes,
        })
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Prefilter::Regex(compile_anchored(pattern, pattern)?))
    }

    pub fn is_excluded(&self, head: &Head) -> bool {
        match self {
            Prefilter::Wildcard { includes, excludes } => {
                !includes.is_match(&head.name)
                    || excludes.as_ref().is_some_and(|re| re.is_match(&head.name))
            }
            Prefilter::Regex(re) => !re.is_match(&head.name),
        }
    }
}

/// Translate a space separated wildcard list into a regex alternation
fn wildcard_pattern(wildcards: &str) -> String {
    wildcards
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*")
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn compile_anchored(original: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| Error::InvalidPattern {
        pattern: original.to_string(),
        source,
    })
}

/// Accumulator that traits write into
#[derive(Debug, Clone, Default)]
pub struct DiscoveryContext {
    ref_spec_templates: Vec<String>,
    prefilters: Vec<Prefilter>,
    ignore_on_push_notifications: bool,
    remote_name: Option<String>,
    browser: Option<RepositoryBrowser>,
    tool: Option<String>,
    wants_branches: bool,
    wants_tags: bool,
    extensions: Vec<ExtensionTrait>,
    ignore_tag_discovery_trait: bool,
}

impl DiscoveryContext {
    pub fn new(settings: &DiscoverySettings) -> Self {
        Self {
            ignore_tag_discovery_trait: settings.ignore_tag_discovery_trait,
            ..Self::default()
        }
    }

    pub fn want_branches(&mut self) {
        self.wants_branches = true;
    }

    pub fn want_tags(&mut self) {
        self.wants_tags = true;
    }

    pub fn add_prefilter(&mut self, prefilter: Prefilter) {
        self.prefilters.push(prefilter);
    }

    /// Add a ref-spec template; identical templates are kept once
    pub fn add_ref_spec_template(&mut self, template: &str) {
        if !self.ref_spec_templates.iter().any(|t| t == template) {
            self.ref_spec_templates.push(template.to_string());
        }
    }

    pub fn set_remote_name(&mut self, remote_name: &str) {
        self.remote_name = Some(remote_name.to_string());
    }

    pub fn set_ignore_on_push_notifications(&mut self) {
        self.ignore_on_push_notifications = true;
    }

    pub fn set_browser(&mut self, browser: RepositoryBrowser) {
        self.browser = Some(browser);
    }

    pub fn set_tool(&mut self, tool: &str) {
        self.tool = Some(tool.to_string());
    }

    pub fn add_extension(&mut self, extension: ExtensionTrait) {
        self.extensions.push(extension);
    }

    /// Remote name override, else the system default
    pub fn remote_name(&self) -> &str {
        self.remote_name.as_deref().unwrap_or(DEFAULT_REMOTE_NAME)
    }

    pub fn ref_spec_templates(&self) -> &[String] {
        &self.ref_spec_templates
    }

    /// Ref specs with the remote name substituted, in contribution order
    ///
    /// Without any contributed template the default branch mapping applies.
    pub fn effective_ref_specs(&self) -> Vec<String> {
        let remote = self.remote_name();
        if self.ref_spec_templates.is_empty() {
            return vec![substitute(REF_SPEC_DEFAULT, remote)];
        }
        self.ref_spec_templates
            .iter()
            .map(|template| substitute(template, remote))
            .collect()
    }

    pub fn ignores_push_notifications(&self) -> bool {
        self.ignore_on_push_notifications
    }

    pub fn prefilters(&self) -> &[Prefilter] {
        &self.prefilters
    }

    /// A head is admitted only if no prefilter excludes it
    pub fn is_excluded(&self, head: &Head) -> bool {
        self.prefilters.iter().any(|filter| filter.is_excluded(head))
    }

    pub fn browser(&self) -> Option<&RepositoryBrowser> {
        self.browser.as_ref()
    }

    pub fn tool(&self) -> Option<&str> {
        self.tool.as_deref()
    }

    pub fn wants_branches(&self) -> bool {
        self.wants_branches
    }

    /// Tags are wanted when a tag discovery trait was applied, or always when
    /// the compatibility switch is on
    pub fn wants_tags(&self) -> bool {
        self.wants_tags || self.ignore_tag_discovery_trait
    }

    pub fn extensions(&self) -> &[ExtensionTrait] {
        &self.extensions
    }
}

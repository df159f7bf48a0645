// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Ref-spec templates and the flat legacy ref-spec string
//!
//! Ref specs are opaque template text. The only recognized structure is the
//! remote-name placeholder, which is substituted with the effective remote
//! name when the context is read.

use crate::compose::find;
use crate::source_trait::{SourceTrait, TraitKind};

/// Remote name used when no remote-name trait is configured
pub const DEFAULT_REMOTE_NAME: &str = "origin";

/// Placeholder replaced with the effective remote name
pub const REF_SPEC_REMOTE_NAME_PLACEHOLDER: &str = "@{remote}";

/// Template fetching every branch into the remote's namespace
pub const REF_SPEC_DEFAULT: &str = "+refs/heads/*:refs/remotes/@{remote}/*";

/// Replace every placeholder occurrence with `remote_name`
pub fn substitute(template: &str, remote_name: &str) -> String {
    template.replace(REF_SPEC_REMOTE_NAME_PLACEHOLDER, remote_name)
}

/// Canonical default ref specs for a legacy configuration
fn canonical_defaults(remote_name: Option<&str>) -> Vec<String> {
    let mut defaults = vec![substitute(REF_SPEC_DEFAULT, DEFAULT_REMOTE_NAME)];
    if let Some(remote) = remote_name {
        let named = substitute(REF_SPEC_DEFAULT, remote);
        if !defaults.contains(&named) {
            defaults.push(named);
        }
    }
    defaults
}

/// Turn a legacy space separated ref-spec string into a ref-specs trait
///
/// Returns `None` when the whole input is one of the canonical defaults (the
/// defaults apply without configuration) or when no non-blank token remains.
/// Tokens equal to a canonical default become the placeholder template so
/// that later remote-name changes still apply.
pub fn resolve(raw_ref_specs: Option<&str>, remote_name: Option<&str>) -> Option<SourceTrait> {
    let raw = raw_ref_specs?;
    let defaults = canonical_defaults(remote_name);
    if defaults.iter().any(|d| d == raw.trim()) {
        return None;
    }

    let templates: Vec<String> = raw
        .split(' ')
        .filter(|token| !token.trim().is_empty())
        .map(|token| {
            if defaults.iter().any(|d| d == token) {
                REF_SPEC_DEFAULT.to_string()
            } else {
                token.to_string()
            }
        })
        .collect();

    if templates.is_empty() {
        None
    } else {
        Some(SourceTrait::RefSpecs { templates })
    }
}

/// Render the flat legacy ref-spec string for a trait list
///
/// Uses the remote-name trait (else the default remote) and the first
/// ref-specs trait; without one the default template is rendered.
pub fn render_raw(traits: &[SourceTrait]) -> String {
    let remote_name = match find(traits, &TraitKind::RemoteName) {
        Some(SourceTrait::RemoteName { remote_name }) => remote_name.as_str(),
        _ => DEFAULT_REMOTE_NAME,
    };

    match find(traits, &TraitKind::RefSpecs) {
        Some(SourceTrait::RefSpecs { templates }) => templates
            .iter()
            .map(|template| substitute(template, remote_name))
            .collect::<Vec<_>>()
            .join(" "),
        _ => substitute(REF_SPEC_DEFAULT, remote_name),
    }
}

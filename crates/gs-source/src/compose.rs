// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Trait composition: applying trait lists and answering point questions

use crate::config::DiscoverySettings;
use crate::context::DiscoveryContext;
use crate::error::Result;
use crate::source_trait::{SourceTrait, TraitKind};

/// Apply traits to a context strictly in list order
pub fn apply(traits: &[SourceTrait], ctx: &mut DiscoveryContext) -> Result<()> {
    for source_trait in traits {
        source_trait.decorate(ctx)?;
    }
    Ok(())
}

/// Build a fresh context from a snapshot of `traits`
///
/// The list is copied first so that a concurrent edit of the owning
/// configuration cannot be observed halfway through.
pub fn compose(traits: &[SourceTrait], settings: &DiscoverySettings) -> Result<DiscoveryContext> {
    let snapshot = traits.to_vec();
    let mut ctx = DiscoveryContext::new(settings);
    apply(&snapshot, &mut ctx)?;
    Ok(ctx)
}

/// First trait of the requested kind
pub fn find<'a>(traits: &'a [SourceTrait], kind: &TraitKind) -> Option<&'a SourceTrait> {
    traits.iter().find(|t| t.kind() == *kind)
}

/// Drop every trait of `kind`, then append `replacement` if given
pub fn replace(
    traits: &[SourceTrait],
    kind: &TraitKind,
    replacement: Option<SourceTrait>,
) -> Vec<SourceTrait> {
    let mut result: Vec<SourceTrait> = traits.iter().filter(|t| t.kind() != *kind).cloned().collect();
    result.extend(replacement);
    result
}

/// Enforce one trait per kind
///
/// A later trait of a kind already present replaces the earlier instance,
/// keeping the position of the first occurrence.
pub fn as_set_list(traits: Vec<SourceTrait>) -> Vec<SourceTrait> {
    let mut result: Vec<SourceTrait> = Vec::with_capacity(traits.len());
    for source_trait in traits {
        let kind = source_trait.kind();
        match result.iter_mut().find(|existing| existing.kind() == kind) {
            Some(existing) => *existing = source_trait,
            None => result.push(source_trait),
        }
    }
    result
}

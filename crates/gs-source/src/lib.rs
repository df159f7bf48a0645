// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Trait-composed configuration of git sources.
//!
//! This crate provides:
//! - Source traits and the transient discovery context they decorate
//! - Ordered trait composition with one-trait-per-kind lists
//! - Ref-spec template resolution and rendering around `@{remote}`
//! - One-shot migration of flat legacy fields into traits
//! - Transport-security checks applied in restricted compliance mode

pub mod catalog;
pub mod compose;
pub mod config;
pub mod context;
pub mod error;
pub mod legacy;
pub mod refspec;
pub mod security;
pub mod source;
pub mod source_trait;
pub mod types;

/// Re-export key types for convenience
pub use catalog::{StaticTraitCatalog, TraitCatalog, TraitDescriptor};
pub use compose::{as_set_list, compose};
pub use config::{ComplianceMode, DiscoverySettings};
pub use context::DiscoveryContext;
pub use error::{Error, Result};
pub use legacy::{LegacyConfig, LegacyExtension};
pub use security::{TransportGuard, TransportPolicy};
pub use source::{GitSource, StoredSource};
pub use source_trait::{default_traits, SourceTrait, TraitKind};
pub use types::{Head, HeadCategory, Revision, SourceId};

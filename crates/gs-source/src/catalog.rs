// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Catalog of trait descriptors able to convert legacy extensions

use crate::error::Result;
use crate::legacy::LegacyExtension;
use crate::source_trait::{ExtensionTrait, SourceTrait};
use std::sync::Arc;

/// Grouping used when listing descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DescriptorCategory {
    Discovery,
    Selection,
    Additional,
}

/// Describes one trait flavour and how to build it from a legacy extension
pub trait TraitDescriptor: Send + Sync {
    /// Legacy extension kind this descriptor understands
    fn extension_kind(&self) -> &str;

    fn display_name(&self) -> &str;

    fn category(&self) -> DescriptorCategory;

    /// Convert `extension` into a trait
    ///
    /// `Ok(None)` means the descriptor declines this particular instance; an
    /// error means the conversion is unsupported.
    fn convert(&self, extension: &LegacyExtension) -> Result<Option<SourceTrait>>;
}

/// Source of known trait descriptors
#[cfg_attr(test, mockall::automock)]
pub trait TraitCatalog: Send + Sync {
    fn descriptors(&self) -> Vec<Arc<dyn TraitDescriptor>>;
}

/// Descriptors able to handle `extension`, in catalog order
pub fn descriptors_for(
    catalog: &dyn TraitCatalog,
    extension: &LegacyExtension,
) -> Vec<Arc<dyn TraitDescriptor>> {
    catalog
        .descriptors()
        .into_iter()
        .filter(|d| d.extension_kind() == extension.kind)
        .collect()
}

/// Descriptor groups for listing: "Within repository" then "Additional"
pub fn descriptors_by_category(
    catalog: &dyn TraitCatalog,
) -> Vec<(&'static str, Vec<Arc<dyn TraitDescriptor>>)> {
    let (within, additional): (Vec<_>, Vec<_>) = catalog
        .descriptors()
        .into_iter()
        .partition(|d| d.category() != DescriptorCategory::Additional);

    [("Within repository", within), ("Additional", additional)]
        .into_iter()
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Converts a named legacy extension into a generic extension trait verbatim
#[derive(Debug, Clone)]
pub struct ExtensionTraitDescriptor {
    kind: String,
    display_name: String,
    category: DescriptorCategory,
}

impl ExtensionTraitDescriptor {
    pub fn new(kind: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            display_name: display_name.into(),
            category: DescriptorCategory::Additional,
        }
    }

    pub fn with_category(mut self, category: DescriptorCategory) -> Self {
        self.category = category;
        self
    }
}

impl TraitDescriptor for ExtensionTraitDescriptor {
    fn extension_kind(&self) -> &str {
        &self.kind
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn category(&self) -> DescriptorCategory {
        self.category
    }

    fn convert(&self, extension: &LegacyExtension) -> Result<Option<SourceTrait>> {
        if extension.kind != self.kind {
            return Ok(None);
        }
        Ok(Some(SourceTrait::Extension(ExtensionTrait {
            name: extension.kind.clone(),
            settings: extension.settings.clone(),
        })))
    }
}

/// Fixed list of descriptors
#[derive(Default, Clone)]
pub struct StaticTraitCatalog {
    descriptors: Vec<Arc<dyn TraitDescriptor>>,
}

impl StaticTraitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptor(mut self, descriptor: impl TraitDescriptor + 'static) -> Self {
        self.descriptors.push(Arc::new(descriptor));
        self
    }

    /// Catalog of the extensions a git source knows how to carry over
    pub fn builtin() -> Self {
        Self::new()
            .with_descriptor(ExtensionTraitDescriptor::new(
                "clean-before-checkout",
                "Clean before checkout",
            ))
            .with_descriptor(ExtensionTraitDescriptor::new(
                "clean-after-checkout",
                "Clean after checkout",
            ))
            .with_descriptor(ExtensionTraitDescriptor::new(
                "submodule-option",
                "Advanced sub-modules behaviours",
            ))
            .with_descriptor(ExtensionTraitDescriptor::new(
                "local-branch",
                "Check out to matching local branch",
            ))
            .with_descriptor(ExtensionTraitDescriptor::new(
                "clone-option",
                "Advanced clone behaviours",
            ))
            .with_descriptor(ExtensionTraitDescriptor::new("lfs-pull", "Git LFS pull after checkout"))
            .with_descriptor(ExtensionTraitDescriptor::new(
                "sparse-checkout",
                "Sparse checkout paths",
            ))
            .with_descriptor(ExtensionTraitDescriptor::new("user-identity", "Custom user name/e-mail address"))
    }
}

impl TraitCatalog for StaticTraitCatalog {
    fn descriptors(&self) -> Vec<Arc<dyn TraitDescriptor>> {
        self.descriptors.clone()
    }
}

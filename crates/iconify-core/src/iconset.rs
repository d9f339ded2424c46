//! Icon set document types.
//!
//! An icon set bundles many icons sharing a prefix, optional root-level
//! defaults and aliases that reference other icons in the same set.

use indexmap::IndexMap;

use crate::icon::{IconProps, PartialIcon};

/// An alias: a named reference to another icon with optional overrides.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AliasDefinition {
    pub parent: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub props: IconProps,
}

impl AliasDefinition {
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            props: IconProps::default(),
        }
    }

    #[must_use]
    pub fn with_props(mut self, props: IconProps) -> Self {
        self.props = props;
        self
    }
}

/// Descriptive metadata of an icon set.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IconSetInfo {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    /// Whether icons carry their own colors.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub palette: Option<bool>,
}

/// An icon set document.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IconSet {
    pub prefix: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub provider: Option<String>,
    pub icons: IndexMap<String, PartialIcon>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "IndexMap::is_empty"))]
    pub aliases: IndexMap<String, AliasDefinition>,
    /// Names the API reported as unknown.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub not_found: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, rename = "lastModified", skip_serializing_if = "Option::is_none")
    )]
    pub last_modified: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub info: Option<IconSetInfo>,
    /// Root-level defaults shared by every icon.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub defaults: IconProps,
}

impl IconSet {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_icon(mut self, name: impl Into<String>, icon: PartialIcon) -> Self {
        self.icons.insert(name.into(), icon);
        self
    }

    #[must_use]
    pub fn with_alias(mut self, name: impl Into<String>, alias: AliasDefinition) -> Self {
        self.aliases.insert(name.into(), alias);
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: IconProps) -> Self {
        self.defaults = defaults;
        self
    }

    /// Whether `name` is an icon or alias in this set.
    pub fn contains(&self, name: &str) -> bool {
        self.icons.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Total number of icons and aliases.
    pub fn len(&self) -> usize {
        self.icons.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty() && self.aliases.is_empty()
    }
}

//! Icons of one provider and prefix.

use std::collections::HashSet;

use indexmap::IndexMap;

use iconify_core::{match_icon_name, normalize, IconData, IconSet, PartialIcon};
use iconify_parser::{parse_icon_set, ParseReport};

/// Icons of one provider and prefix.
///
/// Once resolved, a name is either in the icon map or in the missing set.
/// Pending names are neither.
#[derive(Debug, Clone, Default)]
pub struct IconStorage {
    provider: String,
    prefix: String,
    icons: IndexMap<String, IconData>,
    missing: HashSet<String>,
    pending: HashSet<String>,
    last_modified: Option<u64>,
}

impl IconStorage {
    pub fn new(provider: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Store a normalized icon.
    pub fn insert(&mut self, name: &str, icon: IconData) {
        self.missing.remove(name);
        self.pending.remove(name);
        self.icons.insert(name.to_string(), icon);
    }

    /// Normalize and store an icon. Returns `false` if it has no body.
    pub fn add_icon(&mut self, name: &str, partial: &PartialIcon) -> bool {
        match normalize(partial) {
            Some(icon) => {
                self.insert(name, icon);
                true
            }
            None => false,
        }
    }

    /// Record that `name` does not exist.
    pub fn mark_missing(&mut self, name: &str) {
        self.pending.remove(name);
        self.icons.shift_remove(name);
        self.missing.insert(name.to_string());
    }

    /// Add every icon of `set`; names without data are marked missing.
    ///
    /// A set with a newer `last_modified` than previously stored data
    /// replaces the stored icons.
    pub fn add_icon_set(&mut self, set: &IconSet) -> ParseReport {
        if let Some(modified) = set.last_modified {
            match self.last_modified {
                Some(current) if current >= modified => {}
                Some(_) => {
                    tracing::debug!(
                        target: "iconify_storage",
                        "Icon set {}:{} changed, dropping stored icons",
                        self.provider,
                        self.prefix
                    );
                    self.icons.clear();
                    self.last_modified = Some(modified);
                }
                None => self.last_modified = Some(modified),
            }
        }

        parse_icon_set(set, &mut |name, icon| match icon {
            Some(icon) => self.insert(name, icon.clone()),
            // Names nobody can request are not worth remembering.
            None if match_icon_name(name) => self.mark_missing(name),
            None => {}
        })
    }

    pub fn get(&self, name: &str) -> Option<&IconData> {
        self.icons.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.icons.contains_key(name)
    }

    pub fn is_missing(&self, name: &str) -> bool {
        self.missing.contains(name)
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.contains(name)
    }

    /// Whether `name` is loaded or known to be missing.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.contains(name) || self.is_missing(name)
    }

    /// Mark `name` as waiting for the API. Returns `false` if it was
    /// already resolved or pending.
    pub fn add_pending(&mut self, name: &str) -> bool {
        if self.is_resolved(name) {
            return false;
        }
        self.pending.insert(name.to_string())
    }

    pub fn remove_pending(&mut self, name: &str) -> bool {
        self.pending.remove(name)
    }

    /// Loaded icon names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.icons.keys().map(String::as_str)
    }

    /// Number of loaded icons.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

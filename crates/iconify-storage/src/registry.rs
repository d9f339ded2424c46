//! Registry of icon storages.

use indexmap::IndexMap;

use iconify_core::{match_icon_name, string_to_icon, IconData, IconName, IconSet, PartialIcon};
use iconify_parser::parse_icon_set;

use crate::storage::IconStorage;

/// All icon storages, keyed by provider and prefix.
#[derive(Debug, Clone, Default)]
pub struct IconRegistry {
    storages: IndexMap<(String, String), IconStorage>,
    allow_simple_names: bool,
}

impl IconRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept names without a prefix.
    #[must_use]
    pub fn with_simple_names(mut self, allow: bool) -> Self {
        self.allow_simple_names = allow;
        self
    }

    pub fn allow_simple_names(&self) -> bool {
        self.allow_simple_names
    }

    pub fn set_allow_simple_names(&mut self, allow: bool) {
        self.allow_simple_names = allow;
    }

    /// Drop every storage.
    pub fn reset(&mut self) {
        self.storages.clear();
    }

    /// Parse and validate an icon name with this registry's settings.
    pub fn parse_name(&self, name: &str) -> Option<IconName> {
        string_to_icon(name, self.allow_simple_names, true)
    }

    pub fn storage(&self, provider: &str, prefix: &str) -> Option<&IconStorage> {
        self.storages.get(&(provider.to_string(), prefix.to_string()))
    }

    /// Storage for `provider` and `prefix`, created on first use.
    pub fn storage_mut(&mut self, provider: &str, prefix: &str) -> &mut IconStorage {
        self.storages
            .entry((provider.to_string(), prefix.to_string()))
            .or_insert_with(|| IconStorage::new(provider, prefix))
    }

    /// Add one icon. `None` data marks the icon as missing.
    ///
    /// Returns `false` for invalid names or icons without a body.
    pub fn add_icon(&mut self, name: &str, data: Option<&PartialIcon>) -> bool {
        let Some(icon) = self.parse_name(name) else {
            return false;
        };
        let storage = self.storage_mut(&icon.provider, &icon.prefix);
        match data {
            Some(partial) => storage.add_icon(&icon.name, partial),
            None => {
                storage.mark_missing(&icon.name);
                true
            }
        }
    }

    /// Add an icon set under `provider`, or the set's own provider.
    ///
    /// With simple names enabled, a set without a prefix or provider adds
    /// each icon as a simple name. Returns `false` if nothing could be added.
    pub fn add_collection(&mut self, set: &IconSet, provider: Option<&str>) -> bool {
        let provider = provider
            .map(str::to_string)
            .or_else(|| set.provider.clone())
            .unwrap_or_default();

        if self.allow_simple_names && provider.is_empty() && set.prefix.is_empty() {
            let mut added = false;
            let mut names: Vec<(String, Option<IconData>)> = Vec::new();
            parse_icon_set(set, &mut |name, icon| names.push((name.to_string(), icon.cloned())));
            for (name, icon) in names {
                let storage = self.storage_mut("", "");
                match icon {
                    Some(icon) if match_icon_name(&name) => {
                        storage.insert(&name, icon);
                        added = true;
                    }
                    Some(_) => {}
                    None => storage.mark_missing(&name),
                }
            }
            return added;
        }

        if !match_icon_name(&set.prefix) || (!provider.is_empty() && !match_icon_name(&provider)) {
            tracing::debug!(
                target: "iconify_storage",
                "Rejected icon set with invalid prefix '{}' or provider '{}'",
                set.prefix,
                provider
            );
            return false;
        }

        let storage = self.storage_mut(&provider, &set.prefix);
        let report = storage.add_icon_set(set);
        !report.names.is_empty()
    }

    /// Get a loaded icon by full name.
    pub fn get_icon(&self, name: &str) -> Option<IconData> {
        let icon = self.parse_name(name)?;
        self.storage(&icon.provider, &icon.prefix)?
            .get(&icon.name)
            .cloned()
    }

    /// Whether an icon is loaded.
    pub fn icon_exists(&self, name: &str) -> bool {
        self.get_icon(name).is_some()
    }

    /// Full names of loaded icons, optionally filtered.
    pub fn list_icons(&self, provider: Option<&str>, prefix: Option<&str>) -> Vec<String> {
        self.storages
            .iter()
            .filter(|((p, _), _)| provider.map_or(true, |wanted| p.as_str() == wanted))
            .filter(|((_, x), _)| prefix.map_or(true, |wanted| x.as_str() == wanted))
            .flat_map(|((p, x), storage)| {
                storage
                    .names()
                    .map(move |name| IconName::new(p.as_str(), x.as_str(), name).to_string())
            })
            .collect()
    }

    /// Iterate over every storage.
    pub fn storages(&self) -> impl Iterator<Item = &IconStorage> {
        self.storages.values()
    }
}

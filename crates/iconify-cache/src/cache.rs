//! The browser cache layer.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use iconify_core::IconSet;
use iconify_storage::IconRegistry;

use crate::store::KeyValueStore;

/// Value of the version key. Stores holding another version are wiped.
pub const CACHE_VERSION: &str = "iconify2";
/// Prefix of item keys (`iconify0`, `iconify1`, ...).
pub const CACHE_PREFIX: &str = "iconify";

const VERSION_KEY: &str = "iconify-version";
const COUNT_KEY: &str = "iconify-count";
const HOUR_MS: u64 = 60 * 60 * 1000;

/// Which backing stores an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    Local,
    Session,
    All,
}

impl CacheScope {
    fn includes(self, other: CacheScope) -> bool {
        self == CacheScope::All || self == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Items older than this are dropped on load.
    pub expiration_hours: u64,
    /// Maximum number of item slots per store.
    pub limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiration_hours: 168,
            limit: 50,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn with_expiration_hours(mut self, hours: u64) -> Self {
        self.expiration_hours = hours;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One stored icon set.
#[derive(Debug, Serialize, Deserialize)]
struct CachedItem {
    /// Hours since the Unix epoch.
    cached: u64,
    provider: String,
    data: IconSet,
}

struct Backend {
    scope: CacheScope,
    store: Option<Box<dyn KeyValueStore>>,
    enabled: bool,
    scanned: bool,
    /// Reusable slots. The last one pushed is reused first.
    empty: Vec<usize>,
}

impl Backend {
    fn new(scope: CacheScope) -> Self {
        Self {
            scope,
            store: None,
            enabled: true,
            scanned: false,
            empty: Vec::new(),
        }
    }

    fn is_active(&self) -> bool {
        self.enabled && self.store.is_some()
    }
}

fn item_key(index: usize) -> String {
    format!("{CACHE_PREFIX}{index}")
}

fn read_count(store: &dyn KeyValueStore) -> usize {
    store
        .get_item(COUNT_KEY)
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn write_count(store: &mut dyn KeyValueStore, count: usize) -> bool {
    match store.set_item(COUNT_KEY, &count.to_string()) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(target: "iconify_cache", "Failed to update cache count: {}", err);
            false
        }
    }
}

/// Make sure `store` holds the current version, wiping it otherwise.
///
/// Returns `false` if the store was reset.
fn ensure_version(store: &mut dyn KeyValueStore) -> bool {
    let version = store.get_item(VERSION_KEY);
    if version.as_deref() == Some(CACHE_VERSION) {
        return true;
    }
    if version.is_some() {
        let total = read_count(store);
        tracing::debug!(
            target: "iconify_cache",
            "Cache version changed, removing {} stored items",
            total
        );
        for index in 0..total {
            store.remove_item(&item_key(index));
        }
    }
    if let Err(err) = store.set_item(VERSION_KEY, CACHE_VERSION) {
        tracing::warn!(target: "iconify_cache", "Failed to write cache version: {}", err);
    }
    write_count(store, 0);
    false
}

/// Parse a stored item, rejecting expired or malformed ones.
fn parse_item(raw: &str, min_time: u64) -> Option<CachedItem> {
    let item: CachedItem = serde_json::from_str(raw).ok()?;
    if item.cached <= min_time || item.data.prefix.is_empty() {
        return None;
    }
    if item.data.icons.values().any(|icon| icon.body.is_none()) {
        return None;
    }
    Some(item)
}

/// Icon sets persisted in `localStorage` and `sessionStorage` style stores.
///
/// Both stores are optional. Writes go to the local store first and fall
/// back to the session store. Nothing here fails loudly: broken items are
/// dropped and failed writes are logged.
pub struct BrowserCache {
    config: CacheConfig,
    local: Backend,
    session: Backend,
    clock: Box<dyn Fn() -> u64>,
}

impl Default for BrowserCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl BrowserCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            local: Backend::new(CacheScope::Local),
            session: Backend::new(CacheScope::Session),
            clock: Box::new(|| {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0)
            }),
        }
    }

    #[must_use]
    pub fn with_local_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.local.store = Some(Box::new(store));
        self.local.scanned = false;
        self
    }

    #[must_use]
    pub fn with_session_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.session.store = Some(Box::new(store));
        self.session.scanned = false;
        self
    }

    /// Replace the clock, in milliseconds since the Unix epoch.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> u64 + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    fn backends_mut(&mut self) -> [&mut Backend; 2] {
        [&mut self.local, &mut self.session]
    }

    pub fn enable(&mut self, scope: CacheScope) {
        self.set_enabled(scope, true);
    }

    pub fn disable(&mut self, scope: CacheScope) {
        self.set_enabled(scope, false);
    }

    fn set_enabled(&mut self, scope: CacheScope, enabled: bool) {
        for backend in self.backends_mut() {
            if scope.includes(backend.scope) {
                backend.enabled = enabled;
            }
        }
    }

    /// Whether every store in `scope` is enabled.
    pub fn is_enabled(&self, scope: CacheScope) -> bool {
        [&self.local, &self.session]
            .iter()
            .filter(|backend| scope.includes(backend.scope))
            .all(|backend| backend.enabled)
    }

    /// Whether an enabled store has not been read yet.
    pub fn needs_load(&self) -> bool {
        [&self.local, &self.session]
            .iter()
            .any(|backend| backend.is_active() && !backend.scanned)
    }

    fn now_hours(&self) -> u64 {
        (self.clock)() / HOUR_MS
    }

    /// Read every enabled store not read before into `registry`.
    ///
    /// Expired and broken items are removed. Returns the number of icon
    /// sets loaded.
    pub fn load(&mut self, registry: &mut IconRegistry) -> usize {
        let min_time = self.now_hours().saturating_sub(self.config.expiration_hours);
        let mut loaded = 0;
        for backend in self.backends_mut() {
            if backend.is_active() && !backend.scanned {
                loaded += scan(backend, min_time, registry);
            }
        }
        loaded
    }

    /// Persist an icon set returned by `provider`.
    ///
    /// Returns `false` if no store accepted it.
    pub fn store(&mut self, provider: &str, set: &IconSet) -> bool {
        if set.is_empty() {
            return false;
        }
        let mut data = set.clone();
        data.not_found.clear();
        let item = CachedItem {
            cached: self.now_hours(),
            provider: provider.to_string(),
            data,
        };
        let json = match serde_json::to_string(&item) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(target: "iconify_cache", "Failed to serialize icon set: {}", err);
                return false;
            }
        };

        let limit = self.config.limit;
        self.backends_mut()
            .into_iter()
            .filter(|backend| backend.is_active())
            .any(|backend| write(backend, &json, limit))
    }
}

impl std::fmt::Debug for BrowserCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserCache")
            .field("config", &self.config)
            .field("local", &self.local.is_active())
            .field("session", &self.session.is_active())
            .finish()
    }
}

fn scan(backend: &mut Backend, min_time: u64, registry: &mut IconRegistry) -> usize {
    let Some(store) = backend.store.as_deref_mut() else {
        return 0;
    };
    backend.scanned = true;
    backend.empty.clear();
    if !ensure_version(store) {
        return 0;
    }

    let mut loaded = 0;
    let mut total = read_count(store);
    for index in (0..total).rev() {
        let key = item_key(index);
        let added = store
            .get_item(&key)
            .and_then(|raw| parse_item(&raw, min_time))
            .is_some_and(|item| registry.add_collection(&item.data, Some(item.provider.as_str())));
        if added {
            loaded += 1;
            continue;
        }

        store.remove_item(&key);
        if index + 1 == total {
            total -= 1;
            write_count(store, total);
        } else {
            backend.empty.push(index);
        }
    }

    tracing::debug!(
        target: "iconify_cache",
        "Loaded {} icon sets from {:?} cache, {} free slots",
        loaded,
        backend.scope,
        backend.empty.len()
    );
    loaded
}

fn write(backend: &mut Backend, json: &str, limit: usize) -> bool {
    let Some(store) = backend.store.as_deref_mut() else {
        return false;
    };
    if !backend.scanned {
        ensure_version(store);
    }

    let (index, appended) = match backend.empty.pop() {
        Some(index) => (index, false),
        None => {
            let index = read_count(store);
            if index >= limit {
                tracing::debug!(target: "iconify_cache", "{:?} cache is full", backend.scope);
                return false;
            }
            if !write_count(store, index + 1) {
                return false;
            }
            (index, true)
        }
    };

    let key = item_key(index);
    match store.set_item(&key, json) {
        Ok(()) => {
            tracing::debug!(target: "iconify_cache", "Stored icon set in {:?} slot {}", backend.scope, index);
            true
        }
        Err(err) => {
            tracing::warn!(target: "iconify_cache", "Failed to write {}: {}", key, err);
            if appended {
                write_count(store, index);
            } else {
                backend.empty.push(index);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use iconify_core::PartialIcon;
    use serde_json::json;

    const NOW_MS: u64 = 1_700_000_000_000;
    const NOW_HOURS: u64 = NOW_MS / HOUR_MS;

    fn cache_with(local: &MemoryStore, session: &MemoryStore) -> BrowserCache {
        BrowserCache::default()
            .with_local_store(local.clone())
            .with_session_store(session.clone())
            .with_clock(|| NOW_MS)
    }

    fn set(prefix: &str, name: &str) -> IconSet {
        IconSet::new(prefix).with_icon(name, PartialIcon::new("<path d=\"M0 0h24v24H0z\"/>"))
    }

    fn item(cached: u64, prefix: &str, name: &str) -> String {
        json!({
            "cached": cached,
            "provider": "",
            "data": {"prefix": prefix, "icons": {name: {"body": "<g/>"}}}
        })
        .to_string()
    }

    fn seed(store: &MemoryStore, items: &[Option<String>]) {
        let mut store = store.clone();
        store.set_item(VERSION_KEY, CACHE_VERSION).unwrap();
        store.set_item(COUNT_KEY, &items.len().to_string()).unwrap();
        for (index, item) in items.iter().enumerate() {
            if let Some(item) = item {
                store.set_item(&item_key(index), item).unwrap();
            }
        }
    }

    #[test]
    fn test_store_and_reload() {
        let local = MemoryStore::new();
        let session = MemoryStore::new();
        let mut cache = cache_with(&local, &session);
        let mut with_missing = set("mdi", "home");
        with_missing.not_found.push("gone".to_string());
        assert!(cache.store("", &with_missing));

        assert_eq!(local.get_item("iconify-version").as_deref(), Some("iconify2"));
        assert_eq!(local.get_item("iconify-count").as_deref(), Some("1"));
        let stored: serde_json::Value =
            serde_json::from_str(&local.get_item("iconify0").unwrap()).unwrap();
        assert_eq!(stored["cached"], json!(NOW_HOURS));
        assert_eq!(stored["provider"], json!(""));
        assert_eq!(stored["data"]["prefix"], json!("mdi"));
        assert!(stored["data"].get("not_found").is_none());
        assert!(session.is_empty());

        let mut registry = IconRegistry::new();
        let mut reloaded = cache_with(&local, &session);
        assert!(reloaded.needs_load());
        assert_eq!(reloaded.load(&mut registry), 1);
        assert!(!reloaded.needs_load());
        assert!(registry.icon_exists("mdi:home"));
    }

    #[test]
    fn test_expired_trailing_slot_is_reused() {
        let local = MemoryStore::new();
        seed(
            &local,
            &[Some(item(NOW_HOURS - 1, "mdi", "home")), Some(item(NOW_HOURS - 500, "fa", "star"))],
        );

        let mut cache = cache_with(&local, &MemoryStore::new());
        let mut registry = IconRegistry::new();
        assert_eq!(cache.load(&mut registry), 1);
        assert!(registry.icon_exists("mdi:home"));
        assert!(!registry.icon_exists("fa:star"));
        assert_eq!(local.get_item("iconify-count").as_deref(), Some("1"));
        assert!(local.get_item("iconify1").is_none());

        assert!(cache.store("", &set("bi", "alarm")));
        assert!(local.get_item("iconify1").unwrap().contains("alarm"));
        assert_eq!(local.get_item("iconify-count").as_deref(), Some("2"));
    }

    #[test]
    fn test_vacated_slots_reused_last_in_first_out() {
        let local = MemoryStore::new();
        seed(
            &local,
            &[
                Some("not json".to_string()),
                None,
                Some(item(NOW_HOURS, "mdi", "home")),
                Some(item(NOW_HOURS, "fa", "star")),
            ],
        );

        let mut cache = cache_with(&local, &MemoryStore::new());
        assert_eq!(cache.load(&mut IconRegistry::new()), 2);
        assert!(local.get_item("iconify0").is_none());

        assert!(cache.store("", &set("bi", "one")));
        assert!(cache.store("", &set("bi", "two")));
        assert!(cache.store("", &set("bi", "three")));
        assert!(local.get_item("iconify0").unwrap().contains("\"one\""));
        assert!(local.get_item("iconify1").unwrap().contains("\"two\""));
        assert!(local.get_item("iconify4").unwrap().contains("\"three\""));
        assert_eq!(local.get_item("iconify-count").as_deref(), Some("5"));
    }

    #[test]
    fn test_icon_without_body_drops_item() {
        let local = MemoryStore::new();
        let broken = json!({
            "cached": NOW_HOURS,
            "provider": "",
            "data": {"prefix": "mdi", "icons": {"home": {"width": 24}}}
        })
        .to_string();
        seed(&local, &[Some(broken)]);

        let mut registry = IconRegistry::new();
        assert_eq!(cache_with(&local, &MemoryStore::new()).load(&mut registry), 0);
        assert!(registry.list_icons(None, None).is_empty());
        assert_eq!(local.get_item("iconify-count").as_deref(), Some("0"));
    }

    #[test]
    fn test_version_mismatch_wipes_store() {
        let mut local = MemoryStore::new();
        seed(&local, &[Some(item(NOW_HOURS, "mdi", "home"))]);
        local.set_item(VERSION_KEY, "iconify1").unwrap();

        let mut registry = IconRegistry::new();
        assert_eq!(cache_with(&local, &MemoryStore::new()).load(&mut registry), 0);
        assert!(!registry.icon_exists("mdi:home"));
        assert!(local.get_item("iconify0").is_none());
        assert_eq!(local.get_item("iconify-version").as_deref(), Some("iconify2"));
        assert_eq!(local.get_item("iconify-count").as_deref(), Some("0"));
    }

    #[test]
    fn test_read_only_store_falls_back() {
        let local = MemoryStore::new();
        local.set_read_only(true);
        let session = MemoryStore::new();
        let mut cache = cache_with(&local, &session);

        assert!(cache.store("", &set("mdi", "home")));
        assert!(local.is_empty());
        assert!(session.get_item("iconify0").is_some());

        session.set_read_only(true);
        assert!(!cache.store("", &set("mdi", "close")));
    }

    #[test]
    fn test_limit_falls_back() {
        let local = MemoryStore::new();
        let session = MemoryStore::new();
        let mut cache = BrowserCache::new(CacheConfig::default().with_limit(1))
            .with_local_store(local.clone())
            .with_session_store(session.clone())
            .with_clock(|| NOW_MS);

        assert!(cache.store("", &set("mdi", "home")));
        assert!(cache.store("", &set("fa", "star")));
        assert_eq!(local.get_item("iconify-count").as_deref(), Some("1"));
        assert!(session.get_item("iconify0").unwrap().contains("star"));
        assert!(!cache.store("", &set("bi", "alarm")));
    }

    #[test]
    fn test_disabled_scopes() {
        let local = MemoryStore::new();
        let session = MemoryStore::new();
        let mut cache = cache_with(&local, &session);

        cache.disable(CacheScope::Local);
        assert!(!cache.is_enabled(CacheScope::Local));
        assert!(!cache.is_enabled(CacheScope::All));
        assert!(cache.store("", &set("mdi", "home")));
        assert!(local.is_empty());

        cache.disable(CacheScope::All);
        assert!(!cache.needs_load());
        assert!(!cache.store("", &set("mdi", "close")));

        cache.enable(CacheScope::All);
        assert!(cache.is_enabled(CacheScope::All));
        assert!(cache.needs_load());
    }

    #[test]
    fn test_empty_set_is_not_stored() {
        let local = MemoryStore::new();
        let mut cache = cache_with(&local, &MemoryStore::new());
        assert!(!cache.store("", &IconSet::new("mdi")));
        assert!(local.is_empty());
    }
}

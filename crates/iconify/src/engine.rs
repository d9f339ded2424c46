use std::cell::RefCell;
use std::rc::Rc;

use iconify_api::{AbortHandle, ApiConfig, ApiLoader, ApiModule, LoadCallback, LoadUpdate, ManualScheduler, Scheduler};
use iconify_cache::{BrowserCache, CacheScope};
use iconify_core::{Customisations, IconData, IconSet, IconifyError, PartialIcon};
use iconify_export::{build_icon, render_svg, SvgBuildResult};
use iconify_parser::parse_document;
use iconify_storage::IconRegistry;

/// The icon engine.
///
/// Holds one registry, one loader and one cache. Deferred work goes through
/// the [`Scheduler`] passed to [`Iconify::new`]. Clones share state.
#[derive(Clone)]
pub struct Iconify {
    registry: Rc<RefCell<IconRegistry>>,
    loader: ApiLoader,
    cache: Rc<RefCell<BrowserCache>>,
}

impl Default for Iconify {
    /// An engine on a [`ManualScheduler`] that nobody drives.
    ///
    /// Enough for registering and rendering icons. Loading from an API needs
    /// a real scheduler.
    fn default() -> Self {
        Self::new(Rc::new(ManualScheduler::new()))
    }
}

impl Iconify {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_cache(scheduler, BrowserCache::default())
    }

    /// Create an engine that persists API responses in `cache`.
    pub fn with_cache(scheduler: Rc<dyn Scheduler>, cache: BrowserCache) -> Self {
        let registry = Rc::new(RefCell::new(IconRegistry::new()));
        let loader = ApiLoader::new(registry.clone(), scheduler);
        let cache = Rc::new(RefCell::new(cache));

        let sink = cache.clone();
        loader.set_store_hook(move |provider, set| {
            sink.borrow_mut().store(provider, set);
        });

        Self {
            registry,
            loader,
            cache,
        }
    }

    /// Accept icon names without a prefix.
    pub fn set_allow_simple_names(&self, allow: bool) {
        self.registry.borrow_mut().set_allow_simple_names(allow);
    }

    /// Add one icon. Returns `false` for invalid names or icons without a body.
    pub fn add_icon(&self, name: &str, data: &PartialIcon) -> bool {
        self.registry.borrow_mut().add_icon(name, Some(data))
    }

    /// Add every icon of `set`, optionally under another prefix.
    pub fn add_collection(&self, set: &IconSet, prefix_override: Option<&str>) -> bool {
        match prefix_override {
            Some(prefix) => {
                let mut renamed = set.clone();
                renamed.prefix = prefix.to_string();
                self.registry.borrow_mut().add_collection(&renamed, None)
            }
            None => self.registry.borrow_mut().add_collection(set, None),
        }
    }

    /// Add every icon of `set` under an API provider.
    pub fn add_provider_collection(&self, set: &IconSet, provider: &str) -> bool {
        self.registry.borrow_mut().add_collection(set, Some(provider))
    }

    /// Parse an icon set JSON document and add it.
    pub fn add_collection_json(&self, source: &str) -> Result<bool, IconifyError> {
        let set = parse_document(source)?;
        Ok(self.add_collection(&set, None))
    }

    pub fn get_icon(&self, name: &str) -> Option<IconData> {
        self.registry.borrow().get_icon(name)
    }

    pub fn icon_exists(&self, name: &str) -> bool {
        self.registry.borrow().icon_exists(name)
    }

    /// Full names of loaded icons, optionally filtered by provider and prefix.
    pub fn list_icons(&self, provider: Option<&str>, prefix: Option<&str>) -> Vec<String> {
        self.registry.borrow().list_icons(provider, prefix)
    }

    /// Load icons from the API. See [`ApiLoader::load_icons`].
    ///
    /// The cache is read the first time this runs.
    pub fn load_icons<S: AsRef<str>>(&self, names: &[S], callback: Option<LoadCallback>) -> AbortHandle {
        self.load_cache();
        self.loader.load_icons(names, callback)
    }

    /// Load one icon. `callback` gets its data, or `None` if it does not exist.
    pub fn load_icon(&self, name: &str, callback: impl FnOnce(Option<IconData>) + 'static) -> AbortHandle {
        let registry = self.registry.clone();
        let mut callback = Some(callback);
        self.load_icons(
            &[name],
            Some(Box::new(move |update: &LoadUpdate, _: &AbortHandle| {
                if !update.is_complete() {
                    return;
                }
                let icon = update
                    .loaded
                    .first()
                    .and_then(|icon| registry.borrow().get_icon(&icon.to_string()));
                if let Some(callback) = callback.take() {
                    callback(icon);
                }
            })),
        )
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.loader.is_pending(name)
    }

    /// Build SVG attributes and body for a loaded icon.
    pub fn build_icon(&self, name: &str, customisations: &Customisations) -> Option<SvgBuildResult> {
        let icon = self.get_icon(name)?;
        Some(build_icon(&icon, customisations))
    }

    /// Render complete `<svg>` markup for a loaded icon.
    pub fn render_svg(&self, name: &str, customisations: &Customisations) -> Option<String> {
        let icon = self.get_icon(name)?;
        Some(render_svg(&icon, customisations))
    }

    /// Register an API provider. Returns `false` for invalid configurations.
    pub fn add_api_provider(&self, provider: &str, config: ApiConfig) -> bool {
        match self.loader.add_provider(provider, config) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: "iconify", "Rejected API provider '{}': {}", provider, err);
                false
            }
        }
    }

    /// Transport for every provider without its own module.
    pub fn set_api_module(&self, module: Rc<dyn ApiModule>) {
        self.loader.set_default_module(module);
    }

    pub fn set_provider_module(&self, provider: &str, module: Rc<dyn ApiModule>) {
        self.loader.set_module(provider, module);
    }

    pub fn enable_cache(&self, scope: CacheScope) {
        self.cache.borrow_mut().enable(scope);
    }

    pub fn disable_cache(&self, scope: CacheScope) {
        self.cache.borrow_mut().disable(scope);
    }

    /// Read cached icon sets from stores not read yet.
    fn load_cache(&self) {
        if !self.cache.borrow().needs_load() {
            return;
        }
        let loaded = self
            .cache
            .borrow_mut()
            .load(&mut self.registry.borrow_mut());
        tracing::debug!(target: "iconify", "Loaded {} icon sets from cache", loaded);
    }

    /// Drop all icons and cancel every pending load.
    pub fn reset(&self) {
        self.loader.reset();
        self.registry.borrow_mut().reset();
    }
}

impl std::fmt::Debug for Iconify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iconify")
            .field("icons", &self.registry.borrow().list_icons(None, None).len())
            .field("loader", &self.loader)
            .field("cache", &*self.cache.borrow())
            .finish()
    }
}

//! The loading coordinator.
//!
//! `load_icons` sorts names into loaded, missing and pending. Pending names
//! are queued per provider and prefix and sent in one batch on the next
//! tick. When data arrives the storage is updated and subscribers are
//! notified on a later tick, never from inside `load_icons` itself.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::time::Duration;

use iconify_core::{ApiError, IconName, IconSet, IconifyError};
use iconify_storage::IconRegistry;

use crate::callbacks::{AbortHandle, LoadCallback, LoadUpdate, Subscription};
use crate::config::ApiConfig;
use crate::modules::{ApiModule, ApiProviders, ApiQuery};
use crate::redundancy::{send_query, QueryHandle, QueryOutcome, QueryStatus};
use crate::scheduler::Scheduler;

type Source = (String, String);
type StoreHook = Rc<dyn Fn(&str, &IconSet)>;

/// Icons of one provider and prefix waiting to be sent.
#[derive(Debug, Default)]
struct SourceQueue {
    to_load: Vec<String>,
    scheduled: bool,
    /// Names requested without a callback. They load even if every
    /// subscriber aborts.
    keep: HashSet<String>,
}

#[derive(Default)]
struct LoaderState {
    next_id: u64,
    subscriptions: BTreeMap<u64, Subscription>,
    sources: HashMap<Source, SourceQueue>,
    notify_scheduled: bool,
    queries: Vec<QueryHandle>,
}

pub(crate) struct LoaderInner {
    registry: Rc<RefCell<IconRegistry>>,
    providers: RefCell<ApiProviders>,
    scheduler: Rc<dyn Scheduler>,
    state: RefCell<LoaderState>,
    store_hook: RefCell<Option<StoreHook>>,
}

impl LoaderInner {
    /// Remove a subscription and drop queued icons nobody waits for.
    pub(crate) fn unsubscribe(&self, id: u64) {
        let dropped = {
            let mut state = self.state.borrow_mut();
            let Some(subscription) = state.subscriptions.remove(&id) else {
                return;
            };
            let mut dropped: Vec<(Source, String)> = Vec::new();
            for source in &subscription.sources {
                if state.subscriptions.values().any(|s| s.waits_for(source)) {
                    continue;
                }
                if let Some(queue) = state.sources.get_mut(source) {
                    let keep = &queue.keep;
                    queue.to_load.retain(|name| {
                        if keep.contains(name) {
                            true
                        } else {
                            dropped.push((source.clone(), name.clone()));
                            false
                        }
                    });
                }
            }
            dropped
        };

        if dropped.is_empty() {
            return;
        }
        tracing::debug!(
            target: "iconify_api::loader",
            "Subscription {} aborted, dropped {} queued icons",
            id,
            dropped.len()
        );
        let mut registry = self.registry.borrow_mut();
        for ((provider, prefix), name) in dropped {
            registry.storage_mut(&provider, &prefix).remove_pending(&name);
        }
    }
}

/// Loads icons from API providers into a shared [`IconRegistry`].
///
/// Clones share state.
#[derive(Clone)]
pub struct ApiLoader {
    inner: Rc<LoaderInner>,
}

impl ApiLoader {
    pub fn new(registry: Rc<RefCell<IconRegistry>>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(LoaderInner {
                registry,
                providers: RefCell::new(ApiProviders::new()),
                scheduler,
                state: RefCell::new(LoaderState::default()),
                store_hook: RefCell::new(None),
            }),
        }
    }

    pub fn registry(&self) -> Rc<RefCell<IconRegistry>> {
        self.inner.registry.clone()
    }

    /// Register or replace the configuration of an API provider.
    pub fn add_provider(&self, provider: &str, config: ApiConfig) -> Result<(), IconifyError> {
        self.inner.providers.borrow_mut().add_provider(provider, config)
    }

    pub fn provider_config(&self, provider: &str) -> Option<ApiConfig> {
        self.inner
            .providers
            .borrow()
            .config(provider)
            .map(|config| config.borrow().clone())
    }

    /// Transport used by providers without their own module.
    pub fn set_default_module(&self, module: Rc<dyn ApiModule>) {
        self.inner.providers.borrow_mut().set_default_module(module);
    }

    pub fn set_module(&self, provider: &str, module: Rc<dyn ApiModule>) {
        self.inner.providers.borrow_mut().set_module(provider, module);
    }

    /// Called with the provider and data of every successful response.
    pub fn set_store_hook(&self, hook: impl Fn(&str, &IconSet) + 'static) {
        *self.inner.store_hook.borrow_mut() = Some(Rc::new(hook));
    }

    /// Whether `name` is waiting for an API response.
    pub fn is_pending(&self, name: &str) -> bool {
        let registry = self.inner.registry.borrow();
        let Some(icon) = registry.parse_name(name) else {
            return false;
        };
        registry
            .storage(&icon.provider, &icon.prefix)
            .is_some_and(|storage| storage.is_pending(&icon.name))
    }

    /// Start loading `names`.
    ///
    /// Invalid names are skipped. `callback` runs on a later tick with the
    /// accumulated state, once per change, and is dropped when nothing is
    /// pending any more. If every name is already resolved it runs exactly
    /// once on the next tick.
    pub fn load_icons<S: AsRef<str>>(&self, names: &[S], callback: Option<LoadCallback>) -> AbortHandle {
        let update = self.sort_icons(names);
        let cancelled = Rc::new(Cell::new(false));
        let loader = Rc::downgrade(&self.inner);

        if update.pending.is_empty() {
            let handle = AbortHandle {
                id: None,
                cancelled,
                loader,
            };
            if let Some(mut callback) = callback {
                let task_handle = handle.clone();
                self.inner.scheduler.schedule(
                    Duration::ZERO,
                    Box::new(move || {
                        if !task_handle.is_aborted() {
                            callback(&update, &task_handle);
                        }
                    }),
                );
            }
            return handle;
        }

        let mut fresh: BTreeMap<Source, Vec<String>> = BTreeMap::new();
        {
            let mut registry = self.inner.registry.borrow_mut();
            for icon in &update.pending {
                let storage = registry.storage_mut(&icon.provider, &icon.prefix);
                if storage.add_pending(&icon.name) {
                    fresh
                        .entry((icon.provider.clone(), icon.prefix.clone()))
                        .or_default()
                        .push(icon.name.clone());
                }
            }
        }

        if callback.is_none() {
            let mut state = self.inner.state.borrow_mut();
            for icon in &update.pending {
                state
                    .sources
                    .entry((icon.provider.clone(), icon.prefix.clone()))
                    .or_default()
                    .keep
                    .insert(icon.name.clone());
            }
        }

        for (source, names) in fresh {
            enqueue(&self.inner, source, names);
        }

        let id = callback.map(|callback| {
            let mut state = self.inner.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state
                .subscriptions
                .insert(id, Subscription::new(update, callback, cancelled.clone()));
            id
        });

        AbortHandle {
            id,
            cancelled,
            loader,
        }
    }

    /// Split names into loaded, missing and pending, sorted and deduplicated.
    fn sort_icons<S: AsRef<str>>(&self, names: &[S]) -> LoadUpdate {
        let registry = self.inner.registry.borrow();
        let mut icons: Vec<IconName> = names
            .iter()
            .filter_map(|name| {
                let parsed = registry.parse_name(name.as_ref());
                if parsed.is_none() {
                    tracing::debug!(target: "iconify_api::loader", "Skipping invalid icon name '{}'", name.as_ref());
                }
                parsed
            })
            .collect();
        icons.sort();
        icons.dedup();

        let mut update = LoadUpdate::default();
        for icon in icons {
            let storage = registry.storage(&icon.provider, &icon.prefix);
            if storage.is_some_and(|s| s.contains(&icon.name)) {
                update.loaded.push(icon);
            } else if storage.is_some_and(|s| s.is_missing(&icon.name)) {
                update.missing.push(icon);
            } else {
                update.pending.push(icon);
            }
        }
        update
    }

    /// Cancel every subscription and running query.
    ///
    /// Queued and in-flight icons stop being pending.
    pub fn reset(&self) {
        let (queries, queued) = {
            let mut state = self.inner.state.borrow_mut();
            for subscription in state.subscriptions.values() {
                subscription.cancelled.set(true);
            }
            let queued: Vec<(Source, Vec<String>)> = state
                .sources
                .drain()
                .map(|(source, queue)| (source, queue.to_load))
                .collect();
            let queries = std::mem::take(&mut state.queries);
            let next_id = state.next_id;
            *state = LoaderState {
                next_id,
                ..Default::default()
            };
            (queries, queued)
        };

        let mut registry = self.inner.registry.borrow_mut();
        for ((provider, prefix), names) in queued {
            let storage = registry.storage_mut(&provider, &prefix);
            for name in names {
                storage.remove_pending(&name);
            }
        }
        for handle in queries {
            if handle.status() == QueryStatus::Pending {
                let query = handle.query();
                let storage = registry.storage_mut(&query.provider, &query.prefix);
                for name in &query.icons {
                    storage.remove_pending(name);
                }
            }
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ApiLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ApiLoader")
            .field("providers", &*self.inner.providers.borrow())
            .field("subscriptions", &state.subscriptions.len())
            .field("queries", &state.queries.len())
            .finish()
    }
}

/// Queue fresh names and make sure a dispatch is scheduled.
fn enqueue(inner: &Rc<LoaderInner>, source: Source, names: Vec<String>) {
    let schedule = {
        let mut state = inner.state.borrow_mut();
        let queue = state.sources.entry(source.clone()).or_default();
        queue.to_load.extend(names);
        queue.to_load.sort();
        queue.to_load.dedup();
        !std::mem::replace(&mut queue.scheduled, true)
    };
    if schedule {
        let weak = Rc::downgrade(inner);
        inner.scheduler.schedule(
            Duration::ZERO,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    dispatch(&inner, &source);
                }
            }),
        );
    }
}

/// Send everything queued for `source`.
fn dispatch(inner: &Rc<LoaderInner>, source: &Source) {
    let icons = {
        let mut state = inner.state.borrow_mut();
        let Some(queue) = state.sources.get_mut(source) else {
            return;
        };
        queue.scheduled = false;
        let icons = std::mem::take(&mut queue.to_load);
        queue.keep.retain(|name| !icons.contains(name));
        icons
    };
    if icons.is_empty() {
        return;
    }

    let (provider, prefix) = source;
    let (config, module) = {
        let providers = inner.providers.borrow();
        (providers.config(provider), providers.module(provider))
    };
    let (Some(config), Some(module)) = (config, module) else {
        let error = ApiError::UnknownProvider {
            provider: provider.clone(),
        };
        tracing::warn!(
            target: "iconify_api::loader",
            "{}, marking {} icons of '{}' as missing",
            error,
            icons.len(),
            prefix
        );
        mark_missing(inner, provider, prefix, &icons);
        schedule_notify(inner);
        return;
    };

    let queries = module.prepare(provider, prefix, &icons, &config.borrow());
    tracing::debug!(
        target: "iconify_api::loader",
        "Dispatching {} icons of {}:{} in {} queries",
        icons.len(),
        provider,
        prefix,
        queries.len()
    );

    let handles: Vec<QueryHandle> = queries
        .into_iter()
        .map(|query| {
            let weak = Rc::downgrade(inner);
            let sent = query.clone();
            send_query(
                config.clone(),
                module.clone(),
                inner.scheduler.clone(),
                query,
                Box::new(move |outcome| {
                    if let Some(inner) = weak.upgrade() {
                        query_done(&inner, &sent, outcome);
                    }
                }),
            )
        })
        .collect();

    let mut state = inner.state.borrow_mut();
    state
        .queries
        .retain(|handle| handle.status() == QueryStatus::Pending);
    state.queries.extend(handles);
}

fn query_done(inner: &Rc<LoaderInner>, query: &ApiQuery, outcome: QueryOutcome) {
    match outcome {
        QueryOutcome::Success(set) if set.prefix == query.prefix => {
            {
                let mut registry = inner.registry.borrow_mut();
                let storage = registry.storage_mut(&query.provider, &query.prefix);
                let report = storage.add_icon_set(&set);
                if !report.is_success() {
                    tracing::debug!(
                        target: "iconify_api::loader",
                        "Response for {}:{} had {} bad entries",
                        query.provider,
                        query.prefix,
                        report.errors.len()
                    );
                }
                for name in &query.icons {
                    if !storage.is_resolved(name) {
                        storage.mark_missing(name);
                    }
                }
            }
            let hook = inner.store_hook.borrow().clone();
            if let Some(hook) = hook {
                hook(&query.provider, &set);
            }
        }
        QueryOutcome::Success(set) => {
            tracing::warn!(
                target: "iconify_api::loader",
                "Expected icons of '{}', API returned '{}'",
                query.prefix,
                set.prefix
            );
            mark_missing(inner, &query.provider, &query.prefix, &query.icons);
        }
        QueryOutcome::Failed => {
            let error = ApiError::AllHostsFailed {
                prefix: query.prefix.clone(),
            };
            tracing::debug!(target: "iconify_api::loader", "{}", error);
            mark_missing(inner, &query.provider, &query.prefix, &query.icons);
        }
    }
    schedule_notify(inner);
}

/// Mark every unresolved name as missing.
fn mark_missing(inner: &LoaderInner, provider: &str, prefix: &str, names: &[String]) {
    let mut registry = inner.registry.borrow_mut();
    let storage = registry.storage_mut(provider, prefix);
    for name in names {
        if !storage.is_resolved(name) {
            storage.mark_missing(name);
        }
    }
}

fn schedule_notify(inner: &Rc<LoaderInner>) {
    let already = std::mem::replace(&mut inner.state.borrow_mut().notify_scheduled, true);
    if already {
        return;
    }
    let weak: Weak<LoaderInner> = Rc::downgrade(inner);
    inner.scheduler.schedule(
        Duration::ZERO,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                notify(&inner);
            }
        }),
    );
}

/// Tell subscribers about icons that resolved since the last pass.
///
/// Works on a snapshot of subscription ids, so callbacks may load icons
/// or abort while the pass runs.
fn notify(inner: &Rc<LoaderInner>) {
    let ids: Vec<u64> = {
        let mut state = inner.state.borrow_mut();
        state.notify_scheduled = false;
        state.subscriptions.keys().copied().collect()
    };

    for id in ids {
        let (update, complete, cancelled, callback) = {
            let registry = inner.registry.borrow();
            let mut state = inner.state.borrow_mut();
            let (update, complete, cancelled) = {
                let Some(subscription) = state.subscriptions.get_mut(&id) else {
                    continue;
                };
                if !subscription.refresh(&registry) {
                    continue;
                }
                (
                    subscription.update.clone(),
                    subscription.update.is_complete(),
                    subscription.cancelled.clone(),
                )
            };
            let callback = if complete {
                state
                    .subscriptions
                    .remove(&id)
                    .and_then(|subscription| subscription.callback)
            } else {
                state
                    .subscriptions
                    .get_mut(&id)
                    .and_then(|subscription| subscription.callback.take())
            };
            (update, complete, cancelled, callback)
        };

        let Some(mut callback) = callback else {
            continue;
        };
        if cancelled.get() {
            continue;
        }

        tracing::trace!(
            target: "iconify_api::loader",
            "Notifying subscription {}: {} loaded, {} missing, {} pending",
            id,
            update.loaded.len(),
            update.missing.len(),
            update.pending.len()
        );
        let handle = AbortHandle {
            id: Some(id),
            cancelled,
            loader: Rc::downgrade(inner),
        };
        callback(&update, &handle);

        if !complete {
            if let Some(subscription) = inner.state.borrow_mut().subscriptions.get_mut(&id) {
                subscription.callback = Some(callback);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{QueryResponse, Responder};
    use crate::scheduler::ManualScheduler;
    use iconify_core::PartialIcon;

    #[derive(Default)]
    struct MockModule {
        sent: RefCell<Vec<(String, ApiQuery, Option<Responder>)>>,
    }

    impl MockModule {
        fn queries(&self) -> Vec<ApiQuery> {
            self.sent.borrow().iter().map(|(_, q, _)| q.clone()).collect()
        }

        fn hosts(&self) -> Vec<String> {
            self.sent.borrow().iter().map(|(h, _, _)| h.clone()).collect()
        }

        fn respond(&self, index: usize, response: QueryResponse) {
            let responder = self.sent.borrow_mut()[index].2.take().unwrap();
            responder(response);
        }
    }

    impl ApiModule for MockModule {
        fn send(&self, host: &str, query: &ApiQuery, respond: Responder) {
            self.sent
                .borrow_mut()
                .push((host.to_string(), query.clone(), Some(respond)));
        }
    }

    struct Fixture {
        scheduler: ManualScheduler,
        module: Rc<MockModule>,
        loader: ApiLoader,
    }

    impl Fixture {
        fn new() -> Self {
            let scheduler = ManualScheduler::new();
            let module = Rc::new(MockModule::default());
            let registry = Rc::new(RefCell::new(IconRegistry::new()));
            let loader = ApiLoader::new(registry, Rc::new(scheduler.clone()));
            loader.set_default_module(module.clone());
            Self {
                scheduler,
                module,
                loader,
            }
        }
    }

    type Updates = Rc<RefCell<Vec<LoadUpdate>>>;

    fn recorder() -> (Updates, LoadCallback) {
        let updates: Updates = Rc::new(RefCell::new(Vec::new()));
        let sink = updates.clone();
        (
            updates,
            Box::new(move |update: &LoadUpdate, _: &AbortHandle| sink.borrow_mut().push(update.clone())),
        )
    }

    fn mdi(names: &[&str]) -> IconSet {
        names.iter().fold(IconSet::new("mdi"), |set, name| {
            set.with_icon(*name, PartialIcon::new("<path d=\"M0 0h24v24H0z\"/>"))
        })
    }

    fn icon(prefix: &str, name: &str) -> IconName {
        IconName::new("", prefix, name)
    }

    #[test]
    fn test_same_tick_requests_share_one_query() {
        let fixture = Fixture::new();
        fixture.loader.load_icons(&["mdi:home", "mdi:account"], None);
        let (_, callback) = recorder();
        fixture
            .loader
            .load_icons(&["mdi:home", "mdi:close"], Some(callback));

        assert!(fixture.loader.is_pending("mdi:home"));
        assert!(fixture.module.queries().is_empty());

        fixture.scheduler.tick();
        let queries = fixture.module.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].prefix, "mdi");
        assert_eq!(queries[0].icons, vec!["account", "close", "home"]);
        assert_eq!(fixture.module.hosts(), vec!["https://api.iconify.design"]);
    }

    #[test]
    fn test_results_are_delivered_on_a_later_tick() {
        let fixture = Fixture::new();
        let (updates, callback) = recorder();
        fixture
            .loader
            .load_icons(&["mdi:home", "mdi:close"], Some(callback));
        fixture.scheduler.tick();

        fixture
            .module
            .respond(0, QueryResponse::Success(mdi(&["home", "close"])));
        assert!(updates.borrow().is_empty());
        assert!(!fixture.loader.is_pending("mdi:home"));

        fixture.scheduler.tick();
        assert_eq!(
            *updates.borrow(),
            vec![LoadUpdate {
                loaded: vec![icon("mdi", "close"), icon("mdi", "home")],
                missing: Vec::new(),
                pending: Vec::new(),
            }]
        );

        fixture.scheduler.run_until_idle();
        assert_eq!(updates.borrow().len(), 1);
        assert!(fixture.loader.registry().borrow().icon_exists("mdi:home"));
    }

    #[test]
    fn test_unreturned_icons_become_missing() {
        let fixture = Fixture::new();
        let (updates, callback) = recorder();
        fixture
            .loader
            .load_icons(&["mdi:home", "mdi:nope"], Some(callback));
        fixture.scheduler.tick();
        fixture.module.respond(0, QueryResponse::Success(mdi(&["home"])));
        fixture.scheduler.tick();

        let updates = updates.borrow();
        assert_eq!(updates[0].loaded, vec![icon("mdi", "home")]);
        assert_eq!(updates[0].missing, vec![icon("mdi", "nope")]);
    }

    #[test]
    fn test_partial_updates_per_prefix() {
        let fixture = Fixture::new();
        let (updates, callback) = recorder();
        fixture
            .loader
            .load_icons(&["mdi:home", "fa:star"], Some(callback));
        fixture.scheduler.tick();
        assert_eq!(fixture.module.queries().len(), 2);

        let mdi_index = fixture
            .module
            .queries()
            .iter()
            .position(|q| q.prefix == "mdi")
            .unwrap();
        fixture
            .module
            .respond(mdi_index, QueryResponse::Success(mdi(&["home"])));
        fixture.scheduler.tick();
        assert_eq!(updates.borrow().len(), 1);
        assert_eq!(updates.borrow()[0].pending, vec![icon("fa", "star")]);

        fixture.module.respond(1 - mdi_index, QueryResponse::Abort);
        fixture.scheduler.tick();
        let updates = updates.borrow();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].loaded, vec![icon("mdi", "home")]);
        assert_eq!(updates[1].missing, vec![icon("fa", "star")]);
        assert!(updates[1].is_complete());
    }

    #[test]
    fn test_host_fallback() {
        let fixture = Fixture::new();
        fixture
            .loader
            .add_provider(
                "custom",
                ApiConfig::with_resources(["https://one.example", "https://two.example"])
                    .with_rotate(Duration::from_millis(100)),
            )
            .unwrap();
        let (updates, callback) = recorder();
        fixture
            .loader
            .load_icons(&["@custom:mdi:home"], Some(callback));

        fixture.scheduler.tick();
        assert_eq!(fixture.module.hosts(), vec!["https://one.example"]);

        fixture.scheduler.advance(Duration::from_millis(100));
        assert_eq!(
            fixture.module.hosts(),
            vec!["https://one.example", "https://two.example"]
        );

        fixture.module.respond(1, QueryResponse::Success(mdi(&["home"])));
        fixture.scheduler.tick();
        assert_eq!(
            updates.borrow()[0].loaded,
            vec![IconName::new("custom", "mdi", "home")]
        );
        assert_eq!(fixture.loader.provider_config("custom").unwrap().index, 1);
    }

    #[test]
    fn test_failed_query_marks_missing() {
        let fixture = Fixture::new();
        let (updates, callback) = recorder();
        fixture.loader.load_icons(&["mdi:home"], Some(callback));
        fixture.scheduler.run_until_idle();

        assert_eq!(fixture.module.hosts().len(), 3);
        let updates = updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].missing, vec![icon("mdi", "home")]);
        assert!(fixture
            .loader
            .registry()
            .borrow()
            .storage("", "mdi")
            .unwrap()
            .is_missing("home"));
    }

    #[test]
    fn test_resolved_icons_fire_once_on_next_tick() {
        let fixture = Fixture::new();
        fixture
            .loader
            .registry()
            .borrow_mut()
            .add_icon("mdi:home", Some(&PartialIcon::new("<g/>")));
        fixture.loader.registry().borrow_mut().add_icon("mdi:gone", None);

        let (updates, callback) = recorder();
        fixture
            .loader
            .load_icons(&["mdi:home", "mdi:gone", "not valid"], Some(callback));
        assert!(updates.borrow().is_empty());

        fixture.scheduler.run_until_idle();
        assert_eq!(
            *updates.borrow(),
            vec![LoadUpdate {
                loaded: vec![icon("mdi", "home")],
                missing: vec![icon("mdi", "gone")],
                pending: Vec::new(),
            }]
        );
        assert!(fixture.module.queries().is_empty());
    }

    #[test]
    fn test_abort_before_dispatch() {
        let fixture = Fixture::new();
        let (updates, callback) = recorder();
        let handle = fixture.loader.load_icons(&["mdi:home"], Some(callback));
        handle.abort();
        assert!(handle.is_aborted());
        assert!(!fixture.loader.is_pending("mdi:home"));

        fixture.scheduler.run_until_idle();
        assert!(fixture.module.queries().is_empty());
        assert!(updates.borrow().is_empty());
    }

    #[test]
    fn test_abort_keeps_icons_wanted_elsewhere() {
        let fixture = Fixture::new();
        fixture.loader.load_icons(&["mdi:home"], None);
        let (_, callback) = recorder();
        let handle = fixture
            .loader
            .load_icons(&["mdi:home", "mdi:close"], Some(callback));
        handle.abort();

        fixture.scheduler.tick();
        assert_eq!(fixture.module.queries()[0].icons, vec!["home"]);
    }

    #[test]
    fn test_abort_after_dispatch_stops_callbacks() {
        let fixture = Fixture::new();
        let (updates, callback) = recorder();
        let handle = fixture.loader.load_icons(&["mdi:home"], Some(callback));
        fixture.scheduler.tick();
        handle.abort();

        fixture.module.respond(0, QueryResponse::Success(mdi(&["home"])));
        fixture.scheduler.run_until_idle();
        assert!(updates.borrow().is_empty());
        assert!(fixture.loader.registry().borrow().icon_exists("mdi:home"));
    }

    #[test]
    fn test_abort_from_inside_callback() {
        let fixture = Fixture::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        fixture.loader.load_icons(
            &["mdi:home", "fa:star"],
            Some(Box::new(move |_: &LoadUpdate, handle: &AbortHandle| {
                counter.set(counter.get() + 1);
                handle.abort();
            })),
        );
        fixture.scheduler.tick();
        fixture.module.respond(0, QueryResponse::Abort);
        fixture.scheduler.tick();
        fixture.module.respond(1, QueryResponse::Abort);
        fixture.scheduler.run_until_idle();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_unknown_provider_marks_missing() {
        let fixture = Fixture::new();
        let (updates, callback) = recorder();
        fixture
            .loader
            .load_icons(&["@nowhere:mdi:home"], Some(callback));
        fixture.scheduler.tick();

        assert!(fixture.module.queries().is_empty());
        assert_eq!(
            updates.borrow()[0].missing,
            vec![IconName::new("nowhere", "mdi", "home")]
        );
    }

    #[test]
    fn test_store_hook_receives_data() {
        let fixture = Fixture::new();
        let stored = Rc::new(RefCell::new(Vec::new()));
        let sink = stored.clone();
        fixture
            .loader
            .set_store_hook(move |provider, set| sink.borrow_mut().push((provider.to_string(), set.prefix.clone())));

        fixture.loader.load_icons(&["mdi:home"], None);
        fixture.scheduler.tick();
        fixture.module.respond(0, QueryResponse::Success(mdi(&["home"])));
        assert_eq!(*stored.borrow(), vec![(String::new(), "mdi".to_string())]);
    }

    #[test]
    fn test_reset_cancels_everything() {
        let fixture = Fixture::new();
        let (updates, callback) = recorder();
        fixture.loader.load_icons(&["mdi:home"], Some(callback));
        fixture.scheduler.tick();
        fixture.loader.reset();
        assert!(!fixture.loader.is_pending("mdi:home"));

        fixture.module.respond(0, QueryResponse::Success(mdi(&["home"])));
        fixture.scheduler.run_until_idle();
        assert!(updates.borrow().is_empty());
        assert!(!fixture.loader.registry().borrow().icon_exists("mdi:home"));
    }
}

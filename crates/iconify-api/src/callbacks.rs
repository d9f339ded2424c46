//! Load subscriptions.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use iconify_core::IconName;
use iconify_storage::IconRegistry;

use crate::loader::LoaderInner;

/// Progress of one `load_icons` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadUpdate {
    pub loaded: Vec<IconName>,
    pub missing: Vec<IconName>,
    pub pending: Vec<IconName>,
}

impl LoadUpdate {
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Called with the accumulated state each time icons of interest resolve.
pub type LoadCallback = Box<dyn FnMut(&LoadUpdate, &AbortHandle)>;

/// Cancels one `load_icons` registration.
#[derive(Clone)]
pub struct AbortHandle {
    pub(crate) id: Option<u64>,
    pub(crate) cancelled: Rc<Cell<bool>>,
    pub(crate) loader: Weak<LoaderInner>,
}

impl AbortHandle {
    /// A handle with nothing to cancel.
    pub fn detached() -> Self {
        Self {
            id: None,
            cancelled: Rc::new(Cell::new(false)),
            loader: Weak::new(),
        }
    }

    /// Stop further callbacks for this registration.
    ///
    /// Takes effect immediately. If no other subscriber waits for the same
    /// icons, icons not yet sent to the API are dropped from the queue.
    pub fn abort(&self) {
        self.cancelled.set(true);
        if let (Some(id), Some(loader)) = (self.id, self.loader.upgrade()) {
            loader.unsubscribe(id);
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.cancelled.get()
    }
}

impl std::fmt::Debug for AbortHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbortHandle")
            .field("id", &self.id)
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// A stored callback and the icons it waits for.
pub(crate) struct Subscription {
    pub(crate) update: LoadUpdate,
    pub(crate) sources: HashSet<(String, String)>,
    pub(crate) callback: Option<LoadCallback>,
    pub(crate) cancelled: Rc<Cell<bool>>,
}

impl Subscription {
    pub(crate) fn new(update: LoadUpdate, callback: LoadCallback, cancelled: Rc<Cell<bool>>) -> Self {
        let sources = update
            .pending
            .iter()
            .map(|icon| (icon.provider.clone(), icon.prefix.clone()))
            .collect();
        Self {
            update,
            sources,
            callback: Some(callback),
            cancelled,
        }
    }

    /// Move icons that resolved in `registry` out of the pending list.
    ///
    /// Returns `true` if anything changed.
    pub(crate) fn refresh(&mut self, registry: &IconRegistry) -> bool {
        let LoadUpdate {
            loaded,
            missing,
            pending,
        } = &mut self.update;
        let before = pending.len();
        pending.retain(|icon| {
            let Some(storage) = registry.storage(&icon.provider, &icon.prefix) else {
                return true;
            };
            if storage.contains(&icon.name) {
                loaded.push(icon.clone());
                false
            } else if storage.is_missing(&icon.name) {
                missing.push(icon.clone());
                false
            } else {
                true
            }
        });
        pending.len() != before
    }

    pub(crate) fn waits_for(&self, source: &(String, String)) -> bool {
        self.sources.contains(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iconify_core::PartialIcon;

    fn icon(name: &str) -> IconName {
        IconName::new("", "mdi", name)
    }

    #[test]
    fn test_refresh() {
        let mut registry = IconRegistry::new();
        let update = LoadUpdate {
            loaded: vec![icon("a")],
            missing: Vec::new(),
            pending: vec![icon("b"), icon("c"), icon("d")],
        };
        let mut subscription =
            Subscription::new(update, Box::new(|_: &LoadUpdate, _: &AbortHandle| {}), Rc::new(Cell::new(false)));
        assert!(subscription.waits_for(&(String::new(), "mdi".to_string())));
        assert!(!subscription.refresh(&registry));

        registry.add_icon("mdi:b", Some(&PartialIcon::new("<g/>")));
        registry.add_icon("mdi:c", None);
        assert!(subscription.refresh(&registry));
        assert_eq!(subscription.update.loaded, vec![icon("a"), icon("b")]);
        assert_eq!(subscription.update.missing, vec![icon("c")]);
        assert_eq!(subscription.update.pending, vec![icon("d")]);
        assert!(!subscription.update.is_complete());
        assert!(!subscription.refresh(&registry));
    }

    #[test]
    fn test_detached_handle() {
        let handle = AbortHandle::detached();
        assert!(!handle.is_aborted());
        handle.abort();
        assert!(handle.is_aborted());
    }
}

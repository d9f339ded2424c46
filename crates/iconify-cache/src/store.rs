//! Key-value backing stores.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use iconify_core::StoreError;

/// A string key-value store with `localStorage` semantics.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;

    /// Write a value. Fails when the store is read-only or full.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove_item(&mut self, key: &str);
}

#[derive(Debug, Default)]
struct MemoryData {
    items: IndexMap<String, String>,
}

/// In-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<MemoryData>>,
    read_only: Rc<Cell<bool>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes whose total stored size would exceed `bytes`.
    #[must_use]
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn len(&self) -> usize {
        self.data.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().items.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.data.borrow().items.keys().cloned().collect()
    }

    fn size_with(&self, key: &str, value: &str) -> usize {
        self.data
            .borrow()
            .items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.data.borrow().items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.read_only.get() {
            return Err(StoreError::ReadOnly);
        }
        if let Some(quota) = self.quota {
            if self.size_with(key, value) > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        self.data
            .borrow_mut()
            .items
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        if !self.read_only.get() {
            self.data.borrow_mut().items.shift_remove(key);
        }
    }
}

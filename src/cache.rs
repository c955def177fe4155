//! Memory-only, cache-first stores shared by the console's surfaces.
//!
//! Entries live for the lifetime of the process. There is no eviction and no
//! TTL; a key is only ever dropped by an explicit [`ResourceCache::invalidate`]
//! or [`ResourceCache::clear`] issued by a refresh action.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use crate::content::{ContentBlob, ContentKey};
use crate::log_search::LogBlob;
use crate::pagination::{PageKey, PageWindow};
use crate::sync_client::SyncEventDetail;

/// Key/value store with get/put semantics.
///
/// Clones share the same underlying map, so one instance can be handed to
/// several components.
#[derive(Debug)]
pub struct ResourceCache<K, V> {
    entries: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for ResourceCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for ResourceCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, V> ResourceCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn put(&self, key: K, value: V) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    /// Store `value` unless `key` already has an entry; returns the entry kept.
    pub fn put_if_absent(&self, key: K, value: V) -> V {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(value)
            .clone()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Drop one entry so the next read goes back to the network.
    pub fn invalidate(&self, key: &K) -> Option<V> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The four independent caches backing the sync viewer.
#[derive(Debug, Clone, Default)]
pub struct Caches {
    pub pages: ResourceCache<PageKey, PageWindow>,
    pub details: ResourceCache<String, SyncEventDetail>,
    pub content: ResourceCache<ContentKey, ContentBlob>,
    pub logs: ResourceCache<String, LogBlob>,
}

impl Caches {
    pub fn new() -> Self {
        Self::default()
    }
}

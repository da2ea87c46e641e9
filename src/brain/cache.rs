//! Read-through cache for fetched thoughts.
//!
//! Entries live until they are evicted or the cache is cleared; there is no
//! TTL or size bound. Each operation takes the lock only for the map access
//! itself, so concurrent fetches of the same id may both hit the network and
//! the last insert wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

/// Thought payloads keyed by thought id.
#[derive(Debug, Default)]
pub struct ThoughtCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl ThoughtCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached payload for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Stores `value` under `id`, replacing any previous entry.
    pub fn insert(&self, id: &str, value: Value) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), value);
    }

    /// Removes the entry for `id`, if present.
    pub fn evict(&self, id: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached thoughts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Definition caches.
//!
//! Building an HTML or CSS definition walks every schema module, so callers
//! that purify many documents with one configuration keep the result in a
//! cache keyed by [`Config::fingerprint`](crate::Config::fingerprint).
//! The pipeline tolerates misses and caches that never store anything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A get/put/invalidate store of immutable definitions.
pub trait DefinitionCache<D>: Send + Sync {
    /// Look up a definition by fingerprint.
    fn get(&self, fingerprint: &str) -> Option<Arc<D>>;

    /// Store only if nothing is cached under the fingerprint yet.
    /// Returns whether the definition was stored.
    fn add(&self, fingerprint: &str, definition: Arc<D>) -> bool;

    /// Store, overwriting any previous entry. Returns whether it was stored.
    fn set(&self, fingerprint: &str, definition: Arc<D>) -> bool;

    /// Overwrite only an existing entry. Returns whether it was stored.
    fn replace(&self, fingerprint: &str, definition: Arc<D>) -> bool;

    /// Drop every cached definition.
    fn flush(&self);

    /// Number of cached definitions.
    fn len(&self) -> usize;

    /// True when nothing is cached.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process cache guarded by a mutex.
#[derive(Debug)]
pub struct MemoryCache<D> {
    entries: Mutex<HashMap<String, Arc<D>>>,
}

impl<D> Default for MemoryCache<D> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<D> MemoryCache<D> {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<D>>> {
        // Entries are immutable Arcs, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: Send + Sync> DefinitionCache<D> for MemoryCache<D> {
    fn get(&self, fingerprint: &str) -> Option<Arc<D>> {
        self.entries().get(fingerprint).cloned()
    }

    fn add(&self, fingerprint: &str, definition: Arc<D>) -> bool {
        let mut entries = self.entries();
        if entries.contains_key(fingerprint) {
            return false;
        }
        let _ = entries.insert(fingerprint.to_string(), definition);
        true
    }

    fn set(&self, fingerprint: &str, definition: Arc<D>) -> bool {
        let _ = self.entries().insert(fingerprint.to_string(), definition);
        true
    }

    fn replace(&self, fingerprint: &str, definition: Arc<D>) -> bool {
        let mut entries = self.entries();
        match entries.get_mut(fingerprint) {
            Some(slot) => {
                *slot = definition;
                true
            }
            None => false,
        }
    }

    fn flush(&self) {
        self.entries().clear();
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

/// Cache that never stores anything; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCache;

impl<D> DefinitionCache<D> for NoOpCache {
    fn get(&self, _fingerprint: &str) -> Option<Arc<D>> {
        None
    }

    fn add(&self, _fingerprint: &str, _definition: Arc<D>) -> bool {
        false
    }

    fn set(&self, _fingerprint: &str, _definition: Arc<D>) -> bool {
        false
    }

    fn replace(&self, _fingerprint: &str, _definition: Arc<D>) -> bool {
        false
    }

    fn flush(&self) {}

    fn len(&self) -> usize {
        0
    }
}

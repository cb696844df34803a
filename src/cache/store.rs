//! Time-stamped value store shared by the imaging caches.
//!
//! A store is valid for exactly one [`TimeCode`]. Stamping a different time
//! drops every entry; this takes `&mut self`, so it cannot overlap with
//! readers. Between stamps, lookups and inserts go through `&self` and may
//! run from many threads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::core::{ScenePath, TimeCode};

/// Hit/miss counters of a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Thread-safe map from scene path to a value computed for one time.
///
/// Uses `parking_lot::RwLock` for faster, non-poisoning locks
/// and atomics for lock-free hit counting.
pub struct TimedStore<V> {
    time: TimeCode,
    entries: RwLock<HashMap<ScenePath, V>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<V: Clone> TimedStore<V> {
    pub fn new(time: TimeCode) -> Self {
        Self {
            time,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Time the stored values were computed for.
    #[inline]
    pub fn time(&self) -> TimeCode {
        self.time
    }

    /// Stamp a new time. Returns true if the time changed and the store was
    /// invalidated.
    pub fn set_time(&mut self, time: TimeCode) -> bool {
        if self.time == time {
            return false;
        }
        self.time = time;
        self.clear();
        true
    }

    /// Cached value for `path`, if present.
    #[inline]
    pub fn get(&self, path: &ScenePath) -> Option<V> {
        let found = self.entries.read().get(path).cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Insert `value` unless another thread got there first; returns the
    /// value that ends up stored. Entries never change within an epoch.
    pub fn get_or_insert(&self, path: &ScenePath, value: V) -> V {
        let mut entries = self.entries.write();
        entries.entry(path.clone()).or_insert(value).clone()
    }

    /// Drop all entries and counters without changing the time.
    pub fn clear(&mut self) {
        self.entries.get_mut().clear();
        *self.hits.get_mut() = 0;
        *self.misses.get_mut() = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<V: Clone> Default for TimedStore<V> {
    fn default() -> Self {
        Self::new(TimeCode::Default)
    }
}

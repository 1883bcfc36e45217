//! Explicit memoization for queries over the immutable dataset.
//!
//! Entries are never evicted: the dataset cannot change during a process, so a
//! cached value stays correct until restart.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::error::Result;
use crate::utils::prometheus_metrics::{CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL};

/// A named, thread-safe memo table keyed by call parameters.
#[derive(Debug)]
pub struct Memo<K, V> {
    name: &'static str,
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(name: &'static str) -> Self {
        Memo {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        // A poisoned lock only means a writer panicked mid-insert; the map is still usable
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    /// Returns the cached value, or computes and stores it.
    ///
    /// The computation runs outside the lock. If two callers race on the same key
    /// the first stored value wins and both receive it.
    pub fn get_or_try_insert_with<F>(&self, key: K, compute: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(&key) {
            CACHE_HITS_TOTAL.with_label_values(&[self.name]).inc();
            trace!(cache = self.name, "cache hit");
            return Ok(value);
        }
        CACHE_MISSES_TOTAL.with_label_values(&[self.name]).inc();
        trace!(cache = self.name, "cache miss");

        let value = Arc::new(compute()?);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(entries.entry(key).or_insert(value).clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! In-memory response cache
//!
//! Bounded, time-expiring store keyed by request URL. Entries expire lazily
//! on read; when full, the entry with the oldest timestamp is evicted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    timestamp: Instant,
}

/// Bounded cache of decoded provider responses
#[derive(Debug)]
pub struct ResultCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    max_age: Duration,
    max_size: usize,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(max_age: Duration, max_size: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_age,
            max_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        // No operation panics while holding the lock, but don't lose the map if one did
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a value, dropping it if it has outlived `max_age`
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;

        if entry.timestamp.elapsed() > self.max_age {
            trace!(key, "cache entry expired");
            entries.remove(key);
            return None;
        }

        Some(entry.data.clone())
    }

    /// Store a value, evicting the oldest entry when the cache is full
    pub fn set(&self, key: impl Into<String>, data: T) {
        if self.max_size == 0 {
            return;
        }

        let key = key.into();
        let mut entries = self.lock();

        if !entries.contains_key(&key) && entries.len() >= self.max_size {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.timestamp)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                trace!(key = %oldest, "evicting oldest cache entry");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                data,
                timestamp: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

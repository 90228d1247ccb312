//! Transient key-value cache

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Expiring key-value storage shared between requests
pub trait TransientStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String, ttl: Duration);

    fn delete(&self, key: &str);
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Cache entry with value and expiration time
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: u64, // Unix timestamp in seconds
}

impl CacheEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now_secs().saturating_add(ttl.as_secs()),
        }
    }

    fn is_expired(&self) -> bool {
        now_secs() >= self.expires_at
    }
}

/// In-memory transient store
///
/// Writers replace whole entries; the last write wins.
#[derive(Debug, Default)]
pub struct MemoryTransientStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryTransientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included
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

impl TransientStore for MemoryTransientStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), CacheEntry::new(value, ttl));
    }

    fn delete(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

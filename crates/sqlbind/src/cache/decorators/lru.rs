// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Least-recently-used eviction, the default eviction decorator.

use crate::cache::{Cache, CacheKey};
use crate::error::BuilderError;
use crate::value::Value;
use lru::LruCache as KeyTracker;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

const DEFAULT_SIZE: usize = 1024;

/// Tracks key recency and evicts the coldest entry from the delegate once
/// the configured size is exceeded.
pub struct LruCache {
    delegate: Box<dyn Cache>,
    keys: Mutex<KeyTracker<CacheKey, ()>>,
}

impl LruCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            keys: Mutex::new(KeyTracker::new(capacity(DEFAULT_SIZE))),
        }
    }

    pub fn set_size(&self, size: usize) {
        *self.keys.lock() = KeyTracker::new(capacity(size));
    }
}

fn capacity(size: usize) -> NonZeroUsize {
    NonZeroUsize::new(size.max(1)).unwrap_or(NonZeroUsize::MIN)
}

impl Cache for LruCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put(&self, key: CacheKey, value: Value) {
        let evicted = self.keys.lock().push(key.clone(), ());
        self.delegate.put(key.clone(), value);
        if let Some((old, ())) = evicted {
            if old != key {
                self.delegate.remove(&old);
            }
        }
    }

    fn get(&self, key: &CacheKey) -> Option<Value> {
        // touch recency even on delegate miss
        self.keys.lock().get(key);
        self.delegate.get(key)
    }

    fn remove(&self, key: &CacheKey) {
        self.keys.lock().pop(key);
        self.delegate.remove(key);
    }

    fn clear(&self) {
        self.keys.lock().clear();
        self.delegate.clear();
    }

    fn len(&self) -> usize {
        self.delegate.len()
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<bool, BuilderError> {
        if name == "size" {
            let size: usize = value.parse().map_err(|_| BuilderError::InvalidValue {
                key: name.to_string(),
                value: value.to_string(),
                expected: "positive integer",
            })?;
            self.set_size(size);
            return Ok(true);
        }
        self.delegate.set_property(name, value)
    }
}

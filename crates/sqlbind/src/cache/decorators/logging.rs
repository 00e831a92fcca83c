// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Hit-ratio logging.

use crate::cache::{Cache, CacheKey};
use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct LoggingCache {
    delegate: Box<dyn Cache>,
    requests: AtomicU64,
    hits: AtomicU64,
}

impl LoggingCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            requests: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    pub fn hit_ratio(&self) -> f64 {
        let requests = self.requests.load(Ordering::Relaxed);
        if requests == 0 {
            return 0.0;
        }
        self.hits.load(Ordering::Relaxed) as f64 / requests as f64
    }
}

impl Cache for LoggingCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.delegate.put(key, value);
    }

    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let value = self.delegate.get(key);
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        log::debug!(
            "[cache] '{}' hit ratio {:.3}",
            self.delegate.id(),
            self.hit_ratio()
        );
        value
    }

    fn remove(&self, key: &CacheKey) {
        self.delegate.remove(key);
    }

    fn clear(&self) {
        self.delegate.clear();
    }

    fn len(&self) -> usize {
        self.delegate.len()
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<bool, crate::error::BuilderError> {
        self.delegate.set_property(name, value)
    }
}

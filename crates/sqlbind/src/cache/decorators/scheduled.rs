// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Interval-based flushing, checked on access.

use crate::cache::{Cache, CacheKey};
use crate::value::Value;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

pub struct ScheduledCache {
    delegate: Box<dyn Cache>,
    clear_interval: Duration,
    last_clear: Mutex<Instant>,
}

impl ScheduledCache {
    pub fn new(delegate: Box<dyn Cache>, clear_interval: Duration) -> Self {
        Self {
            delegate,
            clear_interval,
            last_clear: Mutex::new(Instant::now()),
        }
    }

    fn clear_when_stale(&self) -> bool {
        let mut last = self.last_clear.lock();
        if last.elapsed() >= self.clear_interval {
            *last = Instant::now();
            drop(last);
            self.delegate.clear();
            return true;
        }
        false
    }
}

impl Cache for ScheduledCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.clear_when_stale();
        self.delegate.put(key, value);
    }

    fn get(&self, key: &CacheKey) -> Option<Value> {
        if self.clear_when_stale() {
            return None;
        }
        self.delegate.get(key)
    }

    fn remove(&self, key: &CacheKey) {
        self.clear_when_stale();
        self.delegate.remove(key);
    }

    fn clear(&self) {
        *self.last_clear.lock() = Instant::now();
        self.delegate.clear();
    }

    fn len(&self) -> usize {
        self.delegate.len()
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<bool, crate::error::BuilderError> {
        self.delegate.set_property(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PerpetualCache;
    use std::thread;

    fn key(n: i64) -> CacheKey {
        let mut k = CacheKey::new();
        k.update(Value::Int(n));
        k
    }

    #[test]
    fn test_flushes_after_interval() {
        let cache = ScheduledCache::new(
            Box::new(PerpetualCache::new("demo")),
            Duration::from_millis(20),
        );
        cache.put(key(1), Value::Int(1));
        assert!(cache.get(&key(1)).is_some());
        thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.is_empty());
    }
}

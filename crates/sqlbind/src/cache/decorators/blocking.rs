// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Per-key blocking: only one thread computes a missing entry.
//!
//! A miss leaves the key's latch held by the missing reader; the following
//! `put` (or `remove`) for that key releases it. Other readers of the same
//! key wait, bounded by the configured timeout. A timed-out waiter gives up
//! the latch and reads through.

use crate::cache::{Cache, CacheKey};
use crate::error::BuilderError;
use crate::value::Value;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Latch {
    held: Mutex<bool>,
    released: Condvar,
}

impl Latch {
    fn new() -> Self {
        Self {
            held: Mutex::new(false),
            released: Condvar::new(),
        }
    }
}

pub struct BlockingCache {
    delegate: Box<dyn Cache>,
    latches: DashMap<CacheKey, Arc<Latch>>,
    /// Wait bound in milliseconds; 0 waits indefinitely.
    timeout_ms: AtomicU64,
}

impl BlockingCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            latches: DashMap::new(),
            timeout_ms: AtomicU64::new(0),
        }
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout_ms
            .store(timeout.as_millis() as u64, Ordering::Relaxed);
    }

    /// Returns false when the wait timed out without the latch being freed.
    fn acquire(&self, key: &CacheKey) -> bool {
        let latch = {
            let entry = self
                .latches
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Latch::new()));
            Arc::clone(entry.value())
        };
        let timeout_ms = self.timeout_ms.load(Ordering::Relaxed);
        let mut held = latch.held.lock();
        while *held {
            if timeout_ms == 0 {
                latch.released.wait(&mut held);
            } else if latch
                .released
                .wait_for(&mut held, Duration::from_millis(timeout_ms))
                .timed_out()
                && *held
            {
                log::warn!(
                    "[cache] '{}' blocked longer than {}ms waiting for a computing reader",
                    self.delegate.id(),
                    timeout_ms
                );
                return false;
            }
        }
        *held = true;
        true
    }

    fn release(&self, key: &CacheKey) {
        if let Some(latch) = self.latches.get(key).map(|e| Arc::clone(e.value())) {
            let mut held = latch.held.lock();
            *held = false;
            latch.released.notify_one();
        }
    }
}

impl Cache for BlockingCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.delegate.put(key.clone(), value);
        self.release(&key);
    }

    fn get(&self, key: &CacheKey) -> Option<Value> {
        if !self.acquire(key) {
            return self.delegate.get(key);
        }
        let value = self.delegate.get(key);
        if value.is_some() {
            self.release(key);
        }
        value
    }

    fn remove(&self, key: &CacheKey) {
        // release the computing reader's latch; the entry itself stays
        self.release(key);
    }

    fn clear(&self) {
        self.delegate.clear();
    }

    fn len(&self) -> usize {
        self.delegate.len()
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<bool, BuilderError> {
        if name == "timeout" {
            let ms: u64 = value.parse().map_err(|_| BuilderError::InvalidValue {
                key: name.to_string(),
                value: value.to_string(),
                expected: "milliseconds",
            })?;
            self.set_timeout(Duration::from_millis(ms));
            return Ok(true);
        }
        self.delegate.set_property(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PerpetualCache;
    use std::thread;
    use std::time::Instant;

    fn key(n: i64) -> CacheKey {
        let mut k = CacheKey::new();
        k.update(Value::Int(n));
        k
    }

    #[test]
    fn test_second_reader_waits_for_put() {
        let cache = Arc::new(BlockingCache::new(Box::new(PerpetualCache::new("demo"))));
        // first miss holds the latch
        assert!(cache.get(&key(1)).is_none());

        let shared = Arc::clone(&cache);
        let reader = thread::spawn(move || {
            let start = Instant::now();
            let value = shared.get(&key(1));
            (value, start.elapsed())
        });

        thread::sleep(Duration::from_millis(30));
        cache.put(key(1), Value::Int(42));

        let (value, waited) = reader.join().unwrap();
        assert_eq!(value, Some(Value::Int(42)));
        assert!(waited >= Duration::from_millis(20));
    }

    #[test]
    fn test_timed_out_reader_reads_through() {
        let cache = BlockingCache::new(Box::new(PerpetualCache::new("demo")));
        cache.set_timeout(Duration::from_millis(10));
        assert!(cache.get(&key(1)).is_none()); // latch held
        let start = Instant::now();
        assert!(cache.get(&key(1)).is_none()); // times out, reads through
        assert!(start.elapsed() >= Duration::from_millis(9));
    }
}

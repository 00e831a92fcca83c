// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Serializes compound operations across the decorated chain.

use crate::cache::{Cache, CacheKey};
use crate::value::Value;
use parking_lot::Mutex;

pub struct SynchronizedCache {
    delegate: Box<dyn Cache>,
    lock: Mutex<()>,
}

impl SynchronizedCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            lock: Mutex::new(()),
        }
    }
}

impl Cache for SynchronizedCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put(&self, key: CacheKey, value: Value) {
        let _guard = self.lock.lock();
        self.delegate.put(key, value);
    }

    fn get(&self, key: &CacheKey) -> Option<Value> {
        let _guard = self.lock.lock();
        self.delegate.get(key)
    }

    fn remove(&self, key: &CacheKey) {
        let _guard = self.lock.lock();
        self.delegate.remove(key);
    }

    fn clear(&self) {
        let _guard = self.lock.lock();
        self.delegate.clear();
    }

    fn len(&self) -> usize {
        let _guard = self.lock.lock();
        self.delegate.len()
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<bool, crate::error::BuilderError> {
        self.delegate.set_property(name, value)
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! First-in-first-out eviction.

use crate::cache::{Cache, CacheKey};
use crate::error::BuilderError;
use crate::value::Value;
use parking_lot::Mutex;
use std::collections::VecDeque;

const DEFAULT_SIZE: usize = 1024;

pub struct FifoCache {
    delegate: Box<dyn Cache>,
    inner: Mutex<Inner>,
}

struct Inner {
    order: VecDeque<CacheKey>,
    size: usize,
}

impl FifoCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            inner: Mutex::new(Inner {
                order: VecDeque::new(),
                size: DEFAULT_SIZE,
            }),
        }
    }
}

impl Cache for FifoCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put(&self, key: CacheKey, value: Value) {
        let expelled = {
            let mut inner = self.inner.lock();
            inner.order.push_back(key.clone());
            if inner.order.len() > inner.size {
                inner.order.pop_front()
            } else {
                None
            }
        };
        if let Some(old) = expelled {
            self.delegate.remove(&old);
        }
        self.delegate.put(key, value);
    }

    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.delegate.get(key)
    }

    fn remove(&self, key: &CacheKey) {
        let mut inner = self.inner.lock();
        inner.order.retain(|k| k != key);
        drop(inner);
        self.delegate.remove(key);
    }

    fn clear(&self) {
        self.inner.lock().order.clear();
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
            self.inner.lock().size = size.max(1);
            return Ok(true);
        }
        self.delegate.set_property(name, value)
    }
}

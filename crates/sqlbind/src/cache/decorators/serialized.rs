// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Copy-on-read isolation for read/write caches.
//!
//! Values are stored serialized; every reader deserializes a private copy,
//! so callers can mutate what they get back without corrupting the cache.

use crate::cache::{Cache, CacheKey};
use crate::value::Value;

pub struct SerializedCache {
    delegate: Box<dyn Cache>,
}

impl SerializedCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self { delegate }
    }
}

impl Cache for SerializedCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put(&self, key: CacheKey, value: Value) {
        match serde_json::to_string(&value) {
            Ok(serialized) => self.delegate.put(key, Value::Str(serialized)),
            Err(e) => {
                log::debug!("[cache] '{}' value not serializable: {}", self.delegate.id(), e);
            }
        }
    }

    fn get(&self, key: &CacheKey) -> Option<Value> {
        match self.delegate.get(key)? {
            Value::Str(serialized) => serde_json::from_str(&serialized).ok(),
            other => Some(other),
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PerpetualCache;

    #[test]
    fn test_readers_get_independent_copies() {
        let cache = SerializedCache::new(Box::new(PerpetualCache::new("demo")));
        let mut key = CacheKey::new();
        key.update(Value::Int(1));

        let mut stored = Value::object("demo.User");
        stored.set_slot("name", Value::Str("ada".into()));
        cache.put(key.clone(), stored.clone());

        let mut first = cache.get(&key).unwrap();
        assert_eq!(first, stored);
        first.set_slot("name", Value::Str("hacked".into()));

        let second = cache.get(&key).unwrap();
        assert_eq!(second, stored);
    }
}

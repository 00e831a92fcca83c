// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Unbounded in-memory cache, the default base implementation.

use super::{Cache, CacheKey};
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;

pub struct PerpetualCache {
    id: String,
    store: RwLock<HashMap<CacheKey, Value>>,
}

impl PerpetualCache {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Cache for PerpetualCache {
    fn id(&self) -> &str {
        &self.id
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.store.write().insert(key, value);
    }

    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.store.read().get(key).cloned()
    }

    fn remove(&self, key: &CacheKey) {
        self.store.write().remove(key);
    }

    fn clear(&self) {
        self.store.write().clear();
    }

    fn len(&self) -> usize {
        self.store.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: i64) -> CacheKey {
        let mut k = CacheKey::new();
        k.update(Value::Int(n));
        k
    }

    #[test]
    fn test_put_get_remove() {
        let cache = PerpetualCache::new("demo.UserMapper");
        cache.put(key(1), Value::Str("one".into()));
        assert_eq!(cache.get(&key(1)), Some(Value::Str("one".into())));
        assert_eq!(cache.len(), 1);
        cache.remove(&key(1));
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = PerpetualCache::new("demo");
        cache.put(key(1), Value::Int(1));
        cache.put(key(2), Value::Int(2));
        cache.clear();
        assert!(cache.is_empty());
    }
}

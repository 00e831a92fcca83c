// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Declarative cache assembly.
//!
//! A `<cache>` declaration names a base implementation and an eviction
//! policy; the builder layers the remaining decorators in a fixed order:
//! base, eviction, scheduled flush, synchronized, logging, serialized
//! access, blocking.

use super::decorators::{
    BlockingCache, FifoCache, LoggingCache, LruCache, ScheduledCache, SerializedCache,
    SynchronizedCache,
};
use super::{Cache, PerpetualCache};
use crate::error::BuilderError;
use crate::value::Properties;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

type BaseCtor = Arc<dyn Fn(String) -> Box<dyn Cache> + Send + Sync>;
type EvictionCtor = Arc<dyn Fn(Box<dyn Cache>) -> Box<dyn Cache> + Send + Sync>;

/// Named constructors for the `type` and `eviction` cache attributes.
pub struct CacheProviders {
    bases: DashMap<String, BaseCtor>,
    evictions: DashMap<String, EvictionCtor>,
}

impl CacheProviders {
    pub fn new() -> Self {
        let providers = Self {
            bases: DashMap::new(),
            evictions: DashMap::new(),
        };
        providers.register_base("PERPETUAL", Arc::new(|id| Box::new(PerpetualCache::new(id))));
        providers.register_eviction("LRU", Arc::new(|delegate| Box::new(LruCache::new(delegate))));
        providers.register_eviction("FIFO", Arc::new(|delegate| Box::new(FifoCache::new(delegate))));
        providers
    }

    pub fn register_base(&self, name: &str, ctor: BaseCtor) {
        self.bases.insert(name.to_uppercase(), ctor);
    }

    pub fn register_eviction(&self, name: &str, ctor: EvictionCtor) {
        self.evictions.insert(name.to_uppercase(), ctor);
    }

    fn base(&self, name: &str) -> Result<BaseCtor, BuilderError> {
        self.bases
            .get(&name.to_uppercase())
            .map(|e| Arc::clone(e.value()))
            .ok_or(BuilderError::UnknownProvider {
                kind: "cache implementation",
                name: name.to_string(),
            })
    }

    fn eviction(&self, name: &str) -> Result<EvictionCtor, BuilderError> {
        self.evictions
            .get(&name.to_uppercase())
            .map(|e| Arc::clone(e.value()))
            .ok_or(BuilderError::UnknownProvider {
                kind: "cache eviction",
                name: name.to_string(),
            })
    }
}

impl Default for CacheProviders {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CacheBuilder {
    id: String,
    implementation: Option<String>,
    eviction: Option<String>,
    clear_interval: Option<Duration>,
    size: Option<usize>,
    read_write: bool,
    blocking: bool,
    logging: bool,
    properties: Properties,
}

impl CacheBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            implementation: None,
            eviction: None,
            clear_interval: None,
            size: None,
            read_write: true,
            blocking: false,
            logging: true,
            properties: Properties::new(),
        }
    }

    pub fn implementation(mut self, name: Option<String>) -> Self {
        self.implementation = name;
        self
    }

    pub fn eviction(mut self, name: Option<String>) -> Self {
        self.eviction = name;
        self
    }

    pub fn clear_interval(mut self, interval: Option<Duration>) -> Self {
        self.clear_interval = interval;
        self
    }

    pub fn size(mut self, size: Option<usize>) -> Self {
        self.size = size;
        self
    }

    pub fn read_write(mut self, read_write: bool) -> Self {
        self.read_write = read_write;
        self
    }

    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn build(self, providers: &CacheProviders) -> Result<Arc<dyn Cache>, BuilderError> {
        let base_name = self.implementation.as_deref().unwrap_or("PERPETUAL");
        let mut cache = providers.base(base_name)?(self.id.clone());
        apply_properties(cache.as_mut(), &self.properties)?;

        let eviction_name = self.eviction.as_deref().unwrap_or("LRU");
        cache = providers.eviction(eviction_name)?(cache);
        if let Some(size) = self.size {
            cache.set_property("size", &size.to_string())?;
        }
        apply_properties(cache.as_mut(), &self.properties)?;

        if let Some(interval) = self.clear_interval {
            cache = Box::new(ScheduledCache::new(cache, interval));
        }
        cache = Box::new(SynchronizedCache::new(cache));
        if self.logging {
            cache = Box::new(LoggingCache::new(cache));
        }
        if self.read_write {
            cache = Box::new(SerializedCache::new(cache));
        }
        if self.blocking {
            let mut blocking = Box::new(BlockingCache::new(cache));
            apply_properties(blocking.as_mut(), &self.properties)?;
            cache = blocking;
        }
        Ok(Arc::from(cache))
    }
}

/// Capability probe: each recognized key is assigned, the rest are left for
/// other layers.
fn apply_properties(cache: &mut dyn Cache, properties: &Properties) -> Result<(), BuilderError> {
    for (name, value) in properties {
        let _ = cache.set_property(name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKey;
    use crate::value::Value;

    fn key(n: i64) -> CacheKey {
        let mut k = CacheKey::new();
        k.update(Value::Int(n));
        k
    }

    #[test]
    fn test_default_chain_roundtrips() {
        let cache = CacheBuilder::new("demo.UserMapper")
            .build(&CacheProviders::new())
            .unwrap();
        assert_eq!(cache.id(), "demo.UserMapper");
        cache.put(key(1), Value::Str("v".into()));
        assert_eq!(cache.get(&key(1)), Some(Value::Str("v".into())));
    }

    #[test]
    fn test_size_property_applies_to_eviction_layer() {
        let cache = CacheBuilder::new("demo")
            .size(Some(1))
            .build(&CacheProviders::new())
            .unwrap();
        cache.put(key(1), Value::Int(1));
        cache.put(key(2), Value::Int(2));
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.get(&key(2)).is_some());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(CacheBuilder::new("demo")
            .implementation(Some("MYSTERY".into()))
            .build(&CacheProviders::new())
            .is_err());
        assert!(CacheBuilder::new("demo")
            .eviction(Some("RANDOM".into()))
            .build(&CacheProviders::new())
            .is_err());
    }

    #[test]
    fn test_read_write_cache_hands_out_copies() {
        let cache = CacheBuilder::new("demo")
            .read_write(true)
            .build(&CacheProviders::new())
            .unwrap();
        let mut stored = Value::object("demo.User");
        stored.set_slot("n", Value::Int(1));
        cache.put(key(1), stored.clone());
        let mut copy = cache.get(&key(1)).unwrap();
        copy.set_slot("n", Value::Int(9));
        assert_eq!(cache.get(&key(1)).unwrap(), stored);
    }

    #[test]
    fn test_bad_coercion_surfaces() {
        let mut props = Properties::new();
        props.insert("size".into(), "huge".into());
        assert!(CacheBuilder::new("demo")
            .properties(props)
            .build(&CacheProviders::new())
            .is_err());
    }
}

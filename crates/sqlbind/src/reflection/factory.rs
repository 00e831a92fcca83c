// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Concurrent cache of per-type accessor metadata.

use super::reflector::ClassMeta;
use crate::error::ReflectionError;
use crate::schema::{TypeKey, TypeSchema};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Builds and caches [`ClassMeta`] instances.
///
/// Lookups are safe from any thread. A miss may race with another thread's
/// construction; both build equivalent metadata and either instance wins.
pub struct ReflectorFactory {
    schema: Arc<TypeSchema>,
    cache: DashMap<TypeKey, Arc<ClassMeta>>,
    cache_enabled: AtomicBool,
}

impl ReflectorFactory {
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self {
            schema,
            cache: DashMap::new(),
            cache_enabled: AtomicBool::new(true),
        }
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled.load(Ordering::Relaxed)
    }

    pub fn set_cache_enabled(&self, enabled: bool) {
        self.cache_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn find_for_type(&self, type_name: &str) -> Result<Arc<ClassMeta>, ReflectionError> {
        if !self.is_cache_enabled() {
            return Ok(Arc::new(ClassMeta::new(&self.schema, type_name)?));
        }
        if let Some(hit) = self.cache.get(type_name) {
            return Ok(Arc::clone(hit.value()));
        }
        let built = Arc::new(ClassMeta::new(&self.schema, type_name)?);
        let key: TypeKey = Arc::from(type_name);
        self.cache.insert(key, Arc::clone(&built));
        Ok(built)
    }
}

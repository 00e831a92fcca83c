// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Type-handler registrations.
//!
//! Handler execution lives outside the core; the registry tracks which
//! handler converts between a declared host type and a JDBC type so that
//! mapping declarations can be validated and resolved.

use super::jdbc::JdbcType;
use crate::schema::TypeRef;
use dashmap::DashMap;
use std::sync::Arc;

/// One registered handler: converter name plus the pair it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHandlerDescriptor {
    pub name: String,
    pub java_type: Option<TypeRef>,
    pub jdbc_type: Option<JdbcType>,
}

impl TypeHandlerDescriptor {
    pub fn new(name: impl Into<String>, java_type: Option<TypeRef>, jdbc_type: Option<JdbcType>) -> Self {
        Self {
            name: name.into(),
            java_type,
            jdbc_type,
        }
    }
}

pub struct TypeHandlerRegistry {
    by_pair: DashMap<(String, Option<JdbcType>), Arc<TypeHandlerDescriptor>>,
    by_name: DashMap<String, Arc<TypeHandlerDescriptor>>,
}

impl TypeHandlerRegistry {
    pub fn new() -> Self {
        let registry = Self {
            by_pair: DashMap::new(),
            by_name: DashMap::new(),
        };
        registry.seed();
        registry
    }

    fn seed(&self) {
        let builtin_pairs: &[(&str, JdbcType)] = &[
            ("boolean", JdbcType::Boolean),
            ("byte", JdbcType::TinyInt),
            ("short", JdbcType::SmallInt),
            ("int", JdbcType::Integer),
            ("long", JdbcType::BigInt),
            ("float", JdbcType::Real),
            ("double", JdbcType::Double),
            ("char", JdbcType::Char),
            ("string", JdbcType::Varchar),
            ("date", JdbcType::Timestamp),
            ("decimal", JdbcType::Decimal),
            ("bigdecimal", JdbcType::Decimal),
            ("biginteger", JdbcType::Numeric),
            ("object", JdbcType::Other),
        ];
        for (java, jdbc) in builtin_pairs {
            let descriptor = TypeHandlerDescriptor::new(
                format!("{}.handler", java),
                Some(TypeRef::concrete(java)),
                Some(*jdbc),
            );
            self.register(descriptor);
        }
    }

    pub fn register(&self, descriptor: TypeHandlerDescriptor) {
        let stored = Arc::new(descriptor);
        self.by_name.insert(stored.name.clone(), Arc::clone(&stored));
        if let Some(java) = stored.java_type.as_ref().and_then(TypeRef::raw_name) {
            self.by_pair
                .insert((java.to_string(), stored.jdbc_type), Arc::clone(&stored));
            // untyped fallback for the first handler covering a host type
            let untyped = (java.to_string(), None);
            self.by_pair.entry(untyped).or_insert(stored);
        }
    }

    /// Handler for a host/JDBC pair, falling back to the untyped entry.
    pub fn resolve(
        &self,
        java_type: &str,
        jdbc_type: Option<JdbcType>,
    ) -> Option<Arc<TypeHandlerDescriptor>> {
        let exact = (java_type.to_string(), jdbc_type);
        if let Some(hit) = self.by_pair.get(&exact) {
            return Some(Arc::clone(hit.value()));
        }
        if jdbc_type.is_some() {
            let fallback = (java_type.to_string(), None);
            if let Some(hit) = self.by_pair.get(&fallback) {
                return Some(Arc::clone(hit.value()));
            }
        }
        None
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<TypeHandlerDescriptor>> {
        self.by_name.get(name).map(|hit| Arc::clone(hit.value()))
    }

    pub fn has_handler(&self, java_type: &str) -> bool {
        self.by_pair.contains_key(&(java_type.to_string(), None))
    }
}

impl Default for TypeHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

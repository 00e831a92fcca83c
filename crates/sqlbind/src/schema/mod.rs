// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Pre-extracted host-type schema.
//!
//! Rust has no runtime reflection, so the reflection engine operates on a
//! schema supplied by the caller: one [`TypeDef`] per host type, with
//! declared fields, methods, and generic parameterization. The type grammar
//! ([`TypeRef`]) carries variables, parameterization, arrays, and wildcards
//! so that generic resolution can walk inheritance chains the same way a
//! reflective runtime would.

mod types;

pub use types::{FieldDef, MethodDef, TypeDef, TypeDefKind, TypeParamDef, TypeRef};

use crate::error::ReflectionError;
use dashmap::DashMap;
use std::sync::Arc;

/// Interned type name, e.g. `demo.User`.
pub type TypeKey = Arc<str>;

/// Well-known builtin type names seeded into every schema.
pub mod builtin {
    pub const OBJECT: &str = "object";
    pub const STRING: &str = "string";
    pub const BOOLEAN: &str = "boolean";
    pub const BYTE: &str = "byte";
    pub const SHORT: &str = "short";
    pub const INT: &str = "int";
    pub const LONG: &str = "long";
    pub const FLOAT: &str = "float";
    pub const DOUBLE: &str = "double";
    pub const CHAR: &str = "char";
    pub const DATE: &str = "date";
    pub const DECIMAL: &str = "decimal";
    pub const BIG_DECIMAL: &str = "bigdecimal";
    pub const BIG_INTEGER: &str = "biginteger";
    pub const COLLECTION: &str = "collection";
    pub const LIST: &str = "list";
    pub const ARRAY_LIST: &str = "arraylist";
    pub const ITERATOR: &str = "iterator";
    pub const MAP: &str = "map";
    pub const HASH_MAP: &str = "hashmap";
    pub const RESULT_SET: &str = "resultset";
    pub const TYPE_HANDLER: &str = "typehandler";

    pub const PRIMITIVES: &[&str] = &[
        BOOLEAN, BYTE, SHORT, INT, LONG, FLOAT, DOUBLE, CHAR,
    ];
}

/// Registry of host-type definitions.
///
/// Lookups are concurrent; definitions are immutable once registered.
pub struct TypeSchema {
    defs: DashMap<TypeKey, Arc<TypeDef>>,
}

impl TypeSchema {
    /// Creates a schema pre-seeded with the builtin definitions.
    pub fn new() -> Self {
        let schema = Self {
            defs: DashMap::new(),
        };
        schema.seed_builtins();
        schema
    }

    fn seed_builtins(&self) {
        use builtin::*;
        self.register(TypeDef::class(OBJECT).root());
        for name in PRIMITIVES {
            self.register(TypeDef::class(name));
        }
        for name in [STRING, DATE, DECIMAL, BIG_DECIMAL, BIG_INTEGER, RESULT_SET] {
            self.register(TypeDef::class(name));
        }
        self.register(
            TypeDef::interface(COLLECTION).type_param("E", vec![]),
        );
        self.register(
            TypeDef::interface(LIST)
                .type_param("E", vec![])
                .implements(TypeRef::parameterized(
                    COLLECTION,
                    vec![TypeRef::variable("E", LIST)],
                )),
        );
        self.register(
            TypeDef::class(ARRAY_LIST)
                .type_param("E", vec![])
                .implements(TypeRef::parameterized(
                    LIST,
                    vec![TypeRef::variable("E", ARRAY_LIST)],
                )),
        );
        self.register(
            TypeDef::interface(ITERATOR).type_param("E", vec![]),
        );
        self.register(
            TypeDef::interface(MAP)
                .type_param("K", vec![])
                .type_param("V", vec![]),
        );
        self.register(
            TypeDef::class(HASH_MAP)
                .type_param("K", vec![])
                .type_param("V", vec![])
                .implements(TypeRef::parameterized(
                    MAP,
                    vec![
                        TypeRef::variable("K", HASH_MAP),
                        TypeRef::variable("V", HASH_MAP),
                    ],
                )),
        );
        self.register(TypeDef::interface(TYPE_HANDLER));
    }

    /// Registers a definition, returning the stored handle.
    ///
    /// Re-registering a name replaces the previous definition; callers are
    /// expected to assemble the schema before handing it to the engine.
    pub fn register(&self, def: TypeDef) -> Arc<TypeDef> {
        let stored = Arc::new(def);
        self.defs.insert(Arc::clone(&stored.name), Arc::clone(&stored));
        stored
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<TypeDef>> {
        self.defs.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Lookup that surfaces a reflection error for unknown names.
    pub fn require(&self, name: &str) -> Result<Arc<TypeDef>, ReflectionError> {
        self.lookup(name).ok_or_else(|| ReflectionError::UnknownType {
            name: name.to_string(),
        })
    }

    /// Whether `sub` is the same type as, or a subtype of, `sup`.
    ///
    /// Walks the superclass chain and all transitive interfaces; `object`
    /// is assignable from everything.
    pub fn is_assignable(&self, sub: &str, sup: &str) -> bool {
        if sub == sup || sup == builtin::OBJECT {
            return true;
        }
        let Some(def) = self.lookup(sub) else {
            return false;
        };
        if let Some(parent) = def.superclass.as_ref().and_then(TypeRef::raw_name) {
            if self.is_assignable(parent, sup) {
                return true;
            }
        }
        def.interfaces
            .iter()
            .filter_map(TypeRef::raw_name)
            .any(|iface| self.is_assignable(iface, sup))
    }

    pub fn is_collection(&self, name: &str) -> bool {
        self.is_assignable(name, builtin::COLLECTION)
    }

    pub fn is_map(&self, name: &str) -> bool {
        self.is_assignable(name, builtin::MAP)
    }

    /// All definitions whose name sits under `prefix` (dot-separated).
    ///
    /// Used by package scanning for alias and type-handler registration.
    pub fn types_in_package(&self, prefix: &str) -> Vec<Arc<TypeDef>> {
        let qualified = format!("{}.", prefix);
        let mut found: Vec<Arc<TypeDef>> = self
            .defs
            .iter()
            .filter(|entry| entry.key().starts_with(&qualified))
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}

impl Default for TypeSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_present() {
        let schema = TypeSchema::new();
        assert!(schema.contains(builtin::OBJECT));
        assert!(schema.contains(builtin::INT));
        assert!(schema.contains(builtin::HASH_MAP));
    }

    #[test]
    fn test_assignability_through_interfaces() {
        let schema = TypeSchema::new();
        assert!(schema.is_assignable(builtin::ARRAY_LIST, builtin::COLLECTION));
        assert!(schema.is_assignable(builtin::HASH_MAP, builtin::MAP));
        assert!(!schema.is_assignable(builtin::HASH_MAP, builtin::COLLECTION));
        assert!(schema.is_assignable(builtin::STRING, builtin::OBJECT));
    }

    #[test]
    fn test_user_type_chain() {
        let schema = TypeSchema::new();
        schema.register(TypeDef::class("demo.Animal"));
        schema.register(TypeDef::class("demo.Dog").extends(TypeRef::concrete("demo.Animal")));
        assert!(schema.is_assignable("demo.Dog", "demo.Animal"));
        assert!(!schema.is_assignable("demo.Animal", "demo.Dog"));
    }

    #[test]
    fn test_package_scan_sorted() {
        let schema = TypeSchema::new();
        schema.register(TypeDef::class("demo.B"));
        schema.register(TypeDef::class("demo.A"));
        schema.register(TypeDef::class("other.C"));
        let names: Vec<_> = schema
            .types_in_package("demo")
            .into_iter()
            .map(|d| d.name.to_string())
            .collect();
        assert_eq!(names, vec!["demo.A", "demo.B"]);
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Case-insensitive alias to type mapping.

use crate::error::TypeAliasError;
use crate::schema::{builtin, TypeDefKind, TypeRef, TypeSchema};
use dashmap::DashMap;
use std::sync::Arc;

/// Maps short names to declared types.
///
/// Keys are case-insensitive. Re-registering an alias with a different
/// target is an error; re-registering the same target is idempotent.
/// Unknown aliases fall back to a fully qualified schema lookup.
pub struct TypeAliasRegistry {
    schema: Arc<TypeSchema>,
    aliases: DashMap<String, TypeRef>,
}

impl TypeAliasRegistry {
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        let registry = Self {
            schema,
            aliases: DashMap::new(),
        };
        registry.seed();
        registry
    }

    fn seed(&self) {
        let scalar_aliases: &[(&str, &str)] = &[
            ("byte", builtin::BYTE),
            ("short", builtin::SHORT),
            ("int", builtin::INT),
            ("integer", builtin::INT),
            ("long", builtin::LONG),
            ("float", builtin::FLOAT),
            ("double", builtin::DOUBLE),
            ("boolean", builtin::BOOLEAN),
            ("char", builtin::CHAR),
            ("character", builtin::CHAR),
            ("string", builtin::STRING),
        ];
        for (alias, target) in scalar_aliases {
            self.force(alias, TypeRef::concrete(target));
            self.force(
                &format!("{}[]", alias),
                TypeRef::array(TypeRef::concrete(target)),
            );
        }
        let plain: &[&str] = &[
            builtin::DATE,
            builtin::DECIMAL,
            builtin::BIG_DECIMAL,
            builtin::BIG_INTEGER,
            builtin::OBJECT,
            builtin::MAP,
            builtin::HASH_MAP,
            builtin::LIST,
            builtin::ARRAY_LIST,
            builtin::COLLECTION,
            builtin::ITERATOR,
        ];
        for name in plain {
            self.force(name, TypeRef::concrete(name));
        }
        self.force("resultset", TypeRef::concrete(builtin::RESULT_SET));
    }

    fn force(&self, alias: &str, ty: TypeRef) {
        self.aliases.insert(alias.to_lowercase(), ty);
    }

    pub fn register(&self, alias: &str, ty: TypeRef) -> Result<(), TypeAliasError> {
        let key = alias.to_lowercase();
        if let Some(existing) = self.aliases.get(&key) {
            if *existing.value() == ty {
                return Ok(());
            }
            return Err(TypeAliasError::Duplicate {
                alias: alias.to_string(),
                existing: existing.value().to_string(),
                proposed: ty.to_string(),
            });
        }
        self.aliases.insert(key, ty);
        Ok(())
    }

    /// Registers a type under its simple name.
    pub fn register_type(&self, type_name: &str) -> Result<(), TypeAliasError> {
        let simple = type_name.rsplit('.').next().unwrap_or(type_name);
        self.register(simple, TypeRef::concrete(type_name))
    }

    /// Registers every concrete, non-inner, non-anonymous class under
    /// `prefix`, optionally restricted to subtypes of `super_type`.
    pub fn register_package(
        &self,
        prefix: &str,
        super_type: Option<&str>,
    ) -> Result<(), TypeAliasError> {
        for def in self.schema.types_in_package(prefix) {
            if def.kind == TypeDefKind::Interface
                || def.is_abstract
                || def.is_inner
                || def.is_anonymous
            {
                continue;
            }
            if let Some(required) = super_type {
                if !self.schema.is_assignable(&def.name, required) {
                    continue;
                }
            }
            self.register(def.simple_name(), TypeRef::Concrete(Arc::clone(&def.name)))?;
        }
        Ok(())
    }

    /// Resolves an alias, falling back to a fully qualified schema lookup.
    pub fn resolve(&self, alias: &str) -> Result<TypeRef, TypeAliasError> {
        if let Some(hit) = self.aliases.get(&alias.to_lowercase()) {
            return Ok(hit.value().clone());
        }
        if self.schema.contains(alias) {
            return Ok(TypeRef::concrete(alias));
        }
        Err(TypeAliasError::Unknown {
            alias: alias.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeDef;

    fn registry() -> TypeAliasRegistry {
        let schema = Arc::new(TypeSchema::new());
        schema.register(TypeDef::class("com.example.User"));
        TypeAliasRegistry::new(schema)
    }

    #[test]
    fn test_resolution_is_case_insensitive() {
        let reg = registry();
        reg.register("user", TypeRef::concrete("com.example.User")).unwrap();
        assert_eq!(
            reg.resolve("USER").unwrap(),
            TypeRef::concrete("com.example.User")
        );
    }

    #[test]
    fn test_duplicate_alias_with_different_type_rejected() {
        let reg = registry();
        reg.register("user", TypeRef::concrete("com.example.User")).unwrap();
        // idempotent re-registration
        reg.register("User", TypeRef::concrete("com.example.User")).unwrap();
        assert!(reg.register("user", TypeRef::concrete("string")).is_err());
    }

    #[test]
    fn test_unknown_alias_falls_back_to_schema_name() {
        let reg = registry();
        assert_eq!(
            reg.resolve("com.example.User").unwrap(),
            TypeRef::concrete("com.example.User")
        );
        assert!(reg.resolve("unknown").is_err());
    }

    #[test]
    fn test_seeded_aliases() {
        let reg = registry();
        assert_eq!(reg.resolve("Integer").unwrap(), TypeRef::concrete("int"));
        assert_eq!(
            reg.resolve("string[]").unwrap(),
            TypeRef::array(TypeRef::concrete("string"))
        );
        assert_eq!(reg.resolve("hashmap").unwrap(), TypeRef::concrete("hashmap"));
        assert_eq!(reg.resolve("ResultSet").unwrap(), TypeRef::concrete("resultset"));
    }

    #[test]
    fn test_package_scan_respects_super_type() {
        let schema = Arc::new(TypeSchema::new());
        schema.register(TypeDef::class("app.model.Person"));
        schema.register(
            TypeDef::class("app.model.Robot").extends(TypeRef::concrete("app.model.Person")),
        );
        schema.register(TypeDef::interface("app.model.Marker"));
        schema.register(TypeDef::class("app.model.Hidden").inner());
        let reg = TypeAliasRegistry::new(schema);
        reg.register_package("app.model", Some("app.model.Person")).unwrap();
        assert!(reg.resolve("robot").is_ok());
        assert!(reg.resolve("person").is_ok());
        assert!(reg.resolve("marker").is_err());
        assert!(reg.resolve("hidden").is_err());
    }
}

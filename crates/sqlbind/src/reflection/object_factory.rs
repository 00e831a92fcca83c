// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Host-object instantiation.

use crate::error::ReflectionError;
use crate::schema::{builtin, TypeDefKind, TypeRef, TypeSchema};
use crate::value::{Properties, Value};
use std::collections::BTreeMap;

/// Creates empty host-object values for declared types.
///
/// Selected by the root `objectFactory` section; the default maps
/// collection types to lists, map types to maps, and any schema class with
/// a default constructor to an empty object.
pub trait ObjectFactory: Send + Sync {
    fn set_properties(&self, _properties: &Properties) {}

    fn create(&self, ty: &TypeRef, schema: &TypeSchema) -> Result<Value, ReflectionError>;
}

#[derive(Debug, Default)]
pub struct DefaultObjectFactory;

impl ObjectFactory for DefaultObjectFactory {
    fn create(&self, ty: &TypeRef, schema: &TypeSchema) -> Result<Value, ReflectionError> {
        let raw = ty.raw_name().unwrap_or(builtin::OBJECT);
        if schema.is_collection(raw) || raw == builtin::ITERATOR {
            return Ok(Value::List(Vec::new()));
        }
        if schema.is_map(raw) || raw == builtin::OBJECT {
            return Ok(Value::Map(BTreeMap::new()));
        }
        let def = schema.require(raw)?;
        if def.kind == TypeDefKind::Class && def.has_default_ctor {
            Ok(Value::object(raw))
        } else {
            Err(ReflectionError::NoDefaultConstructor {
                type_name: raw.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeDef;

    #[test]
    fn test_creates_collections_and_maps() {
        let schema = TypeSchema::new();
        let factory = DefaultObjectFactory;
        assert_eq!(
            factory
                .create(&TypeRef::concrete("arraylist"), &schema)
                .unwrap(),
            Value::List(Vec::new())
        );
        assert_eq!(
            factory.create(&TypeRef::concrete("hashmap"), &schema).unwrap(),
            Value::Map(BTreeMap::new())
        );
    }

    #[test]
    fn test_creates_schema_class() {
        let schema = TypeSchema::new();
        schema.register(TypeDef::class("demo.User"));
        let factory = DefaultObjectFactory;
        let value = factory
            .create(&TypeRef::concrete("demo.User"), &schema)
            .unwrap();
        assert_eq!(value.type_name(), "demo.User");
    }

    #[test]
    fn test_rejects_type_without_default_ctor() {
        let schema = TypeSchema::new();
        schema.register(TypeDef::class("demo.Sealed").no_default_ctor());
        let factory = DefaultObjectFactory;
        assert!(factory
            .create(&TypeRef::concrete("demo.Sealed"), &schema)
            .is_err());
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Property walking over live host objects.
//!
//! Reads pass through the arbitrated accessors, so an ambiguous declaration
//! surfaces here exactly as it would on metadata lookups. Writes create
//! missing intermediate objects through the configured [`ObjectFactory`].

use super::factory::ReflectorFactory;
use super::object_factory::ObjectFactory;
use super::property::PropertyTokenizer;
use crate::error::ReflectionError;
use crate::value::Value;
use std::sync::Arc;

pub struct MetaObject<'a> {
    value: &'a mut Value,
    factory: Arc<ReflectorFactory>,
    object_factory: Arc<dyn ObjectFactory>,
}

impl<'a> MetaObject<'a> {
    pub fn wrap(
        value: &'a mut Value,
        factory: Arc<ReflectorFactory>,
        object_factory: Arc<dyn ObjectFactory>,
    ) -> Self {
        Self {
            value,
            factory,
            object_factory,
        }
    }

    /// Reads a dotted path. Missing intermediates yield `Null`.
    pub fn get_value(&mut self, path: &str) -> Result<Value, ReflectionError> {
        let mut tok = PropertyTokenizer::new(path);
        let mut current = read_segment(&self.factory, self.value, &tok)?;
        while let Some(next) = tok.next_segment() {
            if current.is_null() {
                return Ok(Value::Null);
            }
            current = read_segment(&self.factory, &mut current, &next)?;
            tok = next;
        }
        Ok(current)
    }

    /// Writes a dotted path, creating missing intermediate objects.
    pub fn set_value(&mut self, path: &str, new: Value) -> Result<(), ReflectionError> {
        let tok = PropertyTokenizer::new(path);
        write_segment(&self.factory, &self.object_factory, self.value, &tok, new)
    }
}

fn read_segment(
    factory: &Arc<ReflectorFactory>,
    value: &mut Value,
    tok: &PropertyTokenizer,
) -> Result<Value, ReflectionError> {
    let base = match value {
        Value::Null => Value::Null,
        Value::Map(_) => value.slot(tok.name()).cloned().unwrap_or(Value::Null),
        Value::Object { type_name, .. } => {
            let meta = factory.find_for_type(&type_name.clone())?;
            let invoker = meta.get_invoker(tok.name())?.clone();
            invoker.invoke(value, &[])?
        }
        other => {
            return Err(ReflectionError::NoSuchProperty {
                property: tok.name().to_string(),
                type_name: other.type_name().to_string(),
            })
        }
    };
    match tok.index() {
        None => Ok(base),
        Some(index) => index_into(&base, index, tok.name()),
    }
}

fn index_into(base: &Value, index: &str, property: &str) -> Result<Value, ReflectionError> {
    match base {
        Value::Null => Ok(Value::Null),
        Value::List(items) => {
            let pos: usize = index.parse().map_err(|_| ReflectionError::BadIndex {
                index: index.to_string(),
            })?;
            Ok(items.get(pos).cloned().unwrap_or(Value::Null))
        }
        Value::Map(entries) => Ok(entries.get(index).cloned().unwrap_or(Value::Null)),
        other => Err(ReflectionError::NotIndexable {
            property: property.to_string(),
            type_name: other.type_name().to_string(),
        }),
    }
}

fn write_segment(
    factory: &Arc<ReflectorFactory>,
    object_factory: &Arc<dyn ObjectFactory>,
    target: &mut Value,
    tok: &PropertyTokenizer,
    new: Value,
) -> Result<(), ReflectionError> {
    if let Some(next) = tok.next_segment() {
        let slot = descend(factory, object_factory, target, tok)?;
        return write_segment(factory, object_factory, slot, &next, new);
    }
    match tok.index() {
        None => write_plain(factory, target, tok.name(), new),
        Some(index) => {
            let owner_type = target.type_name().to_string();
            let container =
                target
                    .slot_mut(tok.name())
                    .ok_or_else(|| ReflectionError::NoSuchProperty {
                        property: tok.name().to_string(),
                        type_name: owner_type,
                    })?;
            write_indexed(container, index, tok.name(), new)
        }
    }
}

fn write_plain(
    factory: &Arc<ReflectorFactory>,
    target: &mut Value,
    property: &str,
    new: Value,
) -> Result<(), ReflectionError> {
    match target {
        Value::Map(_) => {
            target.set_slot(property, new);
            Ok(())
        }
        Value::Object { type_name, .. } => {
            let meta = factory.find_for_type(&type_name.clone())?;
            let invoker = meta.set_invoker(property)?.clone();
            invoker.invoke(target, &[new])?;
            Ok(())
        }
        other => Err(ReflectionError::NoSuchProperty {
            property: property.to_string(),
            type_name: other.type_name().to_string(),
        }),
    }
}

fn write_indexed(
    container: &mut Value,
    index: &str,
    property: &str,
    new: Value,
) -> Result<(), ReflectionError> {
    match container {
        Value::List(items) => {
            let pos: usize = index.parse().map_err(|_| ReflectionError::BadIndex {
                index: index.to_string(),
            })?;
            if pos >= items.len() {
                return Err(ReflectionError::BadIndex {
                    index: index.to_string(),
                });
            }
            items[pos] = new;
            Ok(())
        }
        Value::Map(entries) => {
            entries.insert(index.to_string(), new);
            Ok(())
        }
        other => Err(ReflectionError::NotIndexable {
            property: property.to_string(),
            type_name: other.type_name().to_string(),
        }),
    }
}

/// Mutable descent into one segment, creating a missing intermediate when
/// the declared setter type allows instantiation.
fn descend<'v>(
    factory: &Arc<ReflectorFactory>,
    object_factory: &Arc<dyn ObjectFactory>,
    target: &'v mut Value,
    tok: &PropertyTokenizer,
) -> Result<&'v mut Value, ReflectionError> {
    let needs_create = matches!(target.slot(tok.name()), None | Some(Value::Null));
    if needs_create && tok.index().is_none() {
        let created = match target {
            Value::Map(_) => Value::Map(std::collections::BTreeMap::new()),
            Value::Object { type_name, .. } => {
                let meta = factory.find_for_type(&type_name.clone())?;
                // validates the property exists and is unambiguous
                let setter_ty = meta.set_invoker(tok.name())?.ty().clone();
                object_factory.create(&setter_ty, factory.schema())?
            }
            other => {
                return Err(ReflectionError::NoSuchProperty {
                    property: tok.name().to_string(),
                    type_name: other.type_name().to_string(),
                })
            }
        };
        target.set_slot(tok.name(), created);
    }
    let type_name = target.type_name().to_string();
    let slot = target
        .slot_mut(tok.name())
        .ok_or_else(|| ReflectionError::NoSuchProperty {
            property: tok.name().to_string(),
            type_name,
        })?;
    match tok.index() {
        None => Ok(slot),
        Some(index) => match slot {
            Value::List(items) => {
                let pos: usize = index.parse().map_err(|_| ReflectionError::BadIndex {
                    index: index.to_string(),
                })?;
                items
                    .get_mut(pos)
                    .ok_or_else(|| ReflectionError::BadIndex {
                        index: index.to_string(),
                    })
            }
            Value::Map(entries) => entries
                .get_mut(index)
                .ok_or_else(|| ReflectionError::BadIndex {
                    index: index.to_string(),
                }),
            other => Err(ReflectionError::NotIndexable {
                property: tok.name().to_string(),
                type_name: other.type_name().to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::object_factory::DefaultObjectFactory;
    use crate::schema::{MethodDef, TypeDef, TypeRef, TypeSchema};

    fn fixtures() -> (Arc<ReflectorFactory>, Arc<dyn ObjectFactory>) {
        let schema = Arc::new(TypeSchema::new());
        schema.register(
            TypeDef::class("demo.Address")
                .method(MethodDef::new("getCity", vec![], TypeRef::concrete("string")))
                .method(MethodDef::new(
                    "setCity",
                    vec![TypeRef::concrete("string")],
                    TypeRef::concrete("void"),
                )),
        );
        schema.register(
            TypeDef::class("demo.User")
                .method(MethodDef::new(
                    "getAddress",
                    vec![],
                    TypeRef::concrete("demo.Address"),
                ))
                .method(MethodDef::new(
                    "setAddress",
                    vec![TypeRef::concrete("demo.Address")],
                    TypeRef::concrete("void"),
                ))
                .method(MethodDef::new(
                    "getTags",
                    vec![],
                    TypeRef::parameterized("list", vec![TypeRef::concrete("string")]),
                ))
                .method(MethodDef::new(
                    "setTags",
                    vec![TypeRef::parameterized("list", vec![TypeRef::concrete("string")])],
                    TypeRef::concrete("void"),
                )),
        );
        (
            Arc::new(ReflectorFactory::new(schema)),
            Arc::new(DefaultObjectFactory),
        )
    }

    #[test]
    fn test_get_and_set_nested() {
        let (factory, of) = fixtures();
        let mut user = Value::object("demo.User");
        let mut meta = MetaObject::wrap(&mut user, Arc::clone(&factory), Arc::clone(&of));
        // intermediate demo.Address is created on demand
        meta.set_value("address.city", Value::Str("lyon".into())).unwrap();
        assert_eq!(
            meta.get_value("address.city").unwrap(),
            Value::Str("lyon".into())
        );
    }

    #[test]
    fn test_missing_intermediate_reads_null() {
        let (factory, of) = fixtures();
        let mut user = Value::object("demo.User");
        let mut meta = MetaObject::wrap(&mut user, factory, of);
        assert_eq!(meta.get_value("address.city").unwrap(), Value::Null);
    }

    #[test]
    fn test_indexed_list_read_write() {
        let (factory, of) = fixtures();
        let mut user = Value::object("demo.User");
        user.set_slot(
            "tags",
            Value::List(vec![Value::Str("a".into()), Value::Str("b".into())]),
        );
        let mut meta = MetaObject::wrap(&mut user, factory, of);
        assert_eq!(meta.get_value("tags[1]").unwrap(), Value::Str("b".into()));
        meta.set_value("tags[1]", Value::Str("c".into())).unwrap();
        assert_eq!(meta.get_value("tags[1]").unwrap(), Value::Str("c".into()));
        assert_eq!(meta.get_value("tags[9]").unwrap(), Value::Null);
    }

    #[test]
    fn test_unknown_property_errors() {
        let (factory, of) = fixtures();
        let mut user = Value::object("demo.User");
        let mut meta = MetaObject::wrap(&mut user, factory, of);
        assert!(meta.set_value("nope", Value::Int(1)).is_err());
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Path traversal over per-type metadata.
//!
//! `MetaClass` combines [`ClassMeta`] with the property tokenizer so that
//! dotted expressions can be checked and typed without an instance in hand.

use super::factory::ReflectorFactory;
use super::property::PropertyTokenizer;
use super::reflector::ClassMeta;
use crate::error::ReflectionError;
use crate::schema::{builtin, TypeRef};
use std::sync::Arc;

pub struct MetaClass {
    factory: Arc<ReflectorFactory>,
    meta: Arc<ClassMeta>,
}

impl MetaClass {
    pub fn for_type(
        factory: Arc<ReflectorFactory>,
        type_name: &str,
    ) -> Result<Self, ReflectionError> {
        let meta = factory.find_for_type(type_name)?;
        Ok(Self { factory, meta })
    }

    pub fn meta(&self) -> &ClassMeta {
        &self.meta
    }

    /// Canonical capitalization of a dotted path, or None when any segment
    /// is missing. With `use_camel_case_mapping`, underscores are removed
    /// from the input before lookup.
    pub fn find_property(&self, name: &str, use_camel_case_mapping: bool) -> Option<String> {
        let name = if use_camel_case_mapping {
            name.replace('_', "")
        } else {
            name.to_string()
        };
        self.build_property(&name)
    }

    fn build_property(&self, name: &str) -> Option<String> {
        let tok = PropertyTokenizer::new(name);
        if tok.has_next() {
            let property = self.meta.find_property_name(tok.name())?.to_string();
            let child = self.meta_class_for_property(&property).ok()?;
            let rest = child.build_property(tok.children()?)?;
            Some(format!("{}.{}", property, rest))
        } else {
            self.meta.find_property_name(tok.name()).map(str::to_string)
        }
    }

    fn meta_class_for_property(&self, property: &str) -> Result<MetaClass, ReflectionError> {
        let ty = self
            .meta
            .getter_type(property)
            .ok_or_else(|| ReflectionError::NoSuchProperty {
                property: property.to_string(),
                type_name: self.meta.type_name().to_string(),
            })?;
        let raw = ty.raw_name().unwrap_or(builtin::OBJECT);
        MetaClass::for_type(Arc::clone(&self.factory), raw)
    }

    fn meta_class_for_segment(&self, tok: &PropertyTokenizer) -> Result<MetaClass, ReflectionError> {
        let ty = self.getter_type_for_segment(tok)?;
        let raw = ty.raw_name().unwrap_or(builtin::OBJECT);
        MetaClass::for_type(Arc::clone(&self.factory), raw)
    }

    /// Getter type of one segment. An indexed segment over a collection
    /// peeks at the declared element parameter.
    fn getter_type_for_segment(
        &self,
        tok: &PropertyTokenizer,
    ) -> Result<TypeRef, ReflectionError> {
        let ty = self
            .meta
            .getter_type(tok.name())
            .cloned()
            .ok_or_else(|| ReflectionError::NoSuchProperty {
                property: tok.name().to_string(),
                type_name: self.meta.type_name().to_string(),
            })?;
        if tok.index().is_none() {
            return Ok(ty);
        }
        match &ty {
            TypeRef::Array(component) => Ok((**component).clone()),
            _ => {
                let schema = self.factory.schema();
                let is_collection = ty
                    .raw_name()
                    .is_some_and(|raw| schema.is_collection(raw));
                if is_collection {
                    if let [element] = ty.args() {
                        return Ok(element.clone());
                    }
                }
                Ok(ty)
            }
        }
    }

    pub fn has_getter(&self, name: &str) -> bool {
        let tok = PropertyTokenizer::new(name);
        if tok.has_next() {
            if !self.meta.has_getter(tok.name()) {
                return false;
            }
            match (self.meta_class_for_segment(&tok), tok.children()) {
                (Ok(child), Some(rest)) => child.has_getter(rest),
                _ => false,
            }
        } else {
            self.meta.has_getter(tok.name())
        }
    }

    pub fn has_setter(&self, name: &str) -> bool {
        let tok = PropertyTokenizer::new(name);
        if tok.has_next() {
            if !self.meta.has_setter(tok.name()) {
                return false;
            }
            match (self.meta_class_for_property(tok.name()), tok.children()) {
                (Ok(child), Some(rest)) => child.has_setter(rest),
                _ => false,
            }
        } else {
            self.meta.has_setter(tok.name())
        }
    }

    pub fn getter_type(&self, name: &str) -> Result<TypeRef, ReflectionError> {
        let tok = PropertyTokenizer::new(name);
        if tok.has_next() {
            let child = self.meta_class_for_segment(&tok)?;
            child.getter_type(tok.children().unwrap_or_default())
        } else {
            self.getter_type_for_segment(&tok)
        }
    }

    pub fn setter_type(&self, name: &str) -> Result<TypeRef, ReflectionError> {
        let tok = PropertyTokenizer::new(name);
        if tok.has_next() {
            let child = self.meta_class_for_property(tok.name())?;
            child.setter_type(tok.children().unwrap_or_default())
        } else {
            self.meta
                .setter_type(tok.name())
                .cloned()
                .ok_or_else(|| ReflectionError::NoSuchProperty {
                    property: tok.name().to_string(),
                    type_name: self.meta.type_name().to_string(),
                })
        }
    }

    pub fn has_default_constructor(&self) -> bool {
        self.meta.has_default_constructor()
    }
}

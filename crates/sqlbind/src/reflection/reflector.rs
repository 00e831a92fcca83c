// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Per-type accessor metadata.
//!
//! `ClassMeta` caches, for one host type, the readable and writable property
//! names, the arbitrated getter/setter accessors with their resolved types,
//! and a case-insensitive property index. Conflicting declarations across
//! the inheritance chain survive as ambiguous accessors that refuse
//! invocation.

use super::generics::{resolve_field_type, resolve_param_types, resolve_return_type};
use super::invoker::Invoker;
use super::property::PropertyNamer;
use crate::error::ReflectionError;
use crate::schema::{builtin, MethodDef, TypeDef, TypeKey, TypeRef, TypeSchema};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Accessor metadata for one host type.
#[derive(Debug)]
pub struct ClassMeta {
    type_name: TypeKey,
    has_default_ctor: bool,
    get_invokers: HashMap<String, Invoker>,
    set_invokers: HashMap<String, Invoker>,
    readable: Vec<String>,
    writable: Vec<String>,
    case_map: HashMap<String, String>,
}

impl ClassMeta {
    pub fn new(schema: &TypeSchema, type_name: &str) -> Result<Self, ReflectionError> {
        let def = schema.require(type_name)?;
        let src = TypeRef::Concrete(Arc::clone(&def.name));
        let methods = collect_methods(schema, &def)?;

        let mut meta = Self {
            type_name: Arc::clone(&def.name),
            has_default_ctor: def.has_default_ctor,
            get_invokers: HashMap::new(),
            set_invokers: HashMap::new(),
            readable: Vec::new(),
            writable: Vec::new(),
            case_map: HashMap::new(),
        };

        if is_record_shaped(&def, &methods) {
            meta.add_record_getters(schema, &def, &methods, &src)?;
        } else {
            meta.add_getters(schema, type_name, &methods, &src)?;
            meta.add_setters(schema, type_name, &methods, &src)?;
            meta.add_fields(schema, &def, &src)?;
        }

        meta.readable = meta.get_invokers.keys().cloned().collect();
        meta.readable.sort();
        meta.writable = meta.set_invokers.keys().cloned().collect();
        meta.writable.sort();
        for name in meta.readable.iter().chain(meta.writable.iter()) {
            meta.case_map.insert(name.to_uppercase(), name.clone());
        }
        Ok(meta)
    }

    fn add_record_getters(
        &mut self,
        schema: &TypeSchema,
        def: &TypeDef,
        methods: &[(MethodDef, TypeKey)],
        src: &TypeRef,
    ) -> Result<(), ReflectionError> {
        let component_names: HashSet<&str> = def.fields.iter().map(|f| f.name.as_str()).collect();
        for (method, declaring) in methods {
            if method.params.is_empty() && component_names.contains(method.name.as_str()) {
                let ty = resolve_return_type(schema, method, declaring, src)?;
                self.get_invokers.insert(
                    method.name.clone(),
                    Invoker::MethodGetter {
                        property: method.name.clone(),
                        ty,
                    },
                );
            }
        }
        Ok(())
    }

    fn add_getters(
        &mut self,
        schema: &TypeSchema,
        type_name: &str,
        methods: &[(MethodDef, TypeKey)],
        src: &TypeRef,
    ) -> Result<(), ReflectionError> {
        let mut candidates: BTreeMap<String, Vec<(&MethodDef, &TypeKey)>> = BTreeMap::new();
        for (method, declaring) in methods {
            if !method.params.is_empty() || !PropertyNamer::is_getter(&method.name) {
                continue;
            }
            let property = PropertyNamer::method_to_property(&method.name)?;
            if PropertyNamer::is_valid_property(&property) {
                candidates.entry(property).or_default().push((method, declaring));
            }
        }

        for (property, group) in candidates {
            let mut winner: Option<(&MethodDef, TypeRef)> = None;
            let mut ambiguous = false;
            for (method, declaring) in group {
                let ty = resolve_return_type(schema, method, declaring, src)?;
                match winner.take() {
                    None => winner = Some((method, ty)),
                    Some((best, best_ty)) => {
                        if erased_eq(&best_ty, &ty) {
                            if !is_boolean(&ty) {
                                ambiguous = true;
                                winner = Some((best, best_ty));
                                break;
                            }
                            if method.name.starts_with("is") {
                                winner = Some((method, ty));
                            } else {
                                winner = Some((best, best_ty));
                            }
                        } else if erased_assignable(schema, &best_ty, &ty) {
                            // current winner is the subtype, keep it
                            winner = Some((best, best_ty));
                        } else if erased_assignable(schema, &ty, &best_ty) {
                            winner = Some((method, ty));
                        } else {
                            ambiguous = true;
                            winner = Some((best, best_ty));
                            break;
                        }
                    }
                }
            }
            if let Some((_, ty)) = winner {
                let invoker = if ambiguous {
                    Invoker::Ambiguous {
                        message: format!(
                            "conflicting getter declarations for property '{}' on type '{}'",
                            property, type_name
                        ),
                        ty,
                    }
                } else {
                    Invoker::MethodGetter {
                        property: property.clone(),
                        ty,
                    }
                };
                self.get_invokers.insert(property, invoker);
            }
        }
        Ok(())
    }

    fn add_setters(
        &mut self,
        schema: &TypeSchema,
        type_name: &str,
        methods: &[(MethodDef, TypeKey)],
        src: &TypeRef,
    ) -> Result<(), ReflectionError> {
        let mut candidates: BTreeMap<String, Vec<(&MethodDef, &TypeKey)>> = BTreeMap::new();
        for (method, declaring) in methods {
            if method.params.len() != 1 || !PropertyNamer::is_setter(&method.name) {
                continue;
            }
            let property = PropertyNamer::method_to_property(&method.name)?;
            if PropertyNamer::is_valid_property(&property) {
                candidates.entry(property).or_default().push((method, declaring));
            }
        }

        for (property, group) in candidates {
            let getter = self.get_invokers.get(&property);
            let getter_unambiguous_ty = getter
                .filter(|inv| !inv.is_ambiguous())
                .map(|inv| inv.ty().clone());

            let mut matched: Option<TypeRef> = None;
            let mut ambiguous: Option<TypeRef> = None;
            for (method, declaring) in group {
                let param_ty = resolve_param_types(schema, method, declaring, src)?
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| TypeRef::concrete(builtin::OBJECT));
                if let Some(getter_ty) = &getter_unambiguous_ty {
                    if erased_eq(getter_ty, &param_ty) {
                        matched = Some(param_ty);
                        break;
                    }
                }
                if ambiguous.is_none() {
                    match matched.take() {
                        None => matched = Some(param_ty),
                        Some(current) => {
                            if erased_assignable(schema, &param_ty, &current) {
                                // candidate parameter is the subtype, it wins
                                matched = Some(param_ty);
                            } else if erased_assignable(schema, &current, &param_ty) {
                                matched = Some(current);
                            } else {
                                ambiguous = Some(current);
                            }
                        }
                    }
                }
            }

            if let Some(ty) = matched {
                self.set_invokers.insert(
                    property.clone(),
                    Invoker::MethodSetter { property, ty },
                );
            } else if let Some(ty) = ambiguous {
                self.set_invokers.insert(
                    property.clone(),
                    Invoker::Ambiguous {
                        message: format!(
                            "conflicting setter declarations for property '{}' on type '{}'",
                            property, type_name
                        ),
                        ty,
                    },
                );
            }
        }
        Ok(())
    }

    /// Fields back any property that has no method accessor.
    fn add_fields(
        &mut self,
        schema: &TypeSchema,
        def: &TypeDef,
        src: &TypeRef,
    ) -> Result<(), ReflectionError> {
        let mut current = Some(Arc::new(def.clone()));
        while let Some(level) = current {
            for field in &level.fields {
                if !PropertyNamer::is_valid_property(&field.name) {
                    continue;
                }
                if !self.set_invokers.contains_key(&field.name)
                    && !(field.is_final && field.is_static)
                {
                    let ty = resolve_field_type(schema, field, &level.name, src)?;
                    self.set_invokers.insert(
                        field.name.clone(),
                        Invoker::FieldSetter {
                            field: field.name.clone(),
                            ty,
                        },
                    );
                }
                if !self.get_invokers.contains_key(&field.name) {
                    let ty = resolve_field_type(schema, field, &level.name, src)?;
                    self.get_invokers.insert(
                        field.name.clone(),
                        Invoker::FieldGetter {
                            field: field.name.clone(),
                            ty,
                        },
                    );
                }
            }
            current = level
                .superclass
                .as_ref()
                .and_then(TypeRef::raw_name)
                .filter(|name| *name != builtin::OBJECT)
                .and_then(|name| schema.lookup(name));
        }
        Ok(())
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn has_default_constructor(&self) -> bool {
        self.has_default_ctor
    }

    pub fn readable_properties(&self) -> &[String] {
        &self.readable
    }

    pub fn writable_properties(&self) -> &[String] {
        &self.writable
    }

    pub fn has_getter(&self, property: &str) -> bool {
        self.get_invokers.contains_key(property)
    }

    pub fn has_setter(&self, property: &str) -> bool {
        self.set_invokers.contains_key(property)
    }

    pub fn getter_type(&self, property: &str) -> Option<&TypeRef> {
        self.get_invokers.get(property).map(Invoker::ty)
    }

    pub fn setter_type(&self, property: &str) -> Option<&TypeRef> {
        self.set_invokers.get(property).map(Invoker::ty)
    }

    pub fn get_invoker(&self, property: &str) -> Result<&Invoker, ReflectionError> {
        self.get_invokers
            .get(property)
            .ok_or_else(|| ReflectionError::NoSuchProperty {
                property: property.to_string(),
                type_name: self.type_name.to_string(),
            })
    }

    pub fn set_invoker(&self, property: &str) -> Result<&Invoker, ReflectionError> {
        self.set_invokers
            .get(property)
            .ok_or_else(|| ReflectionError::NoSuchProperty {
                property: property.to_string(),
                type_name: self.type_name.to_string(),
            })
    }

    /// Canonical property name for a case-insensitive lookup.
    pub fn find_property_name(&self, name: &str) -> Option<&str> {
        self.case_map.get(&name.to_uppercase()).map(String::as_str)
    }
}

fn erased_eq(a: &TypeRef, b: &TypeRef) -> bool {
    match (a.raw_name(), b.raw_name()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn is_boolean(ty: &TypeRef) -> bool {
    ty.raw_name() == Some(builtin::BOOLEAN)
}

/// Whether `sub`'s erased type is a strict or equal subtype of `sup`'s.
fn erased_assignable(schema: &TypeSchema, sub: &TypeRef, sup: &TypeRef) -> bool {
    match (sub.raw_name(), sup.raw_name()) {
        (Some(sub), Some(sup)) => schema.is_assignable(sub, sup),
        _ => false,
    }
}

/// Every declared field is exposed by a zero-arg accessor bearing its name.
fn is_record_shaped(def: &TypeDef, methods: &[(MethodDef, TypeKey)]) -> bool {
    if def.fields.is_empty() {
        return false;
    }
    def.fields.iter().all(|field| {
        methods
            .iter()
            .any(|(m, _)| m.params.is_empty() && m.name == field.name)
    })
}

/// Enumerates every method declared on the type, its ancestors, and all
/// interfaces, deduplicated by signature. Bridge methods are skipped.
fn collect_methods(
    schema: &TypeSchema,
    def: &TypeDef,
) -> Result<Vec<(MethodDef, TypeKey)>, ReflectionError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<(MethodDef, TypeKey)> = Vec::new();

    let mut current = Some(Arc::new(def.clone()));
    while let Some(level) = current {
        add_unique(&mut out, &mut seen, &level);
        for interface in &level.interfaces {
            if let Some(name) = interface.raw_name() {
                collect_interface(schema, name, &mut out, &mut seen);
            }
        }
        current = level
            .superclass
            .as_ref()
            .and_then(TypeRef::raw_name)
            .filter(|name| *name != builtin::OBJECT)
            .and_then(|name| schema.lookup(name));
    }
    Ok(out)
}

fn collect_interface(
    schema: &TypeSchema,
    name: &str,
    out: &mut Vec<(MethodDef, TypeKey)>,
    seen: &mut HashSet<String>,
) {
    let Some(def) = schema.lookup(name) else {
        return;
    };
    add_unique(out, seen, &def);
    for interface in &def.interfaces {
        if let Some(parent) = interface.raw_name() {
            collect_interface(schema, parent, out, seen);
        }
    }
}

fn add_unique(out: &mut Vec<(MethodDef, TypeKey)>, seen: &mut HashSet<String>, def: &TypeDef) {
    for method in &def.methods {
        if method.is_bridge {
            continue;
        }
        if seen.insert(method.signature()) {
            out.push((method.clone(), Arc::clone(&def.name)));
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Generic type-variable resolution through inheritance chains.
//!
//! Given a declared type and the concrete source type it is viewed from,
//! produces a fully concrete type. A variable declared by the source type
//! itself resolves to its first bound; otherwise the source's generic
//! superclass and interfaces are walked, translating each level's variable
//! arguments through the previous level's binding, until a parameterized
//! ancestor equal to the declaring type is found.

use crate::error::ReflectionError;
use crate::schema::{builtin, FieldDef, MethodDef, TypeDef, TypeRef, TypeSchema};

/// Resolves a field's declared type against `src`.
pub fn resolve_field_type(
    schema: &TypeSchema,
    field: &FieldDef,
    declaring: &str,
    src: &TypeRef,
) -> Result<TypeRef, ReflectionError> {
    resolve_type(schema, &field.ty, src, declaring)
}

/// Resolves a method's return type against `src`.
pub fn resolve_return_type(
    schema: &TypeSchema,
    method: &MethodDef,
    declaring: &str,
    src: &TypeRef,
) -> Result<TypeRef, ReflectionError> {
    resolve_type(schema, &method.ret, src, declaring)
}

/// Resolves every parameter type of a method against `src`.
pub fn resolve_param_types(
    schema: &TypeSchema,
    method: &MethodDef,
    declaring: &str,
    src: &TypeRef,
) -> Result<Vec<TypeRef>, ReflectionError> {
    method
        .params
        .iter()
        .map(|p| resolve_type(schema, p, src, declaring))
        .collect()
}

fn resolve_type(
    schema: &TypeSchema,
    ty: &TypeRef,
    src: &TypeRef,
    declaring: &str,
) -> Result<TypeRef, ReflectionError> {
    match ty {
        TypeRef::Variable { .. } => resolve_type_var(schema, ty, src, declaring),
        TypeRef::Parameterized { raw, args } => {
            let resolved: Result<Vec<_>, _> = args
                .iter()
                .map(|a| resolve_type(schema, a, src, declaring))
                .collect();
            Ok(TypeRef::Parameterized {
                raw: raw.clone(),
                args: resolved?,
            })
        }
        TypeRef::Array(component) => Ok(TypeRef::array(resolve_type(
            schema, component, src, declaring,
        )?)),
        TypeRef::Wildcard { upper, lower } => {
            let upper: Result<Vec<_>, _> = upper
                .iter()
                .map(|b| resolve_type(schema, b, src, declaring))
                .collect();
            let lower: Result<Vec<_>, _> = lower
                .iter()
                .map(|b| resolve_type(schema, b, src, declaring))
                .collect();
            Ok(TypeRef::Wildcard {
                upper: upper?,
                lower: lower?,
            })
        }
        TypeRef::Concrete(_) => Ok(ty.clone()),
    }
}

fn resolve_type_var(
    schema: &TypeSchema,
    var: &TypeRef,
    src: &TypeRef,
    declaring: &str,
) -> Result<TypeRef, ReflectionError> {
    let src_raw = src.raw_name().ok_or_else(|| ReflectionError::InvalidSource {
        message: format!("'{}' is not a class type", src),
    })?;

    if src_raw == declaring {
        return Ok(first_bound(schema, var, declaring)?);
    }

    let src_def = schema.require(src_raw)?;
    if let Some(superclass) = src_def.superclass.clone() {
        if let Some(found) = scan_super_type(schema, var, src, &src_def, &superclass, declaring)? {
            return Ok(found);
        }
    }
    for interface in src_def.interfaces.clone() {
        if let Some(found) = scan_super_type(schema, var, src, &src_def, &interface, declaring)? {
            return Ok(found);
        }
    }
    Ok(TypeRef::concrete(builtin::OBJECT))
}

fn first_bound(
    schema: &TypeSchema,
    var: &TypeRef,
    declaring: &str,
) -> Result<TypeRef, ReflectionError> {
    let TypeRef::Variable { name, .. } = var else {
        return Ok(TypeRef::concrete(builtin::OBJECT));
    };
    let def = schema.require(declaring)?;
    let bound = def
        .type_params
        .iter()
        .find(|p| p.name == *name)
        .and_then(|p| p.bounds.first().cloned());
    Ok(bound.unwrap_or_else(|| TypeRef::concrete(builtin::OBJECT)))
}

fn scan_super_type(
    schema: &TypeSchema,
    var: &TypeRef,
    src: &TypeRef,
    src_def: &TypeDef,
    parent: &TypeRef,
    declaring: &str,
) -> Result<Option<TypeRef>, ReflectionError> {
    match parent {
        TypeRef::Parameterized { raw, args } => {
            let translated = TypeRef::Parameterized {
                raw: raw.clone(),
                args: translate_parent_args(src, src_def, args),
            };
            if raw.as_ref() == declaring {
                if let (
                    TypeRef::Variable {
                        name,
                        declared_by,
                    },
                    TypeRef::Parameterized { args, .. },
                ) = (var, &translated)
                {
                    if declared_by.as_ref() == declaring {
                        let decl_def = schema.require(declaring)?;
                        if let Some(pos) = decl_def.type_param_index(name) {
                            if let Some(actual) = args.get(pos) {
                                return Ok(Some(actual.clone()));
                            }
                        }
                    }
                }
            }
            if schema.is_assignable(raw, declaring) {
                return resolve_type_var(schema, var, &translated, declaring).map(Some);
            }
            Ok(None)
        }
        TypeRef::Concrete(raw) => {
            if schema.is_assignable(raw, declaring) {
                return resolve_type_var(schema, var, parent, declaring).map(Some);
            }
            Ok(None)
        }
        _ => Ok(None),
    }
}

/// Substitutes parent-type arguments that are variables of `src_def` with the
/// actual arguments `src` was parameterized with.
fn translate_parent_args(src: &TypeRef, src_def: &TypeDef, args: &[TypeRef]) -> Vec<TypeRef> {
    let src_args = src.args();
    args.iter()
        .map(|arg| {
            if let TypeRef::Variable { name, declared_by } = arg {
                if declared_by == &src_def.name {
                    if let Some(pos) = src_def.type_param_index(name) {
                        if let Some(actual) = src_args.get(pos) {
                            return actual.clone();
                        }
                    }
                }
            }
            arg.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MethodDef;

    fn box_schema() -> TypeSchema {
        let schema = TypeSchema::new();
        schema.register(
            TypeDef::class("demo.Box")
                .type_param("T", vec![])
                .method(MethodDef::new("get", vec![], TypeRef::variable("T", "demo.Box")))
                .method(MethodDef::new(
                    "set",
                    vec![TypeRef::variable("T", "demo.Box")],
                    TypeRef::concrete("void"),
                )),
        );
        schema.register(
            TypeDef::class("demo.IntBox").extends(TypeRef::parameterized(
                "demo.Box",
                vec![TypeRef::concrete("int")],
            )),
        );
        schema
    }

    #[test]
    fn test_variable_resolves_through_subclass() {
        let schema = box_schema();
        let get = MethodDef::new("get", vec![], TypeRef::variable("T", "demo.Box"));
        let resolved = resolve_return_type(
            &schema,
            &get,
            "demo.Box",
            &TypeRef::concrete("demo.IntBox"),
        )
        .unwrap();
        assert_eq!(resolved, TypeRef::concrete("int"));
    }

    #[test]
    fn test_variable_at_declaring_type_uses_bound() {
        let schema = TypeSchema::new();
        schema.register(
            TypeDef::class("demo.Holder")
                .type_param("T", vec![TypeRef::concrete("string")])
                .method(MethodDef::new(
                    "get",
                    vec![],
                    TypeRef::variable("T", "demo.Holder"),
                )),
        );
        let get = MethodDef::new("get", vec![], TypeRef::variable("T", "demo.Holder"));
        let resolved = resolve_return_type(
            &schema,
            &get,
            "demo.Holder",
            &TypeRef::concrete("demo.Holder"),
        )
        .unwrap();
        assert_eq!(resolved, TypeRef::concrete("string"));
    }

    #[test]
    fn test_two_level_translation() {
        // Middle<E> extends Box<E>; Leaf extends Middle<string>
        let schema = box_schema();
        schema.register(
            TypeDef::class("demo.Middle")
                .type_param("E", vec![])
                .extends(TypeRef::parameterized(
                    "demo.Box",
                    vec![TypeRef::variable("E", "demo.Middle")],
                )),
        );
        schema.register(
            TypeDef::class("demo.Leaf").extends(TypeRef::parameterized(
                "demo.Middle",
                vec![TypeRef::concrete("string")],
            )),
        );
        let get = MethodDef::new("get", vec![], TypeRef::variable("T", "demo.Box"));
        let resolved =
            resolve_return_type(&schema, &get, "demo.Box", &TypeRef::concrete("demo.Leaf"))
                .unwrap();
        assert_eq!(resolved, TypeRef::concrete("string"));
    }

    #[test]
    fn test_parameterized_return_recurses() {
        let schema = box_schema();
        schema.register(
            TypeDef::class("demo.ListBox")
                .type_param("T", vec![])
                .method(MethodDef::new(
                    "all",
                    vec![],
                    TypeRef::parameterized("list", vec![TypeRef::variable("T", "demo.ListBox")]),
                )),
        );
        schema.register(
            TypeDef::class("demo.DateListBox").extends(TypeRef::parameterized(
                "demo.ListBox",
                vec![TypeRef::concrete("date")],
            )),
        );
        let all = MethodDef::new(
            "all",
            vec![],
            TypeRef::parameterized("list", vec![TypeRef::variable("T", "demo.ListBox")]),
        );
        let resolved = resolve_return_type(
            &schema,
            &all,
            "demo.ListBox",
            &TypeRef::concrete("demo.DateListBox"),
        )
        .unwrap();
        assert_eq!(
            resolved,
            TypeRef::parameterized("list", vec![TypeRef::concrete("date")])
        );
    }

    #[test]
    fn test_param_types_resolve() {
        let schema = box_schema();
        let set = MethodDef::new(
            "set",
            vec![TypeRef::variable("T", "demo.Box")],
            TypeRef::concrete("void"),
        );
        let resolved = resolve_param_types(
            &schema,
            &set,
            "demo.Box",
            &TypeRef::concrete("demo.IntBox"),
        )
        .unwrap();
        assert_eq!(resolved, vec![TypeRef::concrete("int")]);
    }

    #[test]
    fn test_unrelated_variable_falls_back_to_object() {
        let schema = box_schema();
        let get = MethodDef::new("get", vec![], TypeRef::variable("X", "demo.Box"));
        let resolved = resolve_return_type(
            &schema,
            &get,
            "demo.Box",
            &TypeRef::concrete("demo.IntBox"),
        )
        .unwrap();
        assert_eq!(resolved, TypeRef::concrete(builtin::OBJECT));
    }
}

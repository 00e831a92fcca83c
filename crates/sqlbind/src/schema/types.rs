// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Type grammar and definition records.

use super::TypeKey;
use std::fmt;
use std::sync::Arc;

/// A declared type, possibly generic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Fully concrete named type, e.g. `demo.User` or builtin `int`.
    Concrete(TypeKey),
    /// A named type applied to arguments, e.g. `list<string>`.
    Parameterized { raw: TypeKey, args: Vec<TypeRef> },
    /// A type variable, identified by name and the type that declares it.
    Variable { name: String, declared_by: TypeKey },
    /// Array of a component type.
    Array(Box<TypeRef>),
    /// A bounded wildcard.
    Wildcard {
        upper: Vec<TypeRef>,
        lower: Vec<TypeRef>,
    },
}

impl TypeRef {
    pub fn concrete(name: &str) -> Self {
        TypeRef::Concrete(Arc::from(name))
    }

    pub fn parameterized(raw: &str, args: Vec<TypeRef>) -> Self {
        TypeRef::Parameterized {
            raw: Arc::from(raw),
            args,
        }
    }

    pub fn variable(name: &str, declared_by: &str) -> Self {
        TypeRef::Variable {
            name: name.to_string(),
            declared_by: Arc::from(declared_by),
        }
    }

    pub fn array(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }

    /// Erased name of the type, when it has one.
    pub fn raw_name(&self) -> Option<&str> {
        match self {
            TypeRef::Concrete(name) => Some(name),
            TypeRef::Parameterized { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Type arguments of a parameterized reference.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Parameterized { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, TypeRef::Variable { .. })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Concrete(name) => write!(f, "{}", name),
            TypeRef::Parameterized { raw, args } => {
                write!(f, "{}<", raw)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            TypeRef::Variable { name, .. } => write!(f, "{}", name),
            TypeRef::Array(component) => write!(f, "{}[]", component),
            TypeRef::Wildcard { upper, lower } => {
                write!(f, "?")?;
                if let Some(bound) = upper.first() {
                    write!(f, " extends {}", bound)?;
                }
                if let Some(bound) = lower.first() {
                    write!(f, " super {}", bound)?;
                }
                Ok(())
            }
        }
    }
}

/// Declared type parameter with its bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub bounds: Vec<TypeRef>,
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub is_final: bool,
    pub is_static: bool,
}

impl FieldDef {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            ty,
            is_final: false,
            is_static: false,
        }
    }

    pub fn with_flags(name: &str, ty: TypeRef, is_final: bool, is_static: bool) -> Self {
        Self {
            name: name.to_string(),
            ty,
            is_final,
            is_static,
        }
    }
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<TypeRef>,
    pub ret: TypeRef,
    pub is_bridge: bool,
}

impl MethodDef {
    pub fn new(name: &str, params: Vec<TypeRef>, ret: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            params,
            ret,
            is_bridge: false,
        }
    }

    /// Marks a compiler-synthesized bridge method; skipped by metadata
    /// construction.
    pub fn bridge(mut self) -> Self {
        self.is_bridge = true;
        self
    }

    /// Deduplication signature: `ret#name:param,param`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        format!("{}#{}:{}", self.ret, self.name, params.join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefKind {
    Class,
    Interface,
}

/// One host type as the caller extracted it.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: TypeKey,
    pub kind: TypeDefKind,
    pub type_params: Vec<TypeParamDef>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    pub has_default_ctor: bool,
    pub is_abstract: bool,
    pub is_inner: bool,
    pub is_anonymous: bool,
}

impl TypeDef {
    pub fn class(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            kind: TypeDefKind::Class,
            type_params: Vec::new(),
            superclass: Some(TypeRef::concrete(super::builtin::OBJECT)),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            has_default_ctor: true,
            is_abstract: false,
            is_inner: false,
            is_anonymous: false,
        }
    }

    pub fn interface(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            kind: TypeDefKind::Interface,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            has_default_ctor: false,
            is_abstract: true,
            is_inner: false,
            is_anonymous: false,
        }
    }

    /// Detaches the implicit `object` superclass; used for the root itself.
    pub fn root(mut self) -> Self {
        self.superclass = None;
        self
    }

    pub fn extends(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn implements(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn type_param(mut self, name: &str, bounds: Vec<TypeRef>) -> Self {
        self.type_params.push(TypeParamDef {
            name: name.to_string(),
            bounds,
        });
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn no_default_ctor(mut self) -> Self {
        self.has_default_ctor = false;
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn inner(mut self) -> Self {
        self.is_inner = true;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }

    /// Simple name: text after the last dot.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Looks up a declared type parameter position by variable name.
    pub fn type_param_index(&self, name: &str) -> Option<usize> {
        self.type_params.iter().position(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_format() {
        let m = MethodDef::new(
            "setName",
            vec![TypeRef::concrete("string")],
            TypeRef::concrete("void"),
        );
        assert_eq!(m.signature(), "void#setName:string");
    }

    #[test]
    fn test_display_nested_generics() {
        let t = TypeRef::parameterized(
            "map",
            vec![
                TypeRef::concrete("string"),
                TypeRef::parameterized("list", vec![TypeRef::concrete("int")]),
            ],
        );
        assert_eq!(t.to_string(), "map<string, list<int>>");
    }

    #[test]
    fn test_simple_name() {
        let def = TypeDef::class("com.example.deep.Widget");
        assert_eq!(def.simple_name(), "Widget");
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Property accessors as a tagged sum.
//!
//! Host objects are dynamic [`Value`]s, so an accessor resolves to a named
//! slot read or write. Conflicting declarations are still recorded, but the
//! stored accessor refuses invocation with a message naming the property.

use crate::error::ReflectionError;
use crate::schema::TypeRef;
use crate::value::Value;

/// A resolved accessor for one property.
#[derive(Debug, Clone)]
pub enum Invoker {
    MethodGetter { property: String, ty: TypeRef },
    FieldGetter { field: String, ty: TypeRef },
    MethodSetter { property: String, ty: TypeRef },
    FieldSetter { field: String, ty: TypeRef },
    /// Recorded for conflicting declarations; errors on invocation.
    Ambiguous { message: String, ty: TypeRef },
}

impl Invoker {
    /// Declared type: return type for getters, parameter type for setters.
    pub fn ty(&self) -> &TypeRef {
        match self {
            Invoker::MethodGetter { ty, .. }
            | Invoker::FieldGetter { ty, .. }
            | Invoker::MethodSetter { ty, .. }
            | Invoker::FieldSetter { ty, .. }
            | Invoker::Ambiguous { ty, .. } => ty,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Invoker::Ambiguous { .. })
    }

    /// Applies the accessor to a target value.
    ///
    /// Getters ignore `args` and return the slot value (`Null` when the slot
    /// is unset). Setters write `args[0]` and return `Null`.
    pub fn invoke(&self, target: &mut Value, args: &[Value]) -> Result<Value, ReflectionError> {
        match self {
            Invoker::MethodGetter { property: name, .. }
            | Invoker::FieldGetter { field: name, .. } => {
                Ok(target.slot(name).cloned().unwrap_or(Value::Null))
            }
            Invoker::MethodSetter { property: name, .. }
            | Invoker::FieldSetter { field: name, .. } => {
                let value = args.first().cloned().unwrap_or(Value::Null);
                if target.set_slot(name, value) {
                    Ok(Value::Null)
                } else {
                    Err(ReflectionError::NoSuchProperty {
                        property: name.clone(),
                        type_name: target.type_name().to_string(),
                    })
                }
            }
            Invoker::Ambiguous { message, .. } => Err(ReflectionError::AmbiguousAccessor {
                message: message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getter_reads_slot() {
        let inv = Invoker::MethodGetter {
            property: "name".into(),
            ty: TypeRef::concrete("string"),
        };
        let mut user = Value::object("demo.User");
        user.set_slot("name", Value::Str("ada".into()));
        assert_eq!(inv.invoke(&mut user, &[]).unwrap(), Value::Str("ada".into()));
    }

    #[test]
    fn test_getter_missing_slot_is_null() {
        let inv = Invoker::FieldGetter {
            field: "age".into(),
            ty: TypeRef::concrete("int"),
        };
        let mut user = Value::object("demo.User");
        assert_eq!(inv.invoke(&mut user, &[]).unwrap(), Value::Null);
    }

    #[test]
    fn test_setter_writes_slot() {
        let inv = Invoker::MethodSetter {
            property: "age".into(),
            ty: TypeRef::concrete("int"),
        };
        let mut user = Value::object("demo.User");
        inv.invoke(&mut user, &[Value::Int(7)]).unwrap();
        assert_eq!(user.slot("age"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_ambiguous_refuses_invocation() {
        let inv = Invoker::Ambiguous {
            message: "conflicting getter declarations for property 'x' on type 'demo.T'".into(),
            ty: TypeRef::concrete("int"),
        };
        let mut target = Value::object("demo.T");
        let err = inv.invoke(&mut target, &[]).unwrap_err();
        assert!(err.to_string().contains("'x'"));
        assert!(err.to_string().contains("demo.T"));
    }
}

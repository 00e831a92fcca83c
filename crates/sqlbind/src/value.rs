// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Dynamic host-object values.
//!
//! The reflection engine binds statement parameters and result columns
//! against objects whose shape is only known through the caller-supplied
//! schema. `Value` is the runtime representation of those objects: a typed
//! property bag that accessors read and write by slot name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// String key/value pairs, ordered for deterministic iteration.
pub type Properties = BTreeMap<String, String>;

/// A dynamic host-object value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// An instance of a schema class: type name plus named slots.
    Object {
        type_name: String,
        fields: BTreeMap<String, Value>,
    },
}

impl Value {
    pub fn object(type_name: impl Into<String>) -> Self {
        Value::Object {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Schema type name of this value, for metadata lookups.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "long",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object { type_name, .. } => type_name,
        }
    }

    /// Reads a named slot of an object or map value.
    pub fn slot(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object { fields, .. } => fields.get(name),
            Value::Map(entries) => entries.get(name),
            _ => None,
        }
    }

    /// Mutable access to a named slot.
    pub fn slot_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Value::Object { fields, .. } => fields.get_mut(name),
            Value::Map(entries) => entries.get_mut(name),
            _ => None,
        }
    }

    /// Writes a named slot of an object or map value. Returns false when the
    /// value has no slots to write.
    pub fn set_slot(&mut self, name: &str, value: Value) -> bool {
        match self {
            Value::Object { fields, .. } => {
                fields.insert(name.to_string(), value);
                true
            }
            Value::Map(entries) => {
                entries.insert(name.to_string(), value);
                true
            }
            _ => false,
        }
    }

    /// Stable content hash, used by cache keys.
    pub fn content_hash(&self) -> u64 {
        const PRIME: u64 = 1_099_511_628_211;
        fn mix(h: u64, b: u64) -> u64 {
            (h ^ b).wrapping_mul(PRIME)
        }
        match self {
            Value::Null => 0x9e37_79b9,
            Value::Bool(b) => mix(1, u64::from(*b)),
            Value::Int(i) => mix(2, *i as u64),
            Value::Double(d) => mix(3, d.to_bits()),
            Value::Str(s) => s.bytes().fold(4u64, |h, b| mix(h, u64::from(b))),
            Value::List(items) => items.iter().fold(5u64, |h, v| mix(h, v.content_hash())),
            Value::Map(entries) => entries.iter().fold(6u64, |h, (k, v)| {
                mix(mix(h, k.bytes().fold(0, |a, b| mix(a, u64::from(b)))), v.content_hash())
            }),
            Value::Object { type_name, fields } => {
                let base = type_name.bytes().fold(7u64, |h, b| mix(h, u64::from(b)));
                fields
                    .iter()
                    .fold(base, |h, (k, v)| {
                        mix(mix(h, k.len() as u64), v.content_hash())
                    })
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{} items]", items.len()),
            Value::Map(entries) => write!(f, "{{{} entries}}", entries.len()),
            Value::Object { type_name, .. } => write!(f, "{}", type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_roundtrip() {
        let mut user = Value::object("demo.User");
        assert!(user.set_slot("name", Value::Str("ada".into())));
        assert_eq!(user.slot("name"), Some(&Value::Str("ada".into())));
        assert_eq!(user.slot("missing"), None);
    }

    #[test]
    fn test_scalars_have_no_slots() {
        let mut v = Value::Int(42);
        assert!(!v.set_slot("x", Value::Null));
        assert!(v.slot("x").is_none());
    }

    #[test]
    fn test_content_hash_distinguishes_values() {
        let a = Value::Str("alpha".into());
        let b = Value::Str("beta".into());
        assert_ne!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash(), Value::Str("alpha".into()).content_hash());
    }
}

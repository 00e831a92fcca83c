// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Error types for the mapping core.
//!
//! Parsing failures surface as [`BuilderError`]. A symbolic reference whose
//! target is not registered yet travels as `BuilderError::Incomplete` and is
//! absorbed by the matching pending queue instead of aborting the parse;
//! every other error escapes to the caller.

use std::fmt;
use std::io;

/// Identifies which pending queue absorbs a deferred reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    ResultMap,
    CacheRef,
    Statement,
}

impl fmt::Display for PendingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingKind::ResultMap => write!(f, "result map"),
            PendingKind::CacheRef => write!(f, "cache ref"),
            PendingKind::Statement => write!(f, "statement"),
        }
    }
}

/// A reference to something not registered yet.
///
/// Carried by `BuilderError::Incomplete`; the enclosing element enqueues the
/// partially built entry and parsing continues with its siblings.
#[derive(Debug, Clone)]
pub struct ForwardRef {
    pub kind: PendingKind,
    pub reference: String,
}

impl ForwardRef {
    pub fn new(kind: PendingKind, reference: impl Into<String>) -> Self {
        Self {
            kind,
            reference: reference.into(),
        }
    }
}

impl fmt::Display for ForwardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unresolved {} reference '{}'", self.kind, self.reference)
    }
}

/// Configuration and mapper document failures.
#[derive(Debug)]
pub enum BuilderError {
    /// Document is not well-formed XML.
    Xml { resource: String, message: String },
    /// A referenced resource could not be read.
    Io { resource: String, source: io::Error },
    /// A required attribute is missing.
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    /// Two mutually exclusive attributes were both given.
    ExclusiveAttributes {
        element: &'static str,
        first: &'static str,
        second: &'static str,
    },
    /// A `<settings>` key the registry does not recognize.
    UnknownSetting { key: String },
    /// A setting or attribute value failed type coercion.
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
    /// A root document section is unknown or out of its mandated order.
    Section { section: String, message: &'static str },
    /// An id is already registered with a different value.
    DuplicateId { kind: &'static str, id: String },
    /// A named provider (data-source factory, cache type, language driver,
    /// transaction manager) is not registered.
    UnknownProvider { kind: &'static str, name: String },
    /// Namespace missing, empty, or changed after being bound.
    Namespace { message: String },
    /// Malformed element content.
    Malformed { element: &'static str, message: String },
    /// Forward reference; absorbed by a pending queue, never fatal on its own.
    Incomplete(ForwardRef),
    /// Pending queues still non-empty after the final drain.
    Unresolved { entries: Vec<String> },
    Alias(TypeAliasError),
    Reflection(ReflectionError),
    Connection(ConnectionError),
}

impl BuilderError {
    /// Shorthand for raising a forward reference.
    pub fn incomplete(kind: PendingKind, reference: impl Into<String>) -> Self {
        BuilderError::Incomplete(ForwardRef::new(kind, reference))
    }
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::Xml { resource, message } => {
                write!(f, "malformed XML in '{}': {}", resource, message)
            }
            BuilderError::Io { resource, source } => {
                write!(f, "failed to read '{}': {}", resource, source)
            }
            BuilderError::MissingAttribute { element, attribute } => {
                write!(f, "<{}> requires attribute '{}'", element, attribute)
            }
            BuilderError::ExclusiveAttributes {
                element,
                first,
                second,
            } => write!(
                f,
                "<{}> accepts '{}' or '{}' but not both",
                element, first, second
            ),
            BuilderError::UnknownSetting { key } => {
                write!(f, "unknown setting '{}'", key)
            }
            BuilderError::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "value '{}' for '{}' is not a valid {}", value, key, expected),
            BuilderError::Section { section, message } => {
                write!(f, "section <{}>: {}", section, message)
            }
            BuilderError::DuplicateId { kind, id } => {
                write!(f, "{} '{}' already registered with a different value", kind, id)
            }
            BuilderError::UnknownProvider { kind, name } => {
                write!(f, "no {} registered under '{}'", kind, name)
            }
            BuilderError::Namespace { message } => write!(f, "{}", message),
            BuilderError::Malformed { element, message } => {
                write!(f, "<{}>: {}", element, message)
            }
            BuilderError::Incomplete(fr) => fr.fmt(f),
            BuilderError::Unresolved { entries } => {
                write!(f, "unresolved references after final drain: {}", entries.join(", "))
            }
            BuilderError::Alias(e) => e.fmt(f),
            BuilderError::Reflection(e) => e.fmt(f),
            BuilderError::Connection(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for BuilderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuilderError::Io { source, .. } => Some(source),
            BuilderError::Alias(e) => Some(e),
            BuilderError::Reflection(e) => Some(e),
            BuilderError::Connection(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ForwardRef> for BuilderError {
    fn from(value: ForwardRef) -> Self {
        BuilderError::Incomplete(value)
    }
}

impl From<TypeAliasError> for BuilderError {
    fn from(value: TypeAliasError) -> Self {
        BuilderError::Alias(value)
    }
}

impl From<ReflectionError> for BuilderError {
    fn from(value: ReflectionError) -> Self {
        BuilderError::Reflection(value)
    }
}

impl From<ConnectionError> for BuilderError {
    fn from(value: ConnectionError) -> Self {
        BuilderError::Connection(value)
    }
}

/// Reflection engine failures.
#[derive(Debug, Clone)]
pub enum ReflectionError {
    /// The schema has no definition for the named type.
    UnknownType { name: String },
    /// A property path segment does not exist on the traversed type.
    NoSuchProperty { property: String, type_name: String },
    /// Invocation against an accessor recorded as ambiguous.
    AmbiguousAccessor { message: String },
    /// An index segment was applied to a value that is not a list or map.
    NotIndexable { property: String, type_name: String },
    /// Index segment is not usable against the target collection.
    BadIndex { index: String },
    /// Object creation was requested for a type with no default constructor.
    NoDefaultConstructor { type_name: String },
    /// Generic resolution was handed a source that is not a class type.
    InvalidSource { message: String },
}

impl fmt::Display for ReflectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectionError::UnknownType { name } => {
                write!(f, "type '{}' is not present in the schema", name)
            }
            ReflectionError::NoSuchProperty {
                property,
                type_name,
            } => write!(f, "no property '{}' on type '{}'", property, type_name),
            ReflectionError::AmbiguousAccessor { message } => write!(f, "{}", message),
            ReflectionError::NotIndexable {
                property,
                type_name,
            } => write!(
                f,
                "property '{}' of type '{}' cannot be indexed",
                property, type_name
            ),
            ReflectionError::BadIndex { index } => write!(f, "unusable index '{}'", index),
            ReflectionError::NoDefaultConstructor { type_name } => {
                write!(f, "type '{}' has no default constructor", type_name)
            }
            ReflectionError::InvalidSource { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ReflectionError {}

/// Alias registry failures.
#[derive(Debug, Clone)]
pub enum TypeAliasError {
    /// Re-registration under the same alias with a different target.
    Duplicate {
        alias: String,
        existing: String,
        proposed: String,
    },
    /// Alias unknown and not interpretable as a fully qualified type name.
    Unknown { alias: String },
}

impl fmt::Display for TypeAliasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAliasError::Duplicate {
                alias,
                existing,
                proposed,
            } => write!(
                f,
                "alias '{}' is already mapped to '{}', cannot remap to '{}'",
                alias, existing, proposed
            ),
            TypeAliasError::Unknown { alias } => {
                write!(f, "could not resolve type alias '{}'", alias)
            }
        }
    }
}

impl std::error::Error for TypeAliasError {}

/// Connection and pool failures.
#[derive(Debug)]
pub enum ConnectionError {
    /// No driver registered under the configured name.
    UnknownDriver { name: String },
    /// The underlying driver refused or lost the connection.
    Driver { message: String },
    /// Use of a wrapper that was invalidated (returned, reclaimed, or force-closed).
    Invalidated,
    /// A single requester exceeded the bad-connection tolerance.
    BadConnectionTolerance { attempts: u32 },
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::UnknownDriver { name } => {
                write!(f, "no driver registered under '{}'", name)
            }
            ConnectionError::Driver { message } => write!(f, "driver error: {}", message),
            ConnectionError::Invalidated => {
                write!(f, "connection wrapper has been invalidated")
            }
            ConnectionError::BadConnectionTolerance { attempts } => write!(
                f,
                "could not obtain a good connection after {} attempts",
                attempts
            ),
        }
    }
}

impl std::error::Error for ConnectionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_display_names_reference() {
        let err = BuilderError::incomplete(PendingKind::CacheRef, "blog.PostMapper");
        assert!(err.to_string().contains("cache ref"));
        assert!(err.to_string().contains("blog.PostMapper"));
    }

    #[test]
    fn test_unresolved_lists_entries() {
        let err = BuilderError::Unresolved {
            entries: vec!["a.b".into(), "c.d".into()],
        };
        let text = err.to_string();
        assert!(text.contains("a.b") && text.contains("c.d"));
    }
}

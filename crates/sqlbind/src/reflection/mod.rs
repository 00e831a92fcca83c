// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Reflection engine.
//!
//! Resolves dotted property expressions against the caller-supplied type
//! schema: per-type accessor metadata with conflict arbitration, generic
//! type-variable resolution through inheritance chains, and path traversal
//! over both metadata ([`MetaClass`]) and live values ([`MetaObject`]).

mod factory;
mod generics;
mod invoker;
mod meta_class;
mod meta_object;
mod object_factory;
mod property;
mod reflector;

pub use factory::ReflectorFactory;
pub use generics::{resolve_field_type, resolve_param_types, resolve_return_type};
pub use invoker::Invoker;
pub use meta_class::MetaClass;
pub use meta_object::MetaObject;
pub use object_factory::{DefaultObjectFactory, ObjectFactory};
pub use property::{PropertyNamer, PropertyTokenizer};
pub use reflector::ClassMeta;

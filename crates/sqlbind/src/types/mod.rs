// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Type aliasing and handler registration.

mod alias;
mod handler;
mod jdbc;

pub use alias::TypeAliasRegistry;
pub use handler::{TypeHandlerDescriptor, TypeHandlerRegistry};
pub use jdbc::JdbcType;

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! # sqlbind - Declarative SQL statement mapping core
//!
//! The runtime engine of a SQL mapping framework: XML statement
//! declarations become an executable registry, host-object property paths
//! resolve against a caller-supplied reflection schema, and a bounded
//! synchronous pool manages database connections.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqlbind::builder::XmlConfigBuilder;
//! use sqlbind::schema::TypeSchema;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), sqlbind::error::BuilderError> {
//!     let schema = Arc::new(TypeSchema::new());
//!     let config = XmlConfigBuilder::new(schema)
//!         .parse(r#"<configuration><mappers/></configuration>"#)?;
//!     let statement = config.mapped_statement("blog.BlogMapper.selectBlog");
//!     let _ = statement;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                     Configuration registry                    |
//! |  mapped statements | result maps | parameter maps | caches   |
//! +--------------------------------------------------------------+
//! |   XML builders (root + mapper) with pending forward refs     |
//! +--------------------------------------------------------------+
//! |  Reflection engine          |  Pooled data source            |
//! |  ClassMeta / MetaClass      |  checkout, reclaim, ping       |
//! +--------------------------------------------------------------+
//! |  Caller-supplied type schema  |  Caller-registered drivers   |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`config::Configuration`] | Process-wide registry, sealed after parse |
//! | [`builder::XmlConfigBuilder`] | Root document parser |
//! | [`builder::XmlMapperBuilder`] | Per-namespace mapper parser |
//! | [`reflection::MetaClass`] | Property-path resolution over metadata |
//! | [`datasource::PooledDataSource`] | Bounded synchronous connection pool |

/// Two-phase configuration building (root + mapper documents).
pub mod builder;
/// Namespace caches and their decorators.
pub mod cache;
/// The process-wide registry and global settings.
pub mod config;
/// Connection supply: driver traits, unpooled and pooled data sources.
pub mod datasource;
/// Error types.
pub mod error;
/// Mapping model: statements, result maps, parameter maps, SQL sources.
pub mod mapping;
/// Token scanning shared by the builders.
pub mod parsing;
/// Reflection engine over the caller-supplied schema.
pub mod reflection;
/// Resource loading for `resource`/`url` attributes.
pub mod resources;
/// Caller-supplied host-type schema.
pub mod schema;
/// Type aliases, JDBC types, type-handler registrations.
pub mod types;
/// Dynamic host-object values.
pub mod value;

pub use builder::{XmlConfigBuilder, XmlMapperBuilder};
pub use config::{Configuration, Settings};
pub use datasource::{PooledDataSource, UnpooledDataSource};
pub use error::{BuilderError, ConnectionError, ReflectionError, TypeAliasError};
pub use schema::{TypeDef, TypeRef, TypeSchema};
pub use value::{Properties, Value};

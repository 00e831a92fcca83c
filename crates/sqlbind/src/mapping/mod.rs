// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Mapping model: immutable value objects produced by the builder and
//! consumed by execution.

mod environment;
mod parameter_map;
mod result_map;
mod sql_source;
mod statement;

pub use environment::{Environment, TransactionManagerKind};
pub use parameter_map::{ParameterMap, ParameterMapping, ParameterMode};
pub use result_map::{
    CompositeColumn, Discriminator, ResultFlags, ResultMap, ResultMapBuilder, ResultMapping,
    ResultMappingBuilder,
};
pub use sql_source::{
    BoundSql, LanguageDriver, LanguageRegistry, RawLanguageDriver, RawSqlSource, SqlSource,
    StaticSqlSource,
};
pub use statement::{
    KeyGeneratorKind, MappedStatement, MappedStatementBuilder, ResultSetType, SqlCommandType,
    StatementType,
};

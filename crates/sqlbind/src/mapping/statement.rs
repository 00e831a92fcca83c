// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Mapped statements: the addressable compiled form of one SQL operation.

use super::parameter_map::ParameterMap;
use super::result_map::ResultMap;
use super::sql_source::{BoundSql, SqlSource};
use crate::cache::Cache;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlCommandType {
    Unknown,
    Select,
    Insert,
    Update,
    Delete,
    Flush,
}

impl SqlCommandType {
    /// Command kind for a statement element name.
    pub fn from_element(name: &str) -> Self {
        match name {
            "select" => SqlCommandType::Select,
            "insert" => SqlCommandType::Insert,
            "update" => SqlCommandType::Update,
            "delete" => SqlCommandType::Delete,
            "flush" => SqlCommandType::Flush,
            _ => SqlCommandType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    Statement,
    Prepared,
    Callable,
}

impl FromStr for StatementType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "STATEMENT" => StatementType::Statement,
            "PREPARED" => StatementType::Prepared,
            "CALLABLE" => StatementType::Callable,
            _ => return Err(()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSetType {
    Default,
    ForwardOnly,
    ScrollInsensitive,
    ScrollSensitive,
}

impl FromStr for ResultSetType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "DEFAULT" => ResultSetType::Default,
            "FORWARD_ONLY" => ResultSetType::ForwardOnly,
            "SCROLL_INSENSITIVE" => ResultSetType::ScrollInsensitive,
            "SCROLL_SENSITIVE" => ResultSetType::ScrollSensitive,
            _ => return Err(()),
        })
    }
}

/// Generated-key retrieval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGeneratorKind {
    None,
    Jdbc3,
}

/// An immutable compiled statement.
pub struct MappedStatement {
    id: String,
    resource: Option<String>,
    sql_command_type: SqlCommandType,
    statement_type: StatementType,
    sql_source: Arc<dyn SqlSource>,
    parameter_map: Arc<ParameterMap>,
    result_maps: Vec<Arc<ResultMap>>,
    result_set_type: ResultSetType,
    fetch_size: Option<u32>,
    timeout: Option<u64>,
    flush_cache_required: bool,
    use_cache: bool,
    key_generator: KeyGeneratorKind,
    key_properties: Vec<String>,
    key_columns: Vec<String>,
    database_id: Option<String>,
    cache: Option<Arc<dyn Cache>>,
    result_ordered: bool,
    dirty_select: bool,
    result_sets: Vec<String>,
    lang: String,
}

impl MappedStatement {
    pub fn builder(
        id: impl Into<String>,
        sql_source: Arc<dyn SqlSource>,
        sql_command_type: SqlCommandType,
    ) -> MappedStatementBuilder {
        let id = id.into();
        let is_select = sql_command_type == SqlCommandType::Select;
        MappedStatementBuilder {
            statement: MappedStatement {
                parameter_map: Arc::new(ParameterMap::new(
                    format!("{}-Inline", id),
                    None,
                    Vec::new(),
                )),
                id,
                resource: None,
                sql_command_type,
                statement_type: StatementType::Prepared,
                sql_source,
                result_maps: Vec::new(),
                result_set_type: ResultSetType::Default,
                fetch_size: None,
                timeout: None,
                flush_cache_required: !is_select,
                use_cache: is_select,
                key_generator: KeyGeneratorKind::None,
                key_properties: Vec::new(),
                key_columns: Vec::new(),
                database_id: None,
                cache: None,
                result_ordered: false,
                dirty_select: false,
                result_sets: Vec::new(),
                lang: "xml".to_string(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn sql_command_type(&self) -> SqlCommandType {
        self.sql_command_type
    }

    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    pub fn sql_source(&self) -> &Arc<dyn SqlSource> {
        &self.sql_source
    }

    pub fn bound_sql(&self, parameter: &Value) -> BoundSql {
        self.sql_source.bound_sql(parameter)
    }

    pub fn parameter_map(&self) -> &Arc<ParameterMap> {
        &self.parameter_map
    }

    pub fn result_maps(&self) -> &[Arc<ResultMap>] {
        &self.result_maps
    }

    pub fn result_set_type(&self) -> ResultSetType {
        self.result_set_type
    }

    pub fn fetch_size(&self) -> Option<u32> {
        self.fetch_size
    }

    pub fn timeout(&self) -> Option<u64> {
        self.timeout
    }

    pub fn is_flush_cache_required(&self) -> bool {
        self.flush_cache_required
    }

    pub fn is_use_cache(&self) -> bool {
        self.use_cache
    }

    pub fn key_generator(&self) -> KeyGeneratorKind {
        self.key_generator
    }

    pub fn key_properties(&self) -> &[String] {
        &self.key_properties
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn database_id(&self) -> Option<&str> {
        self.database_id.as_deref()
    }

    pub fn cache(&self) -> Option<&Arc<dyn Cache>> {
        self.cache.as_ref()
    }

    pub fn is_result_ordered(&self) -> bool {
        self.result_ordered
    }

    pub fn is_dirty_select(&self) -> bool {
        self.dirty_select
    }

    pub fn result_sets(&self) -> &[String] {
        &self.result_sets
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }
}

impl fmt::Debug for MappedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedStatement")
            .field("id", &self.id)
            .field("sql_command_type", &self.sql_command_type)
            .field("statement_type", &self.statement_type)
            .field("database_id", &self.database_id)
            .finish_non_exhaustive()
    }
}

pub struct MappedStatementBuilder {
    statement: MappedStatement,
}

impl MappedStatementBuilder {
    pub fn resource(mut self, resource: Option<String>) -> Self {
        self.statement.resource = resource;
        self
    }

    pub fn statement_type(mut self, statement_type: StatementType) -> Self {
        self.statement.statement_type = statement_type;
        self
    }

    pub fn parameter_map(mut self, parameter_map: Arc<ParameterMap>) -> Self {
        self.statement.parameter_map = parameter_map;
        self
    }

    pub fn result_maps(mut self, result_maps: Vec<Arc<ResultMap>>) -> Self {
        self.statement.result_maps = result_maps;
        self
    }

    pub fn result_set_type(mut self, result_set_type: ResultSetType) -> Self {
        self.statement.result_set_type = result_set_type;
        self
    }

    pub fn fetch_size(mut self, fetch_size: Option<u32>) -> Self {
        self.statement.fetch_size = fetch_size;
        self
    }

    pub fn timeout(mut self, timeout: Option<u64>) -> Self {
        self.statement.timeout = timeout;
        self
    }

    pub fn flush_cache_required(mut self, flush: bool) -> Self {
        self.statement.flush_cache_required = flush;
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.statement.use_cache = use_cache;
        self
    }

    pub fn key_generator(mut self, kind: KeyGeneratorKind) -> Self {
        self.statement.key_generator = kind;
        self
    }

    pub fn key_properties(mut self, properties: Vec<String>) -> Self {
        self.statement.key_properties = properties;
        self
    }

    pub fn key_columns(mut self, columns: Vec<String>) -> Self {
        self.statement.key_columns = columns;
        self
    }

    pub fn database_id(mut self, database_id: Option<String>) -> Self {
        self.statement.database_id = database_id;
        self
    }

    pub fn cache(mut self, cache: Option<Arc<dyn Cache>>) -> Self {
        self.statement.cache = cache;
        self
    }

    pub fn result_ordered(mut self, ordered: bool) -> Self {
        self.statement.result_ordered = ordered;
        self
    }

    pub fn dirty_select(mut self, dirty: bool) -> Self {
        self.statement.dirty_select = dirty;
        self
    }

    pub fn result_sets(mut self, result_sets: Vec<String>) -> Self {
        self.statement.result_sets = result_sets;
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.statement.lang = lang.into();
        self
    }

    pub fn build(self) -> Arc<MappedStatement> {
        Arc::new(self.statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::sql_source::StaticSqlSource;

    fn source() -> Arc<dyn SqlSource> {
        Arc::new(StaticSqlSource::new("select 1", Vec::new()))
    }

    #[test]
    fn test_select_defaults() {
        let stmt =
            MappedStatement::builder("demo.selectOne", source(), SqlCommandType::Select).build();
        assert!(stmt.is_use_cache());
        assert!(!stmt.is_flush_cache_required());
        assert_eq!(stmt.statement_type(), StatementType::Prepared);
        assert_eq!(stmt.parameter_map().id(), "demo.selectOne-Inline");
    }

    #[test]
    fn test_write_defaults_flush() {
        let stmt =
            MappedStatement::builder("demo.insertOne", source(), SqlCommandType::Insert).build();
        assert!(!stmt.is_use_cache());
        assert!(stmt.is_flush_cache_required());
    }

    #[test]
    fn test_command_type_from_element() {
        assert_eq!(SqlCommandType::from_element("delete"), SqlCommandType::Delete);
        assert_eq!(SqlCommandType::from_element("weird"), SqlCommandType::Unknown);
    }
}

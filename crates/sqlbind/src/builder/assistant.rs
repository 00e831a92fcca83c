// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Mapper-scoped registration helper.
//!
//! Holds the current namespace and cache binding while a mapper document is
//! processed, qualifies every id, and performs the registrations that may
//! defer on forward references.

use crate::cache::{Cache, CacheBuilder};
use crate::config::Configuration;
use crate::error::{BuilderError, PendingKind};
use crate::mapping::{
    CompositeColumn, Discriminator, KeyGeneratorKind, MappedStatement, ParameterMap,
    ParameterMapping, ResultMap, ResultMapping, ResultSetType, SqlCommandType, SqlSource,
    StatementType,
};
use crate::schema::TypeRef;
use crate::value::Properties;
use std::sync::Arc;
use std::time::Duration;

/// How a mapper's statements obtain their cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBinding {
    None,
    /// The namespace declared its own `<cache>`.
    Own,
    /// The namespace references another namespace's cache.
    Ref(String),
}

/// Everything a `<resultMap>` element declares, kept for deferred retries.
#[derive(Clone)]
pub struct ResultMapInput {
    pub id: String,
    pub ty: TypeRef,
    pub extends: Option<String>,
    pub discriminator: Option<Discriminator>,
    pub mappings: Vec<Arc<ResultMapping>>,
    pub auto_mapping: Option<bool>,
}

/// Everything a statement element declares.
pub struct StatementSpec {
    pub id: String,
    pub sql_source: Arc<dyn SqlSource>,
    pub sql_command_type: SqlCommandType,
    pub statement_type: StatementType,
    pub parameter_map: Option<String>,
    pub parameter_type: Option<TypeRef>,
    pub result_map: Option<String>,
    pub result_type: Option<TypeRef>,
    pub result_set_type: ResultSetType,
    pub fetch_size: Option<u32>,
    pub timeout: Option<u64>,
    pub flush_cache: Option<bool>,
    pub use_cache: Option<bool>,
    pub result_ordered: bool,
    pub key_generator: KeyGeneratorKind,
    pub key_properties: Vec<String>,
    pub key_columns: Vec<String>,
    pub database_id: Option<String>,
    pub result_sets: Vec<String>,
    pub dirty_select: bool,
    pub lang: String,
}

pub struct MapperBuilderAssistant<'a> {
    config: &'a Configuration,
    resource: String,
    current_namespace: Option<String>,
    current_cache: Option<Arc<dyn Cache>>,
    unresolved_cache_ref: bool,
}

impl<'a> MapperBuilderAssistant<'a> {
    pub fn new(config: &'a Configuration, resource: impl Into<String>) -> Self {
        Self {
            config,
            resource: resource.into(),
            current_namespace: None,
            current_cache: None,
            unresolved_cache_ref: false,
        }
    }

    pub fn config(&self) -> &Configuration {
        self.config
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn set_current_namespace(&mut self, namespace: &str) -> Result<(), BuilderError> {
        if namespace.is_empty() {
            return Err(BuilderError::Namespace {
                message: "the mapper namespace cannot be empty".to_string(),
            });
        }
        match &self.current_namespace {
            Some(current) if current != namespace => Err(BuilderError::Namespace {
                message: format!(
                    "wrong namespace '{}', the builder is bound to '{}'",
                    namespace, current
                ),
            }),
            Some(_) => Ok(()),
            None => {
                self.current_namespace = Some(namespace.to_string());
                Ok(())
            }
        }
    }

    pub fn current_namespace(&self) -> Result<&str, BuilderError> {
        self.current_namespace
            .as_deref()
            .ok_or_else(|| BuilderError::Namespace {
                message: "the mapper namespace has not been set".to_string(),
            })
    }

    /// Normalizes an id to `namespace.localId`. A reference containing a dot
    /// is taken as already qualified; a definition containing a foreign dot
    /// is rejected.
    pub fn apply_current_namespace(
        &self,
        base: &str,
        is_reference: bool,
    ) -> Result<String, BuilderError> {
        let namespace = self.current_namespace()?;
        if is_reference {
            if base.contains('.') {
                return Ok(base.to_string());
            }
        } else {
            if base.starts_with(&format!("{}.", namespace)) {
                return Ok(base.to_string());
            }
            if base.contains('.') {
                return Err(BuilderError::Namespace {
                    message: format!("dots are not allowed in element names: '{}'", base),
                });
            }
        }
        Ok(format!("{}.{}", namespace, base))
    }

    pub fn current_cache(&self) -> Option<&Arc<dyn Cache>> {
        self.current_cache.as_ref()
    }

    /// Re-attaches the namespace's own cache; used when deferred statements
    /// are rebuilt.
    pub fn bind_namespace_cache(&mut self) -> Result<(), BuilderError> {
        let namespace = self.current_namespace()?.to_string();
        match self.config.cache(&namespace) {
            Some(cache) => {
                self.current_cache = Some(cache);
                Ok(())
            }
            None => Err(BuilderError::incomplete(PendingKind::CacheRef, namespace)),
        }
    }

    /// Adopts another namespace's cache, deferring when it is not yet built.
    pub fn use_cache_ref(&mut self, referenced: &str) -> Result<Arc<dyn Cache>, BuilderError> {
        self.unresolved_cache_ref = true;
        let cache = self
            .config
            .cache(referenced)
            .ok_or_else(|| BuilderError::incomplete(PendingKind::CacheRef, referenced))?;
        self.current_cache = Some(Arc::clone(&cache));
        self.unresolved_cache_ref = false;
        Ok(cache)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn use_new_cache(
        &mut self,
        implementation: Option<String>,
        eviction: Option<String>,
        clear_interval: Option<Duration>,
        size: Option<usize>,
        read_write: bool,
        blocking: bool,
        properties: Properties,
    ) -> Result<Arc<dyn Cache>, BuilderError> {
        let id = self.current_namespace()?.to_string();
        let cache = CacheBuilder::new(id)
            .implementation(implementation)
            .eviction(eviction)
            .clear_interval(clear_interval)
            .size(size)
            .read_write(read_write)
            .blocking(blocking)
            .logging(self.config.settings().cache_enabled)
            .properties(properties)
            .build(self.config.cache_providers())?;
        self.config.add_cache(Arc::clone(&cache))?;
        self.current_cache = Some(Arc::clone(&cache));
        Ok(cache)
    }

    pub fn add_parameter_map(
        &self,
        id: &str,
        ty: Option<TypeRef>,
        mappings: Vec<Arc<ParameterMapping>>,
    ) -> Result<Arc<ParameterMap>, BuilderError> {
        let id = self.apply_current_namespace(id, false)?;
        let parameter_map = Arc::new(ParameterMap::new(id, ty, mappings));
        self.config.add_parameter_map(Arc::clone(&parameter_map))?;
        Ok(parameter_map)
    }

    /// Builds and registers a result map, merging an `extends` parent.
    ///
    /// Parent mappings the child redeclares are dropped; when the child
    /// declares any constructor mapping, every parent constructor mapping is
    /// dropped. The parent's remainder follows the child's own mappings.
    pub fn add_result_map(&self, input: &ResultMapInput) -> Result<Arc<ResultMap>, BuilderError> {
        let id = self.apply_current_namespace(&input.id, false)?;
        let mut mappings = input.mappings.clone();

        if let Some(extends) = &input.extends {
            let extend_id = self.apply_current_namespace(extends, true)?;
            let parent = self
                .config
                .result_map(&extend_id)
                .ok_or_else(|| BuilderError::incomplete(PendingKind::ResultMap, &*extend_id))?;
            let child_declares_constructor = mappings.iter().any(|m| m.flags.constructor);
            let inherited: Vec<Arc<ResultMapping>> = parent
                .mappings()
                .iter()
                .filter(|parent_mapping| {
                    if child_declares_constructor && parent_mapping.flags.constructor {
                        return false;
                    }
                    !mappings.iter().any(|child_mapping| {
                        child_mapping.property.is_some()
                            && child_mapping.property == parent_mapping.property
                    })
                })
                .cloned()
                .collect();
            mappings.extend(inherited);
        }

        let result_map = ResultMap::builder(id, input.ty.clone())
            .mappings(mappings)
            .discriminator(input.discriminator.clone())
            .auto_mapping(input.auto_mapping)
            .build();
        self.config.add_result_map(Arc::clone(&result_map))?;
        Ok(result_map)
    }

    /// Splits `{prop1=col1,prop2=col2}` composite columns. Unpaired tokens
    /// are rejected.
    pub fn parse_composite_column_name(
        &self,
        column: Option<&str>,
    ) -> Result<Vec<CompositeColumn>, BuilderError> {
        let Some(column) = column else {
            return Ok(Vec::new());
        };
        if !column.contains('=') && !column.contains(',') {
            return Ok(Vec::new());
        }
        let tokens: Vec<&str> = column
            .split(['{', '}', '=', ',', ' '])
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.len() % 2 != 0 {
            return Err(BuilderError::Malformed {
                element: "resultMap",
                message: format!("composite column '{}' has an unpaired token", column),
            });
        }
        Ok(tokens
            .chunks(2)
            .map(|pair| CompositeColumn {
                property: pair[0].to_string(),
                column: pair[1].to_string(),
            })
            .collect())
    }

    /// Builds and registers a mapped statement.
    ///
    /// Refuses while the namespace's cache reference is unresolved, so that
    /// statements are deferred and later built with the shared cache
    /// attached.
    pub fn add_mapped_statement(
        &self,
        spec: StatementSpec,
    ) -> Result<Arc<MappedStatement>, BuilderError> {
        if self.unresolved_cache_ref {
            return Err(BuilderError::incomplete(
                PendingKind::CacheRef,
                self.current_namespace()?,
            ));
        }
        let id = self.apply_current_namespace(&spec.id, false)?;
        let is_select = spec.sql_command_type == SqlCommandType::Select;

        let parameter_map = match &spec.parameter_map {
            Some(name) => {
                let qualified = self.apply_current_namespace(name, true)?;
                self.config
                    .parameter_map(&qualified)
                    .ok_or_else(|| BuilderError::incomplete(PendingKind::Statement, &*qualified))?
            }
            None => Arc::new(ParameterMap::new(
                format!("{}-Inline", id),
                spec.parameter_type.clone(),
                Vec::new(),
            )),
        };

        let result_maps = self.statement_result_maps(&spec, &id)?;

        let statement = MappedStatement::builder(id, spec.sql_source, spec.sql_command_type)
            .resource(Some(self.resource.clone()))
            .statement_type(spec.statement_type)
            .parameter_map(parameter_map)
            .result_maps(result_maps)
            .result_set_type(spec.result_set_type)
            .fetch_size(spec.fetch_size.or(self.config.settings().default_fetch_size))
            .timeout(spec.timeout.or(self.config.settings().default_statement_timeout))
            .flush_cache_required(spec.flush_cache.unwrap_or(!is_select))
            .use_cache(spec.use_cache.unwrap_or(is_select))
            .result_ordered(spec.result_ordered)
            .key_generator(spec.key_generator)
            .key_properties(spec.key_properties)
            .key_columns(spec.key_columns)
            .database_id(spec.database_id)
            .cache(self.current_cache.clone())
            .result_sets(spec.result_sets)
            .dirty_select(spec.dirty_select)
            .lang(spec.lang)
            .build();
        self.config.add_mapped_statement(Arc::clone(&statement))?;
        Ok(statement)
    }

    /// Result maps for a statement: resolved ids (comma-separated), or a
    /// single inline auto-map for `resultType`.
    fn statement_result_maps(
        &self,
        spec: &StatementSpec,
        statement_id: &str,
    ) -> Result<Vec<Arc<ResultMap>>, BuilderError> {
        if let Some(names) = &spec.result_map {
            let mut maps = Vec::new();
            for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                let qualified = self.apply_current_namespace(name, true)?;
                let map = self
                    .config
                    .result_map(&qualified)
                    .ok_or_else(|| BuilderError::incomplete(PendingKind::ResultMap, &*qualified))?;
                maps.push(map);
            }
            return Ok(maps);
        }
        if let Some(ty) = &spec.result_type {
            return Ok(vec![ResultMap::builder(
                format!("{}-Inline", statement_id),
                ty.clone(),
            )
            .build()]);
        }
        Ok(Vec::new())
    }
}

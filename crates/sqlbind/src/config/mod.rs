// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! The process-wide registry.
//!
//! `Configuration` aggregates everything the builder produces: mapped
//! statements, result maps, parameter maps, caches, cache references,
//! settings, and the supporting registries. Registered values are frozen
//! before publication; registrations with an id that already exists and a
//! different value are rejected. Three pending queues absorb forward
//! references, each guarded by its own lock so concurrent mapper parses
//! cannot corrupt them.

mod settings;

pub use settings::{
    AutoMappingBehavior, AutoMappingUnknownColumnBehavior, ExecutorType, LocalCacheScope, Settings,
};

use crate::builder::XmlFragment;
use crate::cache::{Cache, CacheProviders};
use crate::datasource::{DataSourceProviders, DriverRegistry};
use crate::error::{BuilderError, PendingKind};
use crate::mapping::{
    Environment, LanguageRegistry, MappedStatement, ParameterMap, ResultMap,
};
use crate::reflection::{DefaultObjectFactory, ObjectFactory, ReflectorFactory};
use crate::schema::TypeSchema;
use crate::types::{TypeAliasRegistry, TypeHandlerRegistry};
use crate::value::Properties;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::sync::Arc;

/// A deferred registration that may become resolvable as more mappers load.
pub trait PendingEntry: Send {
    fn kind(&self) -> PendingKind;

    /// Human-readable reference for unresolved reporting.
    fn reference(&self) -> String;

    /// Attempts the registration. `Err(Incomplete)` keeps the entry queued;
    /// any other error is fatal.
    fn try_resolve(&self, config: &Configuration) -> Result<(), BuilderError>;
}

/// A registered plugin, kept as a descriptor; interception is external.
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptorDescriptor {
    pub type_name: String,
    pub properties: Properties,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration").finish_non_exhaustive()
    }
}

pub struct Configuration {
    schema: Arc<TypeSchema>,
    settings: Settings,
    database_id: Option<String>,
    environment: Option<Environment>,
    variables: Properties,
    object_wrapper_factory: Option<String>,
    type_aliases: TypeAliasRegistry,
    type_handlers: TypeHandlerRegistry,
    reflector_factory: Arc<ReflectorFactory>,
    object_factory: Arc<dyn ObjectFactory>,
    language: LanguageRegistry,
    cache_providers: CacheProviders,
    datasource_providers: DataSourceProviders,
    drivers: DriverRegistry,
    interceptors: Vec<InterceptorDescriptor>,

    mapped_statements: DashMap<String, Arc<MappedStatement>>,
    result_maps: DashMap<String, Arc<ResultMap>>,
    parameter_maps: DashMap<String, Arc<ParameterMap>>,
    caches: DashMap<String, Arc<dyn Cache>>,
    cache_ref_map: DashMap<String, String>,
    loaded_resources: DashSet<String>,
    sql_fragments: DashMap<String, XmlFragment>,
    mappers: DashSet<String>,

    pending_result_maps: Mutex<Vec<Box<dyn PendingEntry>>>,
    pending_cache_refs: Mutex<Vec<Box<dyn PendingEntry>>>,
    pending_statements: Mutex<Vec<Box<dyn PendingEntry>>>,
}

impl Configuration {
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self {
            settings: Settings::default(),
            database_id: None,
            environment: None,
            variables: Properties::new(),
            object_wrapper_factory: None,
            type_aliases: TypeAliasRegistry::new(Arc::clone(&schema)),
            type_handlers: TypeHandlerRegistry::new(),
            reflector_factory: Arc::new(ReflectorFactory::new(Arc::clone(&schema))),
            object_factory: Arc::new(DefaultObjectFactory),
            language: LanguageRegistry::new(),
            cache_providers: CacheProviders::new(),
            datasource_providers: DataSourceProviders::new(),
            drivers: DriverRegistry::new(),
            interceptors: Vec::new(),
            mapped_statements: DashMap::new(),
            result_maps: DashMap::new(),
            parameter_maps: DashMap::new(),
            caches: DashMap::new(),
            cache_ref_map: DashMap::new(),
            loaded_resources: DashSet::new(),
            sql_fragments: DashMap::new(),
            mappers: DashSet::new(),
            pending_result_maps: Mutex::new(Vec::new()),
            pending_cache_refs: Mutex::new(Vec::new()),
            pending_statements: Mutex::new(Vec::new()),
            schema,
        }
    }

    // --- registries & collaborators ---

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn database_id(&self) -> Option<&str> {
        self.database_id.as_deref()
    }

    pub fn set_database_id(&mut self, database_id: Option<String>) {
        self.database_id = database_id;
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = Some(environment);
    }

    pub fn variables(&self) -> &Properties {
        &self.variables
    }

    pub fn merge_variables(&mut self, variables: Properties) {
        self.variables.extend(variables);
    }

    pub fn set_variables(&mut self, variables: Properties) {
        self.variables = variables;
    }

    pub fn type_aliases(&self) -> &TypeAliasRegistry {
        &self.type_aliases
    }

    pub fn type_handlers(&self) -> &TypeHandlerRegistry {
        &self.type_handlers
    }

    pub fn reflector_factory(&self) -> &Arc<ReflectorFactory> {
        &self.reflector_factory
    }

    pub fn object_factory(&self) -> &Arc<dyn ObjectFactory> {
        &self.object_factory
    }

    pub fn set_object_factory(&mut self, factory: Arc<dyn ObjectFactory>) {
        self.object_factory = factory;
    }

    pub fn object_wrapper_factory(&self) -> Option<&str> {
        self.object_wrapper_factory.as_deref()
    }

    pub fn set_object_wrapper_factory(&mut self, name: Option<String>) {
        self.object_wrapper_factory = name;
    }

    pub fn language(&self) -> &LanguageRegistry {
        &self.language
    }

    pub fn cache_providers(&self) -> &CacheProviders {
        &self.cache_providers
    }

    pub fn datasource_providers(&self) -> &DataSourceProviders {
        &self.datasource_providers
    }

    pub fn drivers(&self) -> &DriverRegistry {
        &self.drivers
    }

    pub fn interceptors(&self) -> &[InterceptorDescriptor] {
        &self.interceptors
    }

    pub fn add_interceptor(&mut self, descriptor: InterceptorDescriptor) {
        self.interceptors.push(descriptor);
    }

    // --- statements ---

    pub fn add_mapped_statement(
        &self,
        statement: Arc<MappedStatement>,
    ) -> Result<(), BuilderError> {
        strict_insert(
            &self.mapped_statements,
            "mapped statement",
            statement.id().to_string(),
            statement,
            Arc::ptr_eq,
        )
    }

    pub fn has_statement(&self, id: &str) -> bool {
        self.mapped_statements.contains_key(id)
    }

    pub fn mapped_statement(&self, id: &str) -> Option<Arc<MappedStatement>> {
        self.mapped_statements.get(id).map(|e| Arc::clone(e.value()))
    }

    pub fn statement_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .mapped_statements
            .iter()
            .map(|e| e.key().clone())
            .collect();
        ids.sort();
        ids
    }

    // --- result maps ---

    /// Result maps compare by value: a deferred element is rebuilt from its
    /// snapshot on every retry, re-registering nested maps that already
    /// succeeded as fresh but equal instances.
    pub fn add_result_map(&self, result_map: Arc<ResultMap>) -> Result<(), BuilderError> {
        strict_insert(
            &self.result_maps,
            "result map",
            result_map.id().to_string(),
            result_map,
            |a, b| a == b,
        )
    }

    pub fn has_result_map(&self, id: &str) -> bool {
        self.result_maps.contains_key(id)
    }

    pub fn result_map(&self, id: &str) -> Option<Arc<ResultMap>> {
        self.result_maps.get(id).map(|e| Arc::clone(e.value()))
    }

    pub fn result_map_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.result_maps.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    // --- parameter maps ---

    pub fn add_parameter_map(&self, parameter_map: Arc<ParameterMap>) -> Result<(), BuilderError> {
        strict_insert(
            &self.parameter_maps,
            "parameter map",
            parameter_map.id().to_string(),
            parameter_map,
            Arc::ptr_eq,
        )
    }

    pub fn parameter_map(&self, id: &str) -> Option<Arc<ParameterMap>> {
        self.parameter_maps.get(id).map(|e| Arc::clone(e.value()))
    }

    // --- caches ---

    pub fn add_cache(&self, cache: Arc<dyn Cache>) -> Result<(), BuilderError> {
        strict_insert(
            &self.caches,
            "cache",
            cache.id().to_string(),
            cache,
            Arc::ptr_eq,
        )
    }

    pub fn has_cache(&self, namespace: &str) -> bool {
        self.caches.contains_key(namespace)
    }

    pub fn cache(&self, namespace: &str) -> Option<Arc<dyn Cache>> {
        self.caches.get(namespace).map(|e| Arc::clone(e.value()))
    }

    /// Records that `namespace` shares the cache of `referenced`.
    pub fn add_cache_ref(&self, namespace: &str, referenced: &str) {
        self.cache_ref_map
            .insert(namespace.to_string(), referenced.to_string());
    }

    pub fn cache_ref(&self, namespace: &str) -> Option<String> {
        self.cache_ref_map.get(namespace).map(|e| e.value().clone())
    }

    // --- resources, fragments, mappers ---

    pub fn is_resource_loaded(&self, resource: &str) -> bool {
        self.loaded_resources.contains(resource)
    }

    pub fn add_loaded_resource(&self, resource: &str) {
        self.loaded_resources.insert(resource.to_string());
    }

    pub fn add_sql_fragment(&self, id: &str, fragment: XmlFragment) {
        self.sql_fragments.insert(id.to_string(), fragment);
    }

    pub fn sql_fragment(&self, id: &str) -> Option<XmlFragment> {
        self.sql_fragments.get(id).map(|e| e.value().clone())
    }

    pub fn has_mapper(&self, type_name: &str) -> bool {
        self.mappers.contains(type_name)
    }

    pub fn add_mapper(&self, type_name: &str) {
        self.mappers.insert(type_name.to_string());
    }

    // --- pending queues ---

    pub fn add_incomplete_result_map(&self, entry: Box<dyn PendingEntry>) {
        self.pending_result_maps.lock().push(entry);
    }

    pub fn add_incomplete_cache_ref(&self, entry: Box<dyn PendingEntry>) {
        self.pending_cache_refs.lock().push(entry);
    }

    pub fn add_incomplete_statement(&self, entry: Box<dyn PendingEntry>) {
        self.pending_statements.lock().push(entry);
    }

    /// One drain pass over all three queues, result maps first.
    pub fn drain_pending(&self) -> Result<(), BuilderError> {
        drain_queue(&self.pending_result_maps, self)?;
        drain_queue(&self.pending_cache_refs, self)?;
        drain_queue(&self.pending_statements, self)?;
        Ok(())
    }

    /// Seal-time check: any entry still queued is a hard error.
    pub fn validate_pending(&self) -> Result<(), BuilderError> {
        let mut entries: Vec<String> = Vec::new();
        for queue in [
            &self.pending_result_maps,
            &self.pending_cache_refs,
            &self.pending_statements,
        ] {
            for entry in queue.lock().iter() {
                entries.push(format!("{}: {}", entry.kind(), entry.reference()));
            }
        }
        if entries.is_empty() {
            Ok(())
        } else {
            Err(BuilderError::Unresolved { entries })
        }
    }
}

/// Insertion that tolerates re-registering the same value and rejects a
/// different value under an existing id.
fn strict_insert<V: Clone>(
    map: &DashMap<String, V>,
    kind: &'static str,
    id: String,
    value: V,
    same: fn(&V, &V) -> bool,
) -> Result<(), BuilderError> {
    if let Some(existing) = map.get(&id) {
        if same(existing.value(), &value) {
            return Ok(());
        }
        return Err(BuilderError::DuplicateId { kind, id });
    }
    map.insert(id, value);
    Ok(())
}

/// Retains entries that still signal `Incomplete`; drops resolved ones.
fn drain_queue(
    queue: &Mutex<Vec<Box<dyn PendingEntry>>>,
    config: &Configuration,
) -> Result<(), BuilderError> {
    let mut guard = queue.lock();
    let entries = std::mem::take(&mut *guard);
    let mut kept = Vec::new();
    let mut fatal = None;
    for entry in entries {
        if fatal.is_some() {
            kept.push(entry);
            continue;
        }
        match entry.try_resolve(config) {
            Ok(()) => {}
            Err(BuilderError::Incomplete(_)) => kept.push(entry),
            Err(e) => {
                fatal = Some(e);
                kept.push(entry);
            }
        }
    }
    *guard = kept;
    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{SqlCommandType, StaticSqlSource};

    fn config() -> Configuration {
        Configuration::new(Arc::new(TypeSchema::new()))
    }

    fn statement(id: &str) -> Arc<MappedStatement> {
        MappedStatement::builder(
            id,
            Arc::new(StaticSqlSource::new("select 1", Vec::new())),
            SqlCommandType::Select,
        )
        .build()
    }

    #[test]
    fn test_strict_registration() {
        let config = config();
        let stmt = statement("demo.selectOne");
        config.add_mapped_statement(Arc::clone(&stmt)).unwrap();
        // same value is idempotent
        config.add_mapped_statement(Arc::clone(&stmt)).unwrap();
        // different value under the same id is rejected
        assert!(config.add_mapped_statement(statement("demo.selectOne")).is_err());
        assert!(config.mapped_statement("demo.selectOne").is_some());
    }

    #[test]
    fn test_resolve_returns_same_object() {
        let config = config();
        let stmt = statement("demo.selectOne");
        config.add_mapped_statement(Arc::clone(&stmt)).unwrap();
        let a = config.mapped_statement("demo.selectOne").unwrap();
        let b = config.mapped_statement("demo.selectOne").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    struct CountingEntry {
        remaining: Mutex<u32>,
    }

    impl PendingEntry for CountingEntry {
        fn kind(&self) -> PendingKind {
            PendingKind::CacheRef
        }

        fn reference(&self) -> String {
            "demo.other".to_string()
        }

        fn try_resolve(&self, _config: &Configuration) -> Result<(), BuilderError> {
            let mut remaining = self.remaining.lock();
            if *remaining == 0 {
                Ok(())
            } else {
                *remaining -= 1;
                Err(BuilderError::incomplete(PendingKind::CacheRef, "demo.other"))
            }
        }
    }

    #[test]
    fn test_pending_queue_drains_monotonically() {
        let config = config();
        config.add_incomplete_cache_ref(Box::new(CountingEntry {
            remaining: Mutex::new(2),
        }));
        config.drain_pending().unwrap();
        assert!(config.validate_pending().is_err());
        config.drain_pending().unwrap();
        assert!(config.validate_pending().is_err());
        config.drain_pending().unwrap();
        assert!(config.validate_pending().is_ok());
    }
}

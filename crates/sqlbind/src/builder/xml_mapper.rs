// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Mapper document parsing.
//!
//! Each namespace document contributes its cache, parameter maps, result
//! maps, sql fragments, and statements to the registry. Forward references
//! are absorbed into the pending queues and a drain pass runs after the
//! document completes.

use super::assistant::{CacheBinding, MapperBuilderAssistant, ResultMapInput};
use super::fragment::XmlFragment;
use super::pending::{PendingCacheRef, PendingResultMap, PendingStatement};
use super::xml_statement::{parse_statement_node, STATEMENT_ELEMENTS};
use crate::config::Configuration;
use crate::error::BuilderError;
use crate::mapping::{Discriminator, ResultFlags, ResultMapping};
use crate::reflection::MetaClass;
use crate::schema::TypeRef;
use crate::types::JdbcType;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const MAPPER_ELEMENTS: &[&str] = &[
    "cache-ref",
    "cache",
    "parameterMap",
    "resultMap",
    "sql",
    "select",
    "insert",
    "update",
    "delete",
];

pub struct XmlMapperBuilder<'a> {
    config: &'a Configuration,
    resource: String,
}

impl<'a> XmlMapperBuilder<'a> {
    pub fn new(config: &'a Configuration, resource: impl Into<String>) -> Self {
        Self {
            config,
            resource: resource.into(),
        }
    }

    /// Parses a mapper document. Re-parsing an already loaded resource is a
    /// no-op.
    pub fn parse(&self, xml: &str) -> Result<(), BuilderError> {
        if self.config.is_resource_loaded(&self.resource) {
            return Ok(());
        }
        let doc = roxmltree::Document::parse(xml).map_err(|e| BuilderError::Xml {
            resource: self.resource.clone(),
            message: e.to_string(),
        })?;
        let root = doc.root_element();
        if root.tag_name().name() != "mapper" {
            return Err(BuilderError::Malformed {
                element: "mapper",
                message: format!("expected <mapper> root, found <{}>", root.tag_name().name()),
            });
        }
        let mapper = XmlFragment::capture(root, self.config.variables());
        let namespace = self.configuration_element(&mapper)?;
        self.config.add_loaded_resource(&self.resource);
        self.bind_mapper_for_namespace(&namespace);
        self.config.drain_pending()?;
        Ok(())
    }

    fn configuration_element(&self, mapper: &XmlFragment) -> Result<String, BuilderError> {
        let namespace = mapper.required_attr("mapper", "namespace")?.to_string();
        let mut assistant = MapperBuilderAssistant::new(self.config, self.resource.clone());
        assistant.set_current_namespace(&namespace)?;

        for child in mapper.child_elements() {
            if !MAPPER_ELEMENTS.contains(&child.name()) {
                return Err(BuilderError::Malformed {
                    element: "mapper",
                    message: format!("unknown element <{}>", child.name()),
                });
            }
        }

        let mut cache_binding = CacheBinding::None;
        if let Some(cache_ref) = mapper.first_child("cache-ref") {
            let referenced = cache_ref.required_attr("cache-ref", "namespace")?;
            self.config.add_cache_ref(&namespace, referenced);
            cache_binding = CacheBinding::Ref(referenced.to_string());
            match assistant.use_cache_ref(referenced) {
                Ok(_) => {}
                Err(BuilderError::Incomplete(_)) => {
                    self.config.add_incomplete_cache_ref(Box::new(PendingCacheRef {
                        namespace: namespace.clone(),
                        referenced: referenced.to_string(),
                    }));
                }
                Err(e) => return Err(e),
            }
        }
        if let Some(cache) = mapper.first_child("cache") {
            self.cache_element(&mut assistant, cache)?;
            cache_binding = CacheBinding::Own;
        }

        for node in mapper.children_named("parameterMap") {
            self.parameter_map_element(&assistant, node)?;
        }

        for node in mapper.children_named("resultMap") {
            match self.result_map_element(&assistant, node, None, None, true) {
                Ok(_) | Err(BuilderError::Incomplete(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let sql_nodes: Vec<&XmlFragment> = mapper.children_named("sql").collect();
        if let Some(database_id) = self.config.database_id().map(str::to_string) {
            self.sql_element(&assistant, &sql_nodes, Some(database_id.as_str()))?;
        }
        self.sql_element(&assistant, &sql_nodes, None)?;

        let statement_nodes: Vec<&XmlFragment> = mapper
            .child_elements()
            .filter(|el| STATEMENT_ELEMENTS.contains(&el.name()))
            .collect();
        if let Some(database_id) = self.config.database_id().map(str::to_string) {
            self.build_statements(
                &assistant,
                &statement_nodes,
                Some(database_id.as_str()),
                &cache_binding,
                &namespace,
            )?;
        }
        self.build_statements(&assistant, &statement_nodes, None, &cache_binding, &namespace)?;

        Ok(namespace)
    }

    fn cache_element(
        &self,
        assistant: &mut MapperBuilderAssistant<'_>,
        node: &XmlFragment,
    ) -> Result<(), BuilderError> {
        let implementation = node.attr("type").map(str::to_string);
        let eviction = node.attr("eviction").map(str::to_string);
        let clear_interval = node.attr_u64("flushInterval")?.map(Duration::from_millis);
        let size = node.attr_u64("size")?.map(|v| v as usize);
        let read_write = !node.attr_bool("readOnly", false)?;
        let blocking = node.attr_bool("blocking", false)?;
        let properties = node.property_children()?;
        assistant.use_new_cache(
            implementation,
            eviction,
            clear_interval,
            size,
            read_write,
            blocking,
            properties,
        )?;
        Ok(())
    }

    fn parameter_map_element(
        &self,
        assistant: &MapperBuilderAssistant<'_>,
        node: &XmlFragment,
    ) -> Result<(), BuilderError> {
        let id = node.required_attr("parameterMap", "id")?;
        let type_attr = node.required_attr("parameterMap", "type")?;
        let ty = self.config.type_aliases().resolve(type_attr)?;

        let mut mappings = Vec::new();
        for parameter in node.children_named("parameter") {
            let property = parameter.required_attr("parameter", "property")?;
            let mut mapping = crate::mapping::ParameterMapping::new(property);
            if let Some(alias) = parameter.attr("javaType") {
                mapping.java_type = Some(self.config.type_aliases().resolve(alias)?);
            }
            if let Some(raw) = parameter.attr("jdbcType") {
                mapping.jdbc_type =
                    Some(JdbcType::from_str(raw).map_err(|()| BuilderError::InvalidValue {
                        key: "jdbcType".to_string(),
                        value: raw.to_string(),
                        expected: "JDBC type",
                    })?);
            }
            if let Some(raw) = parameter.attr("mode") {
                mapping.mode = raw.parse().map_err(|()| BuilderError::InvalidValue {
                    key: "mode".to_string(),
                    value: raw.to_string(),
                    expected: "IN|OUT|INOUT",
                })?;
            }
            mapping.numeric_scale = parameter.attr_u32("numericScale")?;
            mapping.type_handler = parameter.attr("typeHandler").map(str::to_string);
            if let Some(result_map) = parameter.attr("resultMap") {
                mapping.result_map_id = Some(assistant.apply_current_namespace(result_map, true)?);
            }
            mappings.push(Arc::new(mapping));
        }
        assistant.add_parameter_map(id, Some(ty), mappings)?;
        Ok(())
    }

    /// Builds one result map; nested declarations recurse with generated
    /// ids. Any forward reference inside the element, its own `extends` or
    /// one raised by a nested declaration, queues this element's snapshot
    /// before the error continues upward, so every enclosing level is
    /// retried once the missing target arrives.
    fn result_map_element(
        &self,
        assistant: &MapperBuilderAssistant<'_>,
        node: &XmlFragment,
        id_override: Option<String>,
        enclosing_type: Option<&TypeRef>,
        defer: bool,
    ) -> Result<Arc<crate::mapping::ResultMap>, BuilderError> {
        match self.build_result_map(assistant, node, id_override.clone(), enclosing_type, defer) {
            Err(e @ BuilderError::Incomplete(_)) if defer => {
                self.config.add_incomplete_result_map(Box::new(PendingResultMap {
                    resource: self.resource.clone(),
                    namespace: assistant.current_namespace()?.to_string(),
                    fragment: node.clone(),
                    id_override,
                    enclosing_type: enclosing_type.cloned(),
                }));
                Err(e)
            }
            other => other,
        }
    }

    /// Deferred-entry retry: the same rebuild without re-queueing, since
    /// the drain loop keeps unresolved entries itself.
    pub(crate) fn retry_result_map(
        &self,
        assistant: &MapperBuilderAssistant<'_>,
        node: &XmlFragment,
        id_override: Option<String>,
        enclosing_type: Option<&TypeRef>,
    ) -> Result<Arc<crate::mapping::ResultMap>, BuilderError> {
        self.build_result_map(assistant, node, id_override, enclosing_type, false)
    }

    fn build_result_map(
        &self,
        assistant: &MapperBuilderAssistant<'_>,
        node: &XmlFragment,
        id_override: Option<String>,
        enclosing_type: Option<&TypeRef>,
        defer: bool,
    ) -> Result<Arc<crate::mapping::ResultMap>, BuilderError> {
        let id = match id_override {
            Some(id) => id,
            None => node.required_attr("resultMap", "id")?.to_string(),
        };
        let ty = self.resolve_result_map_type(assistant, node, enclosing_type)?;
        let extends = node.attr("extends").map(str::to_string);
        let auto_mapping = match node.attr("autoMapping") {
            None => None,
            Some(raw) => Some(raw.parse().map_err(|_| BuilderError::InvalidValue {
                key: "autoMapping".to_string(),
                value: raw.to_string(),
                expected: "boolean",
            })?),
        };

        let mut mappings: Vec<Arc<ResultMapping>> = Vec::new();
        let mut discriminator = None;
        for child in node.child_elements() {
            match child.name() {
                "constructor" => {
                    for arg in child.child_elements() {
                        let flags = ResultFlags {
                            id: arg.name() == "idArg",
                            constructor: true,
                        };
                        mappings
                            .push(self.build_result_mapping(assistant, &id, &ty, arg, flags, defer)?);
                    }
                }
                "id" | "result" => {
                    let flags = ResultFlags {
                        id: child.name() == "id",
                        constructor: false,
                    };
                    mappings
                        .push(self.build_result_mapping(assistant, &id, &ty, child, flags, defer)?);
                }
                "association" | "collection" => {
                    mappings.push(self.build_result_mapping(
                        assistant,
                        &id,
                        &ty,
                        child,
                        ResultFlags::default(),
                        defer,
                    )?);
                }
                "discriminator" => {
                    discriminator =
                        Some(self.process_discriminator(assistant, &id, &ty, child, defer)?);
                }
                other => {
                    return Err(BuilderError::Malformed {
                        element: "resultMap",
                        message: format!("unknown element <{}>", other),
                    })
                }
            }
        }

        let input = ResultMapInput {
            id,
            ty,
            extends,
            discriminator,
            mappings,
            auto_mapping,
        };
        assistant.add_result_map(&input)
    }

    /// Declared target type of a result map, or the type inherited from the
    /// enclosing declaration for nested elements.
    fn resolve_result_map_type(
        &self,
        _assistant: &MapperBuilderAssistant<'_>,
        node: &XmlFragment,
        enclosing_type: Option<&TypeRef>,
    ) -> Result<TypeRef, BuilderError> {
        let declared = node
            .attr("type")
            .or_else(|| node.attr("ofType"))
            .or_else(|| node.attr("resultType"))
            .or_else(|| node.attr("javaType"));
        if let Some(alias) = declared {
            return Ok(self.config.type_aliases().resolve(alias)?);
        }
        match (node.name(), enclosing_type) {
            ("case", Some(enclosing)) => Ok(enclosing.clone()),
            ("association", Some(enclosing)) => {
                let property = node.required_attr("association", "property")?;
                let raw = enclosing.raw_name().unwrap_or("object");
                let meta =
                    MetaClass::for_type(Arc::clone(self.config.reflector_factory()), raw)?;
                Ok(meta.setter_type(property)?)
            }
            _ => Err(BuilderError::MissingAttribute {
                element: "resultMap",
                attribute: "type",
            }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_result_mapping(
        &self,
        assistant: &MapperBuilderAssistant<'_>,
        owner_id: &str,
        owner_ty: &TypeRef,
        node: &XmlFragment,
        flags: ResultFlags,
        defer: bool,
    ) -> Result<Arc<ResultMapping>, BuilderError> {
        let property = if flags.constructor {
            node.attr("name")
        } else {
            node.attr("property")
        }
        .map(str::to_string);
        let column = node.attr("column").map(str::to_string);

        let java_type = node
            .attr("javaType")
            .map(|alias| self.config.type_aliases().resolve(alias))
            .transpose()?;
        let jdbc_type = node
            .attr("jdbcType")
            .map(|raw| {
                JdbcType::from_str(raw).map_err(|()| BuilderError::InvalidValue {
                    key: "jdbcType".to_string(),
                    value: raw.to_string(),
                    expected: "JDBC type",
                })
            })
            .transpose()?;

        let nested_select_id = node
            .attr("select")
            .map(|select| assistant.apply_current_namespace(select, true))
            .transpose()?;
        let nested_result_map_id = match node.attr("resultMap") {
            Some(result_map) => Some(assistant.apply_current_namespace(result_map, true)?),
            None => self.process_nested_result_map(assistant, owner_id, owner_ty, node, defer)?,
        };

        let lazy = match node.attr("fetchType") {
            Some("lazy") => true,
            Some("eager") => false,
            Some(other) => {
                return Err(BuilderError::InvalidValue {
                    key: "fetchType".to_string(),
                    value: other.to_string(),
                    expected: "lazy|eager",
                })
            }
            None => self.config.settings().lazy_loading_enabled,
        };

        let composites = assistant.parse_composite_column_name(column.as_deref())?;
        let not_null_columns = node
            .attr("notNullColumn")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(ResultMapping::builder()
            .property(property)
            .column(column)
            .java_type(java_type)
            .jdbc_type(jdbc_type)
            .type_handler(node.attr("typeHandler").map(str::to_string))
            .nested_select_id(nested_select_id)
            .nested_result_map_id(nested_result_map_id)
            .not_null_columns(not_null_columns)
            .column_prefix(node.attr("columnPrefix").map(str::to_string))
            .flags(flags)
            .composites(composites)
            .result_set(node.attr("resultSet").map(str::to_string))
            .foreign_column(node.attr("foreignColumn").map(str::to_string))
            .lazy(lazy)
            .build())
    }

    /// Inline nested result maps get a generated id derived from their
    /// position in the enclosing declaration.
    fn process_nested_result_map(
        &self,
        assistant: &MapperBuilderAssistant<'_>,
        owner_id: &str,
        owner_ty: &TypeRef,
        node: &XmlFragment,
        defer: bool,
    ) -> Result<Option<String>, BuilderError> {
        if !matches!(node.name(), "association" | "collection" | "case") {
            return Ok(None);
        }
        if node.attr("select").is_some() || node.child_elements().next().is_none() {
            return Ok(None);
        }
        if node.name() == "collection"
            && node.attr("property").is_none()
        {
            return Err(BuilderError::MissingAttribute {
                element: "collection",
                attribute: "property",
            });
        }
        let id = nested_id(owner_id, node);
        let nested = self.result_map_element(assistant, node, Some(id), Some(owner_ty), defer)?;
        Ok(Some(nested.id().to_string()))
    }

    fn process_discriminator(
        &self,
        assistant: &MapperBuilderAssistant<'_>,
        owner_id: &str,
        owner_ty: &TypeRef,
        node: &XmlFragment,
        defer: bool,
    ) -> Result<Discriminator, BuilderError> {
        let column = node.attr("column").map(str::to_string);
        let java_type = node
            .attr("javaType")
            .map(|alias| self.config.type_aliases().resolve(alias))
            .transpose()?;
        let jdbc_type = node
            .attr("jdbcType")
            .map(|raw| {
                JdbcType::from_str(raw).map_err(|()| BuilderError::InvalidValue {
                    key: "jdbcType".to_string(),
                    value: raw.to_string(),
                    expected: "JDBC type",
                })
            })
            .transpose()?;

        let mut cases = BTreeMap::new();
        for case in node.children_named("case") {
            let value = case.required_attr("case", "value")?;
            let result_map_id = match case.attr("resultMap") {
                Some(result_map) => assistant.apply_current_namespace(result_map, true)?,
                None => {
                    let id = nested_id(owner_id, case);
                    let nested =
                        self.result_map_element(assistant, case, Some(id), Some(owner_ty), defer)?;
                    nested.id().to_string()
                }
            };
            cases.insert(value.to_string(), result_map_id);
        }

        Ok(Discriminator {
            column,
            java_type,
            jdbc_type,
            type_handler: node.attr("typeHandler").map(str::to_string),
            cases,
        })
    }

    /// Fragments are filtered by database id in two passes, the current id
    /// first so specific declarations shadow generic ones.
    fn sql_element(
        &self,
        assistant: &MapperBuilderAssistant<'_>,
        nodes: &[&XmlFragment],
        required_database_id: Option<&str>,
    ) -> Result<(), BuilderError> {
        for node in nodes {
            let id = node.required_attr("sql", "id")?;
            let qualified = assistant.apply_current_namespace(id, false)?;
            let database_id = node.attr("databaseId");
            let matches = if let Some(required) = required_database_id {
                database_id == Some(required)
            } else if database_id.is_some() {
                false
            } else {
                match self.config.sql_fragment(&qualified) {
                    None => true,
                    Some(existing) => existing.attr("databaseId").is_none(),
                }
            };
            if matches {
                self.config.add_sql_fragment(&qualified, (*node).clone());
            }
        }
        Ok(())
    }

    fn build_statements(
        &self,
        assistant: &MapperBuilderAssistant<'_>,
        nodes: &[&XmlFragment],
        required_database_id: Option<&str>,
        cache_binding: &CacheBinding,
        namespace: &str,
    ) -> Result<(), BuilderError> {
        for node in nodes {
            match parse_statement_node(self.config, assistant, node, required_database_id) {
                Ok(()) => {}
                Err(BuilderError::Incomplete(_)) => {
                    self.config.add_incomplete_statement(Box::new(PendingStatement {
                        resource: self.resource.clone(),
                        namespace: namespace.to_string(),
                        cache_binding: cache_binding.clone(),
                        fragment: (*node).clone(),
                        required_database_id: required_database_id.map(str::to_string),
                    }));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Binds the namespace to a schema type of the same name when present.
    fn bind_mapper_for_namespace(&self, namespace: &str) {
        if !self.config.schema().contains(namespace) || self.config.has_mapper(namespace) {
            return;
        }
        self.config
            .add_loaded_resource(&format!("namespace:{}", namespace));
        self.config.add_mapper(namespace);
        log::debug!("[builder] bound mapper type '{}'", namespace);
    }
}

fn nested_id(owner_id: &str, node: &XmlFragment) -> String {
    let tag = node
        .attr("property")
        .or_else(|| node.attr("name"))
        .or_else(|| node.attr("value"))
        .unwrap_or("unnamed");
    format!("{}_{}[{}]", owner_id, node.name(), tag)
}

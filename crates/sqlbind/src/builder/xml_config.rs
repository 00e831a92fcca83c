// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Root configuration document parsing.
//!
//! Sections are mandatory-ordered: `properties` supplies the `${…}` table
//! consumed by every later section, and `environments` must follow the
//! factory sections so data-source construction can use them. Settings are
//! validated as soon as they are read and applied after the factory
//! sections, before any environment is built.

use super::fragment::XmlFragment;
use super::xml_mapper::XmlMapperBuilder;
use crate::config::{Configuration, InterceptorDescriptor, Settings};
use crate::error::BuilderError;
use crate::mapping::{Environment, TransactionManagerKind};
use crate::parsing::parse_properties;
use crate::resources::Resources;
use crate::schema::{builtin, TypeDefKind, TypeSchema};
use crate::value::Properties;
use std::str::FromStr;
use std::sync::Arc;

const SECTIONS: &[&str] = &[
    "properties",
    "settings",
    "typeAliases",
    "plugins",
    "objectFactory",
    "objectWrapperFactory",
    "reflectorFactory",
    "environments",
    "databaseIdProvider",
    "typeHandlers",
    "mappers",
];

pub struct XmlConfigBuilder {
    config: Configuration,
}

/// `<setting name="…" value="…"/>` children as a table.
fn setting_children(node: &XmlFragment) -> Result<Properties, BuilderError> {
    let mut props = Properties::new();
    for setting in node.children_named("setting") {
        let name = setting.required_attr("setting", "name")?;
        let value = setting.required_attr("setting", "value")?;
        props.insert(name.to_string(), value.to_string());
    }
    Ok(props)
}

impl XmlConfigBuilder {
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self {
            config: Configuration::new(schema),
        }
    }

    /// Caller-supplied variables; they override anything the `properties`
    /// section loads.
    pub fn with_variables(mut self, variables: Properties) -> Self {
        self.config.merge_variables(variables);
        self
    }

    /// Pre-parse access, e.g. to register drivers or custom providers.
    pub fn config_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }

    /// Parses the root document and yields the sealed registry.
    pub fn parse(mut self, xml: &str) -> Result<Configuration, BuilderError> {
        let doc = roxmltree::Document::parse(xml).map_err(|e| BuilderError::Xml {
            resource: "<configuration>".to_string(),
            message: e.to_string(),
        })?;
        let root = doc.root_element();
        if root.tag_name().name() != "configuration" {
            return Err(BuilderError::Malformed {
                element: "configuration",
                message: format!(
                    "expected <configuration> root, found <{}>",
                    root.tag_name().name()
                ),
            });
        }

        let mut next_allowed = 0usize;
        let mut settings: Option<Properties> = None;
        for child in root.children().filter(roxmltree::Node::is_element) {
            let name = child.tag_name().name();
            let position = SECTIONS.iter().position(|s| *s == name).ok_or_else(|| {
                BuilderError::Section {
                    section: name.to_string(),
                    message: "unknown section",
                }
            })?;
            if position < next_allowed {
                return Err(BuilderError::Section {
                    section: name.to_string(),
                    message: "section out of mandated order or repeated",
                });
            }
            next_allowed = position + 1;

            // capture after the variable table is current
            let fragment = XmlFragment::capture(child, self.config.variables());
            match name {
                "properties" => self.properties_element(&fragment)?,
                "settings" => {
                    let props = setting_children(&fragment)?;
                    Settings::validate_keys(props.keys().map(String::as_str))?;
                    settings = Some(props);
                }
                "typeAliases" => self.type_aliases_element(&fragment)?,
                "plugins" => self.plugins_element(&fragment)?,
                "objectFactory" => self.object_factory_element(&fragment)?,
                "objectWrapperFactory" => self.object_wrapper_factory_element(&fragment)?,
                "reflectorFactory" => self.reflector_factory_element(&fragment)?,
                "environments" => {
                    if let Some(props) = settings.take() {
                        self.apply_settings(&props)?;
                    }
                    self.environments_element(&fragment)?;
                }
                "databaseIdProvider" => {
                    if let Some(props) = settings.take() {
                        self.apply_settings(&props)?;
                    }
                    self.database_id_provider_element(&fragment)?;
                }
                "typeHandlers" => {
                    if let Some(props) = settings.take() {
                        self.apply_settings(&props)?;
                    }
                    self.type_handlers_element(&fragment)?;
                }
                "mappers" => {
                    if let Some(props) = settings.take() {
                        self.apply_settings(&props)?;
                    }
                    self.mappers_element(&fragment)?;
                }
                _ => {}
            }
        }
        if let Some(props) = settings.take() {
            self.apply_settings(&props)?;
        }

        self.config.drain_pending()?;
        self.config.validate_pending()?;
        Ok(self.config)
    }

    /// Merge order: nested pairs, then the loaded file, then caller
    /// variables on top.
    fn properties_element(&mut self, node: &XmlFragment) -> Result<(), BuilderError> {
        let resource = node.attr("resource");
        let url = node.attr("url");
        if resource.is_some() && url.is_some() {
            return Err(BuilderError::ExclusiveAttributes {
                element: "properties",
                first: "resource",
                second: "url",
            });
        }
        let mut merged = node.property_children()?;
        if let Some(resource) = resource {
            merged.extend(parse_properties(&Resources::load(resource)?));
        } else if let Some(url) = url {
            merged.extend(parse_properties(&Resources::load_url(url)?));
        }
        merged.extend(self.config.variables().clone());
        self.config.set_variables(merged);
        Ok(())
    }

    fn apply_settings(&mut self, props: &Properties) -> Result<(), BuilderError> {
        for (key, value) in props {
            self.config.settings_mut().apply(key, value)?;
        }
        if let Some(language) = self.config.settings().default_scripting_language.clone() {
            self.config.language().set_default(&language)?;
        }
        Ok(())
    }

    fn type_aliases_element(&self, node: &XmlFragment) -> Result<(), BuilderError> {
        for child in node.child_elements() {
            match child.name() {
                "package" => {
                    let name = child.required_attr("package", "name")?;
                    self.config.type_aliases().register_package(name, None)?;
                }
                "typeAlias" => {
                    let type_name = child.required_attr("typeAlias", "type")?;
                    let ty = self.config.type_aliases().resolve(type_name)?;
                    match child.attr("alias") {
                        Some(alias) => self.config.type_aliases().register(alias, ty)?,
                        None => {
                            let simple = type_name.rsplit('.').next().unwrap_or(type_name);
                            self.config.type_aliases().register(simple, ty)?;
                        }
                    }
                }
                other => {
                    return Err(BuilderError::Malformed {
                        element: "typeAliases",
                        message: format!("unknown element <{}>", other),
                    })
                }
            }
        }
        Ok(())
    }

    fn plugins_element(&mut self, node: &XmlFragment) -> Result<(), BuilderError> {
        for plugin in node.children_named("plugin") {
            let interceptor = plugin.required_attr("plugin", "interceptor")?;
            let properties = plugin.property_children()?;
            self.config.add_interceptor(InterceptorDescriptor {
                type_name: interceptor.to_string(),
                properties,
            });
        }
        Ok(())
    }

    fn object_factory_element(&mut self, node: &XmlFragment) -> Result<(), BuilderError> {
        let type_name = node.required_attr("objectFactory", "type")?;
        if !type_name.eq_ignore_ascii_case("default") {
            return Err(BuilderError::UnknownProvider {
                kind: "object factory",
                name: type_name.to_string(),
            });
        }
        let properties = node.property_children()?;
        self.config.object_factory().set_properties(&properties);
        Ok(())
    }

    fn object_wrapper_factory_element(&mut self, node: &XmlFragment) -> Result<(), BuilderError> {
        let type_name = node.required_attr("objectWrapperFactory", "type")?;
        if !type_name.eq_ignore_ascii_case("default") {
            return Err(BuilderError::UnknownProvider {
                kind: "object wrapper factory",
                name: type_name.to_string(),
            });
        }
        self.config.set_object_wrapper_factory(Some(type_name.to_string()));
        Ok(())
    }

    fn reflector_factory_element(&mut self, node: &XmlFragment) -> Result<(), BuilderError> {
        let type_name = node.required_attr("reflectorFactory", "type")?;
        if !type_name.eq_ignore_ascii_case("default") {
            return Err(BuilderError::UnknownProvider {
                kind: "reflector factory",
                name: type_name.to_string(),
            });
        }
        Ok(())
    }

    fn environments_element(&mut self, node: &XmlFragment) -> Result<(), BuilderError> {
        let default = node.required_attr("environments", "default")?;
        for environment in node.children_named("environment") {
            let id = environment.required_attr("environment", "id")?;
            if id != default {
                continue;
            }
            let tm_node = environment
                .first_child("transactionManager")
                .ok_or(BuilderError::MissingAttribute {
                    element: "environment",
                    attribute: "transactionManager",
                })?;
            let tm_type = tm_node.required_attr("transactionManager", "type")?;
            let transaction_manager =
                TransactionManagerKind::from_str(tm_type).map_err(|()| {
                    BuilderError::UnknownProvider {
                        kind: "transaction manager",
                        name: tm_type.to_string(),
                    }
                })?;

            let ds_node =
                environment
                    .first_child("dataSource")
                    .ok_or(BuilderError::MissingAttribute {
                        element: "environment",
                        attribute: "dataSource",
                    })?;
            let ds_type = ds_node.required_attr("dataSource", "type")?;
            let mut factory = self.config.datasource_providers().create(ds_type)?;
            factory.set_properties(&ds_node.property_children()?, self.config.drivers())?;
            let data_source = factory.data_source()?;

            self.config
                .set_environment(Environment::new(id, transaction_manager, data_source));
            return Ok(());
        }
        Err(BuilderError::Malformed {
            element: "environments",
            message: format!("no environment matches default '{}'", default),
        })
    }

    /// Vendor-based database id: the connection's product name is mapped
    /// through the provided properties, or used verbatim without them.
    fn database_id_provider_element(&mut self, node: &XmlFragment) -> Result<(), BuilderError> {
        let type_name = node.required_attr("databaseIdProvider", "type")?;
        if !type_name.eq_ignore_ascii_case("DB_VENDOR") && !type_name.eq_ignore_ascii_case("VENDOR")
        {
            return Err(BuilderError::UnknownProvider {
                kind: "database id provider",
                name: type_name.to_string(),
            });
        }
        let properties = node.property_children()?;
        let Some(environment) = self.config.environment() else {
            return Ok(());
        };
        let connection = environment
            .data_source()
            .connection()
            .map_err(BuilderError::Connection)?;
        let product = connection.product_name().map_err(BuilderError::Connection)?;
        let _ = connection.close();
        let database_id = if properties.is_empty() {
            Some(product)
        } else {
            properties
                .iter()
                .find(|(vendor, _)| product.contains(vendor.as_str()))
                .map(|(_, id)| id.clone())
        };
        log::debug!("[builder] database id resolved to {:?}", database_id);
        self.config.set_database_id(database_id);
        Ok(())
    }

    fn type_handlers_element(&self, node: &XmlFragment) -> Result<(), BuilderError> {
        for child in node.child_elements() {
            match child.name() {
                "package" => {
                    let name = child.required_attr("package", "name")?;
                    for def in self.config.schema().types_in_package(name) {
                        if def.kind == TypeDefKind::Interface || def.is_inner || def.is_anonymous {
                            continue;
                        }
                        if !self
                            .config
                            .schema()
                            .is_assignable(&def.name, builtin::TYPE_HANDLER)
                        {
                            continue;
                        }
                        self.config.type_handlers().register(
                            crate::types::TypeHandlerDescriptor::new(
                                def.name.to_string(),
                                None,
                                None,
                            ),
                        );
                    }
                }
                "typeHandler" => {
                    let handler = child.required_attr("typeHandler", "handler")?;
                    let java_type = child
                        .attr("javaType")
                        .map(|alias| self.config.type_aliases().resolve(alias))
                        .transpose()?;
                    let jdbc_type = child
                        .attr("jdbcType")
                        .map(|raw| {
                            raw.parse().map_err(|()| BuilderError::InvalidValue {
                                key: "jdbcType".to_string(),
                                value: raw.to_string(),
                                expected: "JDBC type",
                            })
                        })
                        .transpose()?;
                    self.config
                        .type_handlers()
                        .register(crate::types::TypeHandlerDescriptor::new(
                            handler, java_type, jdbc_type,
                        ));
                }
                other => {
                    return Err(BuilderError::Malformed {
                        element: "typeHandlers",
                        message: format!("unknown element <{}>", other),
                    })
                }
            }
        }
        Ok(())
    }

    fn mappers_element(&mut self, node: &XmlFragment) -> Result<(), BuilderError> {
        for child in node.child_elements() {
            match child.name() {
                "package" => {
                    let name = child.required_attr("package", "name")?;
                    for def in self.config.schema().types_in_package(name) {
                        if def.kind == TypeDefKind::Interface {
                            self.config.add_mapper(&def.name);
                        }
                    }
                }
                "mapper" => {
                    let resource = child.attr("resource");
                    let url = child.attr("url");
                    let class = child.attr("class");
                    match (resource, url, class) {
                        (Some(resource), None, None) => {
                            let text = Resources::load(resource)?;
                            XmlMapperBuilder::new(&self.config, resource).parse(&text)?;
                        }
                        (None, Some(url), None) => {
                            let text = Resources::load_url(url)?;
                            XmlMapperBuilder::new(&self.config, url).parse(&text)?;
                        }
                        (None, None, Some(class)) => {
                            self.config.add_mapper(class);
                        }
                        _ => {
                            return Err(BuilderError::Malformed {
                                element: "mapper",
                                message:
                                    "specify exactly one of 'resource', 'url', or 'class'"
                                        .to_string(),
                            })
                        }
                    }
                }
                other => {
                    return Err(BuilderError::Malformed {
                        element: "mappers",
                        message: format!("unknown element <{}>", other),
                    })
                }
            }
        }
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! SQL text sources and the language-driver seam.
//!
//! Dynamic SQL assembly is an external concern; the core ships a raw driver
//! that extracts `#{…}` placeholders into positional markers and records the
//! resulting parameter mappings.

use super::parameter_map::{ParameterMapping, ParameterMode};
use crate::error::BuilderError;
use crate::parsing::GenericTokenParser;
use crate::schema::TypeRef;
use crate::types::{JdbcType, TypeAliasRegistry};
use crate::value::Value;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// SQL ready for preparation: text plus ordered placeholder bindings.
#[derive(Debug, Clone)]
pub struct BoundSql {
    pub sql: String,
    pub parameter_mappings: Vec<Arc<ParameterMapping>>,
}

/// Produces [`BoundSql`] for a parameter object.
pub trait SqlSource: Send + Sync {
    fn bound_sql(&self, parameter: &Value) -> BoundSql;
}

/// Pre-resolved SQL, bound once at build time.
pub struct StaticSqlSource {
    sql: String,
    parameter_mappings: Vec<Arc<ParameterMapping>>,
}

impl StaticSqlSource {
    pub fn new(sql: impl Into<String>, parameter_mappings: Vec<Arc<ParameterMapping>>) -> Self {
        Self {
            sql: sql.into(),
            parameter_mappings,
        }
    }
}

impl SqlSource for StaticSqlSource {
    fn bound_sql(&self, _parameter: &Value) -> BoundSql {
        BoundSql {
            sql: self.sql.clone(),
            parameter_mappings: self.parameter_mappings.clone(),
        }
    }
}

/// Parses `#{property,attr=value,…}` placeholders into `?` markers.
pub struct RawSqlSource {
    delegate: StaticSqlSource,
}

impl RawSqlSource {
    pub fn new(
        aliases: &TypeAliasRegistry,
        script: &str,
        _parameter_type: Option<&TypeRef>,
    ) -> Result<Self, BuilderError> {
        let mut mappings: Vec<Arc<ParameterMapping>> = Vec::new();
        let mut failure: Option<BuilderError> = None;
        let parser = GenericTokenParser::new("#{", "}");
        let sql = parser.parse(script, &mut |expression| {
            if failure.is_none() {
                match parse_parameter_expression(aliases, expression) {
                    Ok(mapping) => mappings.push(Arc::new(mapping)),
                    Err(e) => failure = Some(e),
                }
            }
            "?".to_string()
        });
        if let Some(e) = failure {
            return Err(e);
        }
        Ok(Self {
            delegate: StaticSqlSource::new(sql, mappings),
        })
    }
}

impl SqlSource for RawSqlSource {
    fn bound_sql(&self, parameter: &Value) -> BoundSql {
        self.delegate.bound_sql(parameter)
    }
}

/// `property,javaType=…,jdbcType=…,mode=…,numericScale=…,typeHandler=…`
fn parse_parameter_expression(
    aliases: &TypeAliasRegistry,
    expression: &str,
) -> Result<ParameterMapping, BuilderError> {
    let mut parts = expression.split(',');
    let property = parts.next().unwrap_or_default().trim();
    if property.is_empty() {
        return Err(BuilderError::Malformed {
            element: "parameter",
            message: format!("empty placeholder expression '{}'", expression),
        });
    }
    let mut mapping = ParameterMapping::new(property);
    for attr in parts {
        let Some((key, value)) = attr.split_once('=') else {
            return Err(BuilderError::Malformed {
                element: "parameter",
                message: format!("expected key=value in '{}'", attr),
            });
        };
        let key = key.trim();
        let value = value.trim();
        match key {
            "javaType" => mapping.java_type = Some(aliases.resolve(value)?),
            "jdbcType" => {
                mapping.jdbc_type =
                    Some(value.parse::<JdbcType>().map_err(|()| BuilderError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        expected: "JDBC type",
                    })?);
            }
            "mode" => {
                mapping.mode =
                    value
                        .parse::<ParameterMode>()
                        .map_err(|()| BuilderError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                            expected: "parameter mode",
                        })?;
            }
            "numericScale" => {
                mapping.numeric_scale =
                    Some(value.parse::<u32>().map_err(|_| BuilderError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        expected: "integer",
                    })?);
            }
            "typeHandler" => mapping.type_handler = Some(value.to_string()),
            "resultMap" => mapping.result_map_id = Some(value.to_string()),
            other => {
                return Err(BuilderError::Malformed {
                    element: "parameter",
                    message: format!("unknown placeholder attribute '{}'", other),
                })
            }
        }
    }
    Ok(mapping)
}

/// Turns statement text into an executable [`SqlSource`].
pub trait LanguageDriver: Send + Sync {
    fn create_sql_source(
        &self,
        aliases: &TypeAliasRegistry,
        script: &str,
        parameter_type: Option<&TypeRef>,
    ) -> Result<Arc<dyn SqlSource>, BuilderError>;
}

/// Placeholder extraction only; no dynamic assembly.
pub struct RawLanguageDriver;

impl LanguageDriver for RawLanguageDriver {
    fn create_sql_source(
        &self,
        aliases: &TypeAliasRegistry,
        script: &str,
        parameter_type: Option<&TypeRef>,
    ) -> Result<Arc<dyn SqlSource>, BuilderError> {
        Ok(Arc::new(RawSqlSource::new(aliases, script, parameter_type)?))
    }
}

/// Alias-keyed driver registry with a configurable default.
pub struct LanguageRegistry {
    drivers: DashMap<String, Arc<dyn LanguageDriver>>,
    default_name: RwLock<String>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let registry = Self {
            drivers: DashMap::new(),
            default_name: RwLock::new("xml".to_string()),
        };
        let raw: Arc<dyn LanguageDriver> = Arc::new(RawLanguageDriver);
        registry.drivers.insert("raw".to_string(), Arc::clone(&raw));
        registry.drivers.insert("xml".to_string(), raw);
        registry
    }

    pub fn register(&self, name: &str, driver: Arc<dyn LanguageDriver>) {
        self.drivers.insert(name.to_lowercase(), driver);
    }

    pub fn set_default(&self, name: &str) -> Result<(), BuilderError> {
        if !self.drivers.contains_key(&name.to_lowercase()) {
            return Err(BuilderError::UnknownProvider {
                kind: "language driver",
                name: name.to_string(),
            });
        }
        *self.default_name.write() = name.to_lowercase();
        Ok(())
    }

    pub fn default_name(&self) -> String {
        self.default_name.read().clone()
    }

    /// Driver under `name`, or the default driver when `name` is None.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn LanguageDriver>, BuilderError> {
        let key = name
            .map(str::to_lowercase)
            .unwrap_or_else(|| self.default_name());
        self.drivers
            .get(&key)
            .map(|hit| Arc::clone(hit.value()))
            .ok_or(BuilderError::UnknownProvider {
                kind: "language driver",
                name: key,
            })
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeSchema;

    fn aliases() -> TypeAliasRegistry {
        TypeAliasRegistry::new(Arc::new(TypeSchema::new()))
    }

    #[test]
    fn test_placeholders_become_markers() {
        let src = RawSqlSource::new(
            &aliases(),
            "insert into users (id, name) values (#{id}, #{name})",
            None,
        )
        .unwrap();
        let bound = src.bound_sql(&Value::Null);
        assert_eq!(bound.sql, "insert into users (id, name) values (?, ?)");
        let props: Vec<_> = bound
            .parameter_mappings
            .iter()
            .map(|m| m.property.clone())
            .collect();
        assert_eq!(props, vec!["id", "name"]);
    }

    #[test]
    fn test_placeholder_attributes() {
        let src = RawSqlSource::new(
            &aliases(),
            "update t set v = #{value,javaType=int,jdbcType=NUMERIC,mode=INOUT,numericScale=2}",
            None,
        )
        .unwrap();
        let bound = src.bound_sql(&Value::Null);
        let mapping = &bound.parameter_mappings[0];
        assert_eq!(mapping.java_type, Some(TypeRef::concrete("int")));
        assert_eq!(mapping.jdbc_type, Some(JdbcType::Numeric));
        assert_eq!(mapping.mode, ParameterMode::InOut);
        assert_eq!(mapping.numeric_scale, Some(2));
    }

    #[test]
    fn test_bad_attribute_rejected() {
        assert!(RawSqlSource::new(&aliases(), "select #{id,wat=1}", None).is_err());
        assert!(RawSqlSource::new(&aliases(), "select #{id,jdbcType=NOPE}", None).is_err());
    }

    #[test]
    fn test_registry_default_driver() {
        let registry = LanguageRegistry::new();
        assert!(registry.resolve(None).is_ok());
        assert!(registry.resolve(Some("raw")).is_ok());
        assert!(registry.resolve(Some("velocity")).is_err());
        assert!(registry.set_default("raw").is_ok());
        assert_eq!(registry.default_name(), "raw");
        assert!(registry.set_default("velocity").is_err());
    }
}

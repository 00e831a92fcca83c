// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Global settings and their validation.

use crate::error::BuilderError;
use crate::types::JdbcType;
use std::collections::BTreeSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorType {
    Simple,
    Reuse,
    Batch,
}

impl FromStr for ExecutorType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "SIMPLE" => ExecutorType::Simple,
            "REUSE" => ExecutorType::Reuse,
            "BATCH" => ExecutorType::Batch,
            _ => return Err(()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoMappingBehavior {
    None,
    Partial,
    Full,
}

impl FromStr for AutoMappingBehavior {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "NONE" => AutoMappingBehavior::None,
            "PARTIAL" => AutoMappingBehavior::Partial,
            "FULL" => AutoMappingBehavior::Full,
            _ => return Err(()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoMappingUnknownColumnBehavior {
    None,
    Warning,
    Failing,
}

impl FromStr for AutoMappingUnknownColumnBehavior {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "NONE" => AutoMappingUnknownColumnBehavior::None,
            "WARNING" => AutoMappingUnknownColumnBehavior::Warning,
            "FAILING" => AutoMappingUnknownColumnBehavior::Failing,
            _ => return Err(()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCacheScope {
    Session,
    Statement,
}

impl FromStr for LocalCacheScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "SESSION" => LocalCacheScope::Session,
            "STATEMENT" => LocalCacheScope::Statement,
            _ => return Err(()),
        })
    }
}

/// Global behavior switches, applied from the `<settings>` section.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cache_enabled: bool,
    pub lazy_loading_enabled: bool,
    pub aggressive_lazy_loading: bool,
    pub multiple_result_sets_enabled: bool,
    pub use_column_label: bool,
    pub use_generated_keys: bool,
    pub auto_mapping_behavior: AutoMappingBehavior,
    pub auto_mapping_unknown_column_behavior: AutoMappingUnknownColumnBehavior,
    pub default_executor_type: ExecutorType,
    pub default_statement_timeout: Option<u64>,
    pub default_fetch_size: Option<u32>,
    pub map_underscore_to_camel_case: bool,
    pub local_cache_scope: LocalCacheScope,
    pub jdbc_type_for_null: JdbcType,
    pub lazy_load_trigger_methods: BTreeSet<String>,
    pub safe_row_bounds_enabled: bool,
    pub safe_result_handler_enabled: bool,
    pub default_scripting_language: Option<String>,
    pub default_enum_type_handler: Option<String>,
    pub call_setters_on_nulls: bool,
    pub return_instance_for_empty_row: bool,
    pub shrink_whitespaces_in_sql: bool,
    pub arg_name_based_constructor_auto_mapping: bool,
    pub nullable_on_for_each: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            lazy_loading_enabled: false,
            aggressive_lazy_loading: false,
            multiple_result_sets_enabled: true,
            use_column_label: true,
            use_generated_keys: false,
            auto_mapping_behavior: AutoMappingBehavior::Partial,
            auto_mapping_unknown_column_behavior: AutoMappingUnknownColumnBehavior::None,
            default_executor_type: ExecutorType::Simple,
            default_statement_timeout: None,
            default_fetch_size: None,
            map_underscore_to_camel_case: false,
            local_cache_scope: LocalCacheScope::Session,
            jdbc_type_for_null: JdbcType::Other,
            lazy_load_trigger_methods: ["equals", "clone", "hashCode", "toString"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            safe_row_bounds_enabled: false,
            safe_result_handler_enabled: true,
            default_scripting_language: None,
            default_enum_type_handler: None,
            call_setters_on_nulls: false,
            return_instance_for_empty_row: false,
            shrink_whitespaces_in_sql: false,
            arg_name_based_constructor_auto_mapping: false,
            nullable_on_for_each: false,
        }
    }
}

const KNOWN_KEYS: &[&str] = &[
    "cacheEnabled",
    "lazyLoadingEnabled",
    "aggressiveLazyLoading",
    "multipleResultSetsEnabled",
    "useColumnLabel",
    "useGeneratedKeys",
    "autoMappingBehavior",
    "autoMappingUnknownColumnBehavior",
    "defaultExecutorType",
    "defaultStatementTimeout",
    "defaultFetchSize",
    "mapUnderscoreToCamelCase",
    "localCacheScope",
    "jdbcTypeForNull",
    "lazyLoadTriggerMethods",
    "safeRowBoundsEnabled",
    "safeResultHandlerEnabled",
    "defaultScriptingLanguage",
    "defaultEnumTypeHandler",
    "callSettersOnNulls",
    "returnInstanceForEmptyRow",
    "shrinkWhitespacesInSql",
    "argNameBasedConstructorAutoMapping",
    "nullableOnForEach",
];

impl Settings {
    /// Rejects any key that is not a recognized setting.
    pub fn validate_keys<'a>(keys: impl Iterator<Item = &'a str>) -> Result<(), BuilderError> {
        for key in keys {
            if !KNOWN_KEYS.contains(&key) {
                return Err(BuilderError::UnknownSetting {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Applies one setting with type coercion.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), BuilderError> {
        fn coerce<T: FromStr>(
            key: &str,
            value: &str,
            expected: &'static str,
        ) -> Result<T, BuilderError> {
            value.parse().map_err(|_| BuilderError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                expected,
            })
        }

        match key {
            "cacheEnabled" => self.cache_enabled = coerce(key, value, "boolean")?,
            "lazyLoadingEnabled" => self.lazy_loading_enabled = coerce(key, value, "boolean")?,
            "aggressiveLazyLoading" => {
                self.aggressive_lazy_loading = coerce(key, value, "boolean")?;
            }
            "multipleResultSetsEnabled" => {
                self.multiple_result_sets_enabled = coerce(key, value, "boolean")?;
            }
            "useColumnLabel" => self.use_column_label = coerce(key, value, "boolean")?,
            "useGeneratedKeys" => self.use_generated_keys = coerce(key, value, "boolean")?,
            "autoMappingBehavior" => {
                self.auto_mapping_behavior = coerce(key, value, "NONE|PARTIAL|FULL")?;
            }
            "autoMappingUnknownColumnBehavior" => {
                self.auto_mapping_unknown_column_behavior =
                    coerce(key, value, "NONE|WARNING|FAILING")?;
            }
            "defaultExecutorType" => {
                self.default_executor_type = coerce(key, value, "SIMPLE|REUSE|BATCH")?;
            }
            "defaultStatementTimeout" => {
                self.default_statement_timeout = Some(coerce(key, value, "integer")?);
            }
            "defaultFetchSize" => {
                self.default_fetch_size = Some(coerce(key, value, "integer")?);
            }
            "mapUnderscoreToCamelCase" => {
                self.map_underscore_to_camel_case = coerce(key, value, "boolean")?;
            }
            "localCacheScope" => {
                self.local_cache_scope = coerce(key, value, "SESSION|STATEMENT")?;
            }
            "jdbcTypeForNull" => self.jdbc_type_for_null = coerce(key, value, "JDBC type")?,
            "lazyLoadTriggerMethods" => {
                self.lazy_load_trigger_methods = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "safeRowBoundsEnabled" => {
                self.safe_row_bounds_enabled = coerce(key, value, "boolean")?;
            }
            "safeResultHandlerEnabled" => {
                self.safe_result_handler_enabled = coerce(key, value, "boolean")?;
            }
            "defaultScriptingLanguage" => {
                self.default_scripting_language = Some(value.to_string());
            }
            "defaultEnumTypeHandler" => {
                self.default_enum_type_handler = Some(value.to_string());
            }
            "callSettersOnNulls" => self.call_setters_on_nulls = coerce(key, value, "boolean")?,
            "returnInstanceForEmptyRow" => {
                self.return_instance_for_empty_row = coerce(key, value, "boolean")?;
            }
            "shrinkWhitespacesInSql" => {
                self.shrink_whitespaces_in_sql = coerce(key, value, "boolean")?;
            }
            "argNameBasedConstructorAutoMapping" => {
                self.arg_name_based_constructor_auto_mapping = coerce(key, value, "boolean")?;
            }
            "nullableOnForEach" => self.nullable_on_for_each = coerce(key, value, "boolean")?,
            other => {
                return Err(BuilderError::UnknownSetting {
                    key: other.to_string(),
                })
            }
        }
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Statement element parsing.

use super::assistant::{MapperBuilderAssistant, StatementSpec};
use super::fragment::{XmlFragment, XmlNode};
use crate::config::Configuration;
use crate::error::{BuilderError, PendingKind};
use crate::mapping::{KeyGeneratorKind, ResultSetType, SqlCommandType, StatementType};
use std::str::FromStr;

pub(crate) const STATEMENT_ELEMENTS: &[&str] = &["select", "insert", "update", "delete"];

/// Parses one `select|insert|update|delete` element and registers the
/// statement. Returns without effect when the element does not match the
/// requested database id.
pub(crate) fn parse_statement_node(
    config: &Configuration,
    assistant: &MapperBuilderAssistant<'_>,
    node: &XmlFragment,
    required_database_id: Option<&str>,
) -> Result<(), BuilderError> {
    let id = node.required_attr("statement", "id")?;
    let database_id = node.attr("databaseId");
    if !database_id_matches_current(config, assistant, id, database_id, required_database_id)? {
        return Ok(());
    }

    let command = SqlCommandType::from_element(node.name());
    if command == SqlCommandType::Unknown {
        return Err(BuilderError::Malformed {
            element: "mapper",
            message: format!("'{}' is not a statement element", node.name()),
        });
    }
    let is_select = command == SqlCommandType::Select;
    let is_insert = command == SqlCommandType::Insert;

    let statement_type = match node.attr("statementType") {
        None => StatementType::Prepared,
        Some(raw) => StatementType::from_str(raw).map_err(|()| BuilderError::InvalidValue {
            key: "statementType".to_string(),
            value: raw.to_string(),
            expected: "STATEMENT|PREPARED|CALLABLE",
        })?,
    };
    let result_set_type = match node.attr("resultSetType") {
        None => ResultSetType::Default,
        Some(raw) => ResultSetType::from_str(raw).map_err(|()| BuilderError::InvalidValue {
            key: "resultSetType".to_string(),
            value: raw.to_string(),
            expected: "DEFAULT|FORWARD_ONLY|SCROLL_INSENSITIVE|SCROLL_SENSITIVE",
        })?,
    };

    let parameter_type = node
        .attr("parameterType")
        .map(|alias| config.type_aliases().resolve(alias))
        .transpose()?;
    let result_type = node
        .attr("resultType")
        .map(|alias| config.type_aliases().resolve(alias))
        .transpose()?;

    let use_generated_keys = match node.attr("useGeneratedKeys") {
        Some(raw) => raw.parse().map_err(|_| BuilderError::InvalidValue {
            key: "useGeneratedKeys".to_string(),
            value: raw.to_string(),
            expected: "boolean",
        })?,
        None => config.settings().use_generated_keys && is_insert,
    };
    let key_generator = if use_generated_keys && is_insert {
        KeyGeneratorKind::Jdbc3
    } else {
        KeyGeneratorKind::None
    };

    let lang = match node.attr("lang") {
        Some(name) => {
            config.language().resolve(Some(name))?;
            name.to_string()
        }
        None => config.language().default_name(),
    };
    let driver = config.language().resolve(Some(lang.as_str()))?;

    let script = assemble_sql_text(config, assistant, node)?;
    let sql_source = driver.create_sql_source(
        config.type_aliases(),
        script.trim(),
        parameter_type.as_ref(),
    )?;

    let spec = StatementSpec {
        id: id.to_string(),
        sql_source,
        sql_command_type: command,
        statement_type,
        parameter_map: node.attr("parameterMap").map(str::to_string),
        parameter_type,
        result_map: node.attr("resultMap").map(str::to_string),
        result_type,
        result_set_type,
        fetch_size: node.attr_u32("fetchSize")?,
        timeout: node.attr_u64("timeout")?,
        flush_cache: optional_bool(node, "flushCache")?,
        use_cache: optional_bool(node, "useCache")?,
        result_ordered: node.attr_bool("resultOrdered", false)?,
        key_generator,
        key_properties: split_list(node.attr("keyProperty")),
        key_columns: split_list(node.attr("keyColumn")),
        database_id: database_id.map(str::to_string),
        result_sets: split_list(node.attr("resultSets")),
        dirty_select: is_select && node.attr_bool("affectData", false)?,
        lang,
    };
    assistant.add_mapped_statement(spec)?;
    Ok(())
}

fn optional_bool(node: &XmlFragment, name: &str) -> Result<Option<bool>, BuilderError> {
    match node.attr(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| BuilderError::InvalidValue {
                key: name.to_string(),
                value: raw.to_string(),
                expected: "boolean",
            }),
    }
}

fn split_list(attr: Option<&str>) -> Vec<String> {
    attr.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Database-id filter for the two statement passes. With a required id,
/// only matching declarations pass. Without one, an undeclared statement is
/// accepted unless a database-id-specific sibling already registered.
fn database_id_matches_current(
    config: &Configuration,
    assistant: &MapperBuilderAssistant<'_>,
    id: &str,
    database_id: Option<&str>,
    required_database_id: Option<&str>,
) -> Result<bool, BuilderError> {
    if let Some(required) = required_database_id {
        return Ok(database_id == Some(required));
    }
    if database_id.is_some() {
        return Ok(false);
    }
    let qualified = assistant.apply_current_namespace(id, false)?;
    match config.mapped_statement(&qualified) {
        None => Ok(true),
        Some(previous) => Ok(previous.database_id().is_none()),
    }
}

/// Concatenates the statement's text, splicing `<include>` fragments.
///
/// A missing fragment defers the statement; dynamic assembly elements are
/// out of scope and rejected outright.
fn assemble_sql_text(
    config: &Configuration,
    assistant: &MapperBuilderAssistant<'_>,
    node: &XmlFragment,
) -> Result<String, BuilderError> {
    let mut text = String::new();
    append_sql_text(config, assistant, node, &mut text, 0)?;
    Ok(text)
}

fn append_sql_text(
    config: &Configuration,
    assistant: &MapperBuilderAssistant<'_>,
    node: &XmlFragment,
    out: &mut String,
    depth: u32,
) -> Result<(), BuilderError> {
    if depth > 16 {
        return Err(BuilderError::Malformed {
            element: "include",
            message: "include nesting exceeds 16 levels".to_string(),
        });
    }
    for child in node.nodes() {
        match child {
            XmlNode::Text(text) => out.push_str(text),
            XmlNode::Element(element) if element.name() == "include" => {
                let refid = element.required_attr("include", "refid")?;
                let qualified = assistant.apply_current_namespace(refid, true)?;
                let fragment = config.sql_fragment(&qualified).ok_or_else(|| {
                    BuilderError::incomplete(PendingKind::Statement, &*qualified)
                })?;
                append_sql_text(config, assistant, &fragment, out, depth + 1)?;
            }
            XmlNode::Element(element) => {
                return Err(BuilderError::Malformed {
                    element: "statement",
                    message: format!(
                        "element <{}> requires a dynamic SQL driver, which is not configured",
                        element.name()
                    ),
                })
            }
        }
    }
    Ok(())
}

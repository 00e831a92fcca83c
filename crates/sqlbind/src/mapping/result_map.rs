// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Result maps: declarative column-to-property mappings.

use crate::schema::TypeRef;
use crate::types::JdbcType;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Role markers on a mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultFlags {
    pub id: bool,
    pub constructor: bool,
}

/// One column in a composite (multi-column) key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeColumn {
    pub property: String,
    pub column: String,
}

/// A single column-to-property binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMapping {
    pub property: Option<String>,
    pub column: Option<String>,
    pub java_type: Option<TypeRef>,
    pub jdbc_type: Option<JdbcType>,
    pub type_handler: Option<String>,
    /// Fully qualified id of a statement producing the nested value.
    pub nested_select_id: Option<String>,
    /// Fully qualified id of a nested result map.
    pub nested_result_map_id: Option<String>,
    pub not_null_columns: Vec<String>,
    pub column_prefix: Option<String>,
    pub flags: ResultFlags,
    pub composites: Vec<CompositeColumn>,
    pub result_set: Option<String>,
    pub foreign_column: Option<String>,
    pub lazy: bool,
}

impl ResultMapping {
    pub fn builder() -> ResultMappingBuilder {
        ResultMappingBuilder::default()
    }
}

#[derive(Default)]
pub struct ResultMappingBuilder {
    inner: Option<ResultMapping>,
}

impl ResultMappingBuilder {
    fn entry(&mut self) -> &mut ResultMapping {
        self.inner.get_or_insert_with(|| ResultMapping {
            property: None,
            column: None,
            java_type: None,
            jdbc_type: None,
            type_handler: None,
            nested_select_id: None,
            nested_result_map_id: None,
            not_null_columns: Vec::new(),
            column_prefix: None,
            flags: ResultFlags::default(),
            composites: Vec::new(),
            result_set: None,
            foreign_column: None,
            lazy: false,
        })
    }

    pub fn property(mut self, property: Option<String>) -> Self {
        self.entry().property = property;
        self
    }

    pub fn column(mut self, column: Option<String>) -> Self {
        self.entry().column = column;
        self
    }

    pub fn java_type(mut self, ty: Option<TypeRef>) -> Self {
        self.entry().java_type = ty;
        self
    }

    pub fn jdbc_type(mut self, ty: Option<JdbcType>) -> Self {
        self.entry().jdbc_type = ty;
        self
    }

    pub fn type_handler(mut self, handler: Option<String>) -> Self {
        self.entry().type_handler = handler;
        self
    }

    pub fn nested_select_id(mut self, id: Option<String>) -> Self {
        self.entry().nested_select_id = id;
        self
    }

    pub fn nested_result_map_id(mut self, id: Option<String>) -> Self {
        self.entry().nested_result_map_id = id;
        self
    }

    pub fn not_null_columns(mut self, columns: Vec<String>) -> Self {
        self.entry().not_null_columns = columns;
        self
    }

    pub fn column_prefix(mut self, prefix: Option<String>) -> Self {
        self.entry().column_prefix = prefix;
        self
    }

    pub fn flags(mut self, flags: ResultFlags) -> Self {
        self.entry().flags = flags;
        self
    }

    pub fn composites(mut self, composites: Vec<CompositeColumn>) -> Self {
        self.entry().composites = composites;
        self
    }

    pub fn result_set(mut self, result_set: Option<String>) -> Self {
        self.entry().result_set = result_set;
        self
    }

    pub fn foreign_column(mut self, column: Option<String>) -> Self {
        self.entry().foreign_column = column;
        self
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.entry().lazy = lazy;
        self
    }

    pub fn build(mut self) -> Arc<ResultMapping> {
        Arc::new(self.entry().clone())
    }
}

/// A column-value dispatch selecting among alternative result maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    pub column: Option<String>,
    pub java_type: Option<TypeRef>,
    pub jdbc_type: Option<JdbcType>,
    pub type_handler: Option<String>,
    /// Column value to fully qualified result-map id.
    pub cases: BTreeMap<String, String>,
}

/// An immutable, fully resolved result map.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMap {
    id: String,
    ty: TypeRef,
    mappings: Vec<Arc<ResultMapping>>,
    id_mappings: Vec<Arc<ResultMapping>>,
    constructor_mappings: Vec<Arc<ResultMapping>>,
    property_mappings: Vec<Arc<ResultMapping>>,
    mapped_columns: BTreeSet<String>,
    mapped_properties: BTreeSet<String>,
    discriminator: Option<Discriminator>,
    has_nested_result_maps: bool,
    has_nested_queries: bool,
    auto_mapping: Option<bool>,
}

impl ResultMap {
    pub fn builder(id: impl Into<String>, ty: TypeRef) -> ResultMapBuilder {
        ResultMapBuilder {
            id: id.into(),
            ty,
            mappings: Vec::new(),
            discriminator: None,
            auto_mapping: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn mappings(&self) -> &[Arc<ResultMapping>] {
        &self.mappings
    }

    pub fn id_mappings(&self) -> &[Arc<ResultMapping>] {
        &self.id_mappings
    }

    pub fn constructor_mappings(&self) -> &[Arc<ResultMapping>] {
        &self.constructor_mappings
    }

    pub fn property_mappings(&self) -> &[Arc<ResultMapping>] {
        &self.property_mappings
    }

    pub fn mapped_columns(&self) -> &BTreeSet<String> {
        &self.mapped_columns
    }

    pub fn mapped_properties(&self) -> &BTreeSet<String> {
        &self.mapped_properties
    }

    pub fn discriminator(&self) -> Option<&Discriminator> {
        self.discriminator.as_ref()
    }

    pub fn has_nested_result_maps(&self) -> bool {
        self.has_nested_result_maps
    }

    pub fn has_nested_queries(&self) -> bool {
        self.has_nested_queries
    }

    pub fn auto_mapping(&self) -> Option<bool> {
        self.auto_mapping
    }
}

pub struct ResultMapBuilder {
    id: String,
    ty: TypeRef,
    mappings: Vec<Arc<ResultMapping>>,
    discriminator: Option<Discriminator>,
    auto_mapping: Option<bool>,
}

impl ResultMapBuilder {
    pub fn mappings(mut self, mappings: Vec<Arc<ResultMapping>>) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn discriminator(mut self, discriminator: Option<Discriminator>) -> Self {
        self.discriminator = discriminator;
        self
    }

    pub fn auto_mapping(mut self, auto_mapping: Option<bool>) -> Self {
        self.auto_mapping = auto_mapping;
        self
    }

    pub fn build(self) -> Arc<ResultMap> {
        let mut id_mappings = Vec::new();
        let mut constructor_mappings = Vec::new();
        let mut property_mappings = Vec::new();
        let mut mapped_columns = BTreeSet::new();
        let mut mapped_properties = BTreeSet::new();
        let mut has_nested_result_maps = false;
        let mut has_nested_queries = false;

        for mapping in &self.mappings {
            has_nested_queries |= mapping.nested_select_id.is_some();
            has_nested_result_maps |=
                mapping.nested_result_map_id.is_some() && mapping.result_set.is_none();
            if let Some(column) = &mapping.column {
                mapped_columns.insert(column.to_uppercase());
            }
            for composite in &mapping.composites {
                mapped_columns.insert(composite.column.to_uppercase());
            }
            if let Some(property) = &mapping.property {
                mapped_properties.insert(property.clone());
            }
            if mapping.flags.constructor {
                constructor_mappings.push(Arc::clone(mapping));
            } else {
                property_mappings.push(Arc::clone(mapping));
            }
            if mapping.flags.id {
                id_mappings.push(Arc::clone(mapping));
            }
        }
        // discriminated maps dispatch on ids too
        if id_mappings.is_empty() {
            id_mappings.clone_from(&self.mappings);
        }

        Arc::new(ResultMap {
            id: self.id,
            ty: self.ty,
            mappings: self.mappings,
            id_mappings,
            constructor_mappings,
            property_mappings,
            mapped_columns,
            mapped_properties,
            discriminator: self.discriminator,
            has_nested_result_maps,
            has_nested_queries,
            auto_mapping: self.auto_mapping,
        })
    }
}

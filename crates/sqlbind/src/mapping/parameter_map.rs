// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Parameter maps: declarative property-to-placeholder bindings.

use crate::schema::TypeRef;
use crate::types::JdbcType;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterMode {
    In,
    Out,
    InOut,
}

impl FromStr for ParameterMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "IN" => ParameterMode::In,
            "OUT" => ParameterMode::Out,
            "INOUT" => ParameterMode::InOut,
            _ => return Err(()),
        })
    }
}

/// One property bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapping {
    pub property: String,
    pub mode: ParameterMode,
    pub java_type: Option<TypeRef>,
    pub jdbc_type: Option<JdbcType>,
    pub numeric_scale: Option<u32>,
    pub type_handler: Option<String>,
    /// Result map describing an OUT cursor parameter.
    pub result_map_id: Option<String>,
}

impl ParameterMapping {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            mode: ParameterMode::In,
            java_type: None,
            jdbc_type: None,
            numeric_scale: None,
            type_handler: None,
            result_map_id: None,
        }
    }
}

/// An immutable parameter map.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMap {
    id: String,
    ty: Option<TypeRef>,
    parameter_mappings: Vec<Arc<ParameterMapping>>,
}

impl ParameterMap {
    pub fn new(
        id: impl Into<String>,
        ty: Option<TypeRef>,
        parameter_mappings: Vec<Arc<ParameterMapping>>,
    ) -> Self {
        Self {
            id: id.into(),
            ty,
            parameter_mappings,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ty(&self) -> Option<&TypeRef> {
        self.ty.as_ref()
    }

    pub fn parameter_mappings(&self) -> &[Arc<ParameterMapping>] {
        &self.parameter_mappings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("inout".parse::<ParameterMode>().unwrap(), ParameterMode::InOut);
        assert!("SIDEWAYS".parse::<ParameterMode>().is_err());
    }

    #[test]
    fn test_defaults() {
        let mapping = ParameterMapping::new("id");
        assert_eq!(mapping.mode, ParameterMode::In);
        assert!(mapping.jdbc_type.is_none());
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Deferred registrations.
//!
//! Each entry owns everything needed to retry later: result maps and
//! statements keep an owned snapshot of their XML element plus the parse
//! context their namespace had at the time. Retries re-run the original
//! registration; the drain loop keeps entries that still signal a forward
//! reference, so retries never re-queue themselves.

use super::assistant::{CacheBinding, MapperBuilderAssistant};
use super::fragment::XmlFragment;
use super::xml_mapper::XmlMapperBuilder;
use super::xml_statement::parse_statement_node;
use crate::config::{Configuration, PendingEntry};
use crate::error::{BuilderError, PendingKind};
use crate::schema::TypeRef;

pub struct PendingCacheRef {
    pub namespace: String,
    pub referenced: String,
}

impl PendingEntry for PendingCacheRef {
    fn kind(&self) -> PendingKind {
        PendingKind::CacheRef
    }

    fn reference(&self) -> String {
        format!("{} -> {}", self.namespace, self.referenced)
    }

    fn try_resolve(&self, config: &Configuration) -> Result<(), BuilderError> {
        config
            .cache(&self.referenced)
            .map(|_| ())
            .ok_or_else(|| BuilderError::incomplete(PendingKind::CacheRef, &*self.referenced))
    }
}

/// A result-map element whose own `extends`, or a nested declaration's
/// forward reference, could not yet resolve. Rebuilding re-registers any
/// nested maps that already succeeded; registration treats an equal value
/// under an existing id as a no-op.
pub struct PendingResultMap {
    pub resource: String,
    pub namespace: String,
    pub fragment: XmlFragment,
    pub id_override: Option<String>,
    pub enclosing_type: Option<TypeRef>,
}

impl PendingEntry for PendingResultMap {
    fn kind(&self) -> PendingKind {
        PendingKind::ResultMap
    }

    fn reference(&self) -> String {
        let local = self
            .id_override
            .clone()
            .or_else(|| self.fragment.attr("id").map(str::to_string))
            .unwrap_or_else(|| "?".to_string());
        format!("{}.{}", self.namespace, local)
    }

    fn try_resolve(&self, config: &Configuration) -> Result<(), BuilderError> {
        let builder = XmlMapperBuilder::new(config, self.resource.clone());
        let mut assistant = MapperBuilderAssistant::new(config, self.resource.clone());
        assistant.set_current_namespace(&self.namespace)?;
        builder
            .retry_result_map(
                &assistant,
                &self.fragment,
                self.id_override.clone(),
                self.enclosing_type.as_ref(),
            )
            .map(|_| ())
    }
}

pub struct PendingStatement {
    pub resource: String,
    pub namespace: String,
    pub cache_binding: CacheBinding,
    pub fragment: XmlFragment,
    pub required_database_id: Option<String>,
}

impl PendingEntry for PendingStatement {
    fn kind(&self) -> PendingKind {
        PendingKind::Statement
    }

    fn reference(&self) -> String {
        format!(
            "{}.{}",
            self.namespace,
            self.fragment.attr("id").unwrap_or("?")
        )
    }

    fn try_resolve(&self, config: &Configuration) -> Result<(), BuilderError> {
        let mut assistant = MapperBuilderAssistant::new(config, self.resource.clone());
        assistant.set_current_namespace(&self.namespace)?;
        match &self.cache_binding {
            CacheBinding::None => {}
            CacheBinding::Own => assistant.bind_namespace_cache()?,
            CacheBinding::Ref(target) => {
                assistant.use_cache_ref(target)?;
            }
        }
        parse_statement_node(
            config,
            &assistant,
            &self.fragment,
            self.required_database_id.as_deref(),
        )
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Two-phase configuration building.
//!
//! The root builder parses the configuration document into a
//! [`Configuration`](crate::config::Configuration); mapper builders parse
//! per-namespace documents, tolerating forward references through the
//! registry's pending queues.

mod assistant;
mod fragment;
mod pending;
mod xml_config;
mod xml_mapper;
mod xml_statement;

pub use assistant::{CacheBinding, MapperBuilderAssistant, ResultMapInput, StatementSpec};
pub use fragment::{XmlFragment, XmlNode};
pub use pending::{PendingCacheRef, PendingResultMap, PendingStatement};
pub use xml_config::XmlConfigBuilder;
pub use xml_mapper::XmlMapperBuilder;

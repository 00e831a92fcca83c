// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Execution environment: transaction manager kind plus data source.

use crate::datasource::DataSource;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Transaction management is external; only the configured kind is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionManagerKind {
    Jdbc,
    Managed,
}

impl FromStr for TransactionManagerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "JDBC" => TransactionManagerKind::Jdbc,
            "MANAGED" => TransactionManagerKind::Managed,
            _ => return Err(()),
        })
    }
}

#[derive(Clone)]
pub struct Environment {
    id: String,
    transaction_manager: TransactionManagerKind,
    data_source: Arc<dyn DataSource>,
}

impl Environment {
    pub fn new(
        id: impl Into<String>,
        transaction_manager: TransactionManagerKind,
        data_source: Arc<dyn DataSource>,
    ) -> Self {
        Self {
            id: id.into(),
            transaction_manager,
            data_source,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transaction_manager(&self) -> TransactionManagerKind {
        self.transaction_manager
    }

    pub fn data_source(&self) -> &Arc<dyn DataSource> {
        &self.data_source
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("id", &self.id)
            .field("transaction_manager", &self.transaction_manager)
            .finish_non_exhaustive()
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Connection supply.
//!
//! The driver layer is external: callers register [`Driver`]s by name, and
//! the data sources open raw connections through them. Two data sources
//! ship with the core, a pass-through unpooled one and the bounded pool.

pub mod pooled;
#[cfg(test)]
pub(crate) mod testing;
mod unpooled;

pub use pooled::{PooledConnection, PooledDataSource, PooledDataSourceFactory, PoolState};
pub use unpooled::{UnpooledDataSource, UnpooledDataSourceFactory};

use crate::error::{BuilderError, ConnectionError};
use crate::value::Properties;
use dashmap::DashMap;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl FromStr for IsolationLevel {
    type Err = ();

    /// Accepts symbolic names and the conventional numeric codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "READ_UNCOMMITTED" | "1" => IsolationLevel::ReadUncommitted,
            "READ_COMMITTED" | "2" => IsolationLevel::ReadCommitted,
            "REPEATABLE_READ" | "4" => IsolationLevel::RepeatableRead,
            "SERIALIZABLE" | "8" => IsolationLevel::Serializable,
            _ => return Err(()),
        })
    }
}

/// A live database connection as the external driver exposes it.
pub trait RawConnection: Send {
    fn is_closed(&self) -> bool;

    fn auto_commit(&self) -> bool;

    fn set_auto_commit(&mut self, on: bool) -> Result<(), ConnectionError>;

    fn set_transaction_isolation(&mut self, level: IsolationLevel) -> Result<(), ConnectionError>;

    fn commit(&mut self) -> Result<(), ConnectionError>;

    fn rollback(&mut self) -> Result<(), ConnectionError>;

    /// Runs a statement discarding results; used for liveness pings.
    fn execute(&mut self, sql: &str) -> Result<(), ConnectionError>;

    fn close(&mut self) -> Result<(), ConnectionError>;

    /// Vendor product name, consulted by database-id providers.
    fn product_name(&self) -> String;
}

/// Opens raw connections for a URL.
pub trait Driver: Send + Sync {
    fn connect(
        &self,
        url: &str,
        properties: &Properties,
    ) -> Result<Box<dyn RawConnection>, ConnectionError>;
}

/// Name-keyed driver registrations, passed explicitly where needed.
pub struct DriverRegistry {
    drivers: DashMap<String, Arc<dyn Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            drivers: DashMap::new(),
        }
    }

    pub fn register(&self, name: &str, driver: Arc<dyn Driver>) {
        self.drivers.insert(name.to_string(), driver);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Driver>, ConnectionError> {
        self.drivers
            .get(name)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| ConnectionError::UnknownDriver {
                name: name.to_string(),
            })
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A connection handed to a session: direct or pooled.
pub enum SessionConnection {
    Direct(Box<dyn RawConnection>),
    Pooled(PooledConnection),
}

impl SessionConnection {
    pub fn execute(&mut self, sql: &str) -> Result<(), ConnectionError> {
        match self {
            SessionConnection::Direct(raw) => raw.execute(sql),
            SessionConnection::Pooled(conn) => conn.execute(sql),
        }
    }

    pub fn commit(&mut self) -> Result<(), ConnectionError> {
        match self {
            SessionConnection::Direct(raw) => raw.commit(),
            SessionConnection::Pooled(conn) => conn.commit(),
        }
    }

    pub fn rollback(&mut self) -> Result<(), ConnectionError> {
        match self {
            SessionConnection::Direct(raw) => raw.rollback(),
            SessionConnection::Pooled(conn) => conn.rollback(),
        }
    }

    pub fn auto_commit(&self) -> Result<bool, ConnectionError> {
        match self {
            SessionConnection::Direct(raw) => Ok(raw.auto_commit()),
            SessionConnection::Pooled(conn) => conn.auto_commit(),
        }
    }

    pub fn set_auto_commit(&mut self, on: bool) -> Result<(), ConnectionError> {
        match self {
            SessionConnection::Direct(raw) => raw.set_auto_commit(on),
            SessionConnection::Pooled(conn) => conn.set_auto_commit(on),
        }
    }

    pub fn product_name(&self) -> Result<String, ConnectionError> {
        match self {
            SessionConnection::Direct(raw) => Ok(raw.product_name()),
            SessionConnection::Pooled(conn) => conn.product_name(),
        }
    }

    /// Closes a direct connection; returns a pooled one to its pool.
    pub fn close(self) -> Result<(), ConnectionError> {
        match self {
            SessionConnection::Direct(mut raw) => raw.close(),
            SessionConnection::Pooled(conn) => conn.close(),
        }
    }
}

/// Hands out connections.
pub trait DataSource: Send + Sync {
    fn connection(&self) -> Result<SessionConnection, ConnectionError>;
}

/// Builds a data source from declarative properties.
pub trait DataSourceFactory: Send {
    fn set_properties(
        &mut self,
        properties: &Properties,
        drivers: &DriverRegistry,
    ) -> Result<(), BuilderError>;

    fn data_source(&self) -> Result<Arc<dyn DataSource>, BuilderError>;
}

type FactoryCtor = Arc<dyn Fn() -> Box<dyn DataSourceFactory> + Send + Sync>;

/// Named data-source factories for the `<dataSource type="…">` attribute.
pub struct DataSourceProviders {
    factories: DashMap<String, FactoryCtor>,
}

impl DataSourceProviders {
    pub fn new() -> Self {
        let providers = Self {
            factories: DashMap::new(),
        };
        providers.register("UNPOOLED", Arc::new(|| {
            Box::new(UnpooledDataSourceFactory::new())
        }));
        providers.register("POOLED", Arc::new(|| {
            Box::new(PooledDataSourceFactory::new())
        }));
        providers
    }

    pub fn register(&self, name: &str, ctor: FactoryCtor) {
        self.factories.insert(name.to_uppercase(), ctor);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn DataSourceFactory>, BuilderError> {
        self.factories
            .get(&name.to_uppercase())
            .map(|e| e.value()())
            .ok_or(BuilderError::UnknownProvider {
                kind: "data source factory",
                name: name.to_string(),
            })
    }
}

impl Default for DataSourceProviders {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolation_levels_parse() {
        assert_eq!(
            "READ_COMMITTED".parse::<IsolationLevel>().unwrap(),
            IsolationLevel::ReadCommitted
        );
        assert_eq!(
            "8".parse::<IsolationLevel>().unwrap(),
            IsolationLevel::Serializable
        );
        assert!("3".parse::<IsolationLevel>().is_err());
    }

    #[test]
    fn test_unknown_driver() {
        let registry = DriverRegistry::new();
        assert!(registry.get("mem").is_err());
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Pass-through data source: one fresh raw connection per request.

use super::{
    DataSource, DataSourceFactory, Driver, DriverRegistry, IsolationLevel, RawConnection,
    SessionConnection,
};
use crate::error::{BuilderError, ConnectionError};
use crate::value::Properties;
use std::sync::Arc;

#[derive(Clone)]
pub struct UnpooledDataSource {
    driver: Arc<dyn Driver>,
    url: String,
    username: Option<String>,
    password: Option<String>,
    auto_commit: Option<bool>,
    isolation: Option<IsolationLevel>,
    driver_properties: Properties,
}

impl UnpooledDataSource {
    pub fn new(driver: Arc<dyn Driver>, url: impl Into<String>) -> Self {
        Self {
            driver,
            url: url.into(),
            username: None,
            password: None,
            auto_commit: None,
            isolation: None,
            driver_properties: Properties::new(),
        }
    }

    pub fn username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    pub fn password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    pub fn auto_commit(mut self, auto_commit: Option<bool>) -> Self {
        self.auto_commit = auto_commit;
        self
    }

    pub fn isolation(mut self, isolation: Option<IsolationLevel>) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn driver_properties(mut self, properties: Properties) -> Self {
        self.driver_properties = properties;
        self
    }

    pub fn url_str(&self) -> &str {
        &self.url
    }

    pub fn username_str(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password_str(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub(crate) fn set_url(&mut self, url: String) {
        self.url = url;
    }

    pub(crate) fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub(crate) fn set_password(&mut self, password: Option<String>) {
        self.password = password;
    }

    pub(crate) fn set_auto_commit_default(&mut self, auto_commit: Option<bool>) {
        self.auto_commit = auto_commit;
    }

    pub(crate) fn set_isolation(&mut self, isolation: Option<IsolationLevel>) {
        self.isolation = isolation;
    }

    pub(crate) fn set_driver_properties(&mut self, properties: Properties) {
        self.driver_properties = properties;
    }

    /// Opens a raw connection, applying the configured session defaults.
    pub fn open(&self) -> Result<Box<dyn RawConnection>, ConnectionError> {
        let mut props = self.driver_properties.clone();
        if let Some(user) = &self.username {
            props.insert("user".to_string(), user.clone());
        }
        if let Some(password) = &self.password {
            props.insert("password".to_string(), password.clone());
        }
        let mut raw = self.driver.connect(&self.url, &props)?;
        if let Some(auto_commit) = self.auto_commit {
            if raw.auto_commit() != auto_commit {
                raw.set_auto_commit(auto_commit)?;
            }
        }
        if let Some(level) = self.isolation {
            raw.set_transaction_isolation(level)?;
        }
        Ok(raw)
    }
}

impl DataSource for UnpooledDataSource {
    fn connection(&self) -> Result<SessionConnection, ConnectionError> {
        Ok(SessionConnection::Direct(self.open()?))
    }
}

/// Builds an [`UnpooledDataSource`] from `<dataSource>` properties.
pub struct UnpooledDataSourceFactory {
    built: Option<UnpooledDataSource>,
}

impl UnpooledDataSourceFactory {
    pub fn new() -> Self {
        Self { built: None }
    }

    pub(crate) fn parse(
        properties: &Properties,
        drivers: &DriverRegistry,
        allow_pool_keys: bool,
    ) -> Result<UnpooledDataSource, BuilderError> {
        let driver_name =
            properties
                .get("driver")
                .ok_or(BuilderError::MissingAttribute {
                    element: "dataSource",
                    attribute: "driver",
                })?;
        let url = properties.get("url").ok_or(BuilderError::MissingAttribute {
            element: "dataSource",
            attribute: "url",
        })?;
        let driver = drivers.get(driver_name)?;

        let mut source = UnpooledDataSource::new(driver, url.clone());
        let mut driver_props = Properties::new();
        for (key, value) in properties {
            match key.as_str() {
                "driver" | "url" => {}
                "username" => source.set_username(Some(value.clone())),
                "password" => source.set_password(Some(value.clone())),
                "defaultAutoCommit" => {
                    let flag: bool = value.parse().map_err(|_| BuilderError::InvalidValue {
                        key: key.clone(),
                        value: value.clone(),
                        expected: "boolean",
                    })?;
                    source.set_auto_commit_default(Some(flag));
                }
                "defaultTransactionIsolationLevel" => {
                    let level: IsolationLevel =
                        value.parse().map_err(|()| BuilderError::InvalidValue {
                            key: key.clone(),
                            value: value.clone(),
                            expected: "isolation level",
                        })?;
                    source.set_isolation(Some(level));
                }
                other if other.starts_with("driver.") => {
                    driver_props.insert(other["driver.".len()..].to_string(), value.clone());
                }
                other if allow_pool_keys && other.starts_with("pool") => {}
                other => {
                    return Err(BuilderError::UnknownSetting {
                        key: other.to_string(),
                    })
                }
            }
        }
        source.set_driver_properties(driver_props);
        Ok(source)
    }
}

impl Default for UnpooledDataSourceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSourceFactory for UnpooledDataSourceFactory {
    fn set_properties(
        &mut self,
        properties: &Properties,
        drivers: &DriverRegistry,
    ) -> Result<(), BuilderError> {
        self.built = Some(Self::parse(properties, drivers, false)?);
        Ok(())
    }

    fn data_source(&self) -> Result<Arc<dyn DataSource>, BuilderError> {
        let source = self.built.clone().ok_or(BuilderError::MissingAttribute {
            element: "dataSource",
            attribute: "driver",
        })?;
        Ok(Arc::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::testing::{MemoryDriver, SharedProbe};

    #[test]
    fn test_open_applies_defaults() {
        let probe = SharedProbe::default();
        let driver = Arc::new(MemoryDriver::new(probe.clone()));
        let source = UnpooledDataSource::new(driver, "mem:db")
            .username(Some("app".into()))
            .auto_commit(Some(false));
        let raw = source.open().unwrap();
        assert!(!raw.auto_commit());
        assert_eq!(probe.opened(), 1);
    }

    #[test]
    fn test_factory_parses_properties() {
        let drivers = DriverRegistry::new();
        drivers.register("mem", Arc::new(MemoryDriver::new(SharedProbe::default())));
        let mut props = Properties::new();
        props.insert("driver".into(), "mem".into());
        props.insert("url".into(), "mem:db".into());
        props.insert("username".into(), "app".into());
        props.insert("driver.cacheSize".into(), "64".into());
        let mut factory = UnpooledDataSourceFactory::new();
        factory.set_properties(&props, &drivers).unwrap();
        assert!(factory.data_source().is_ok());
    }

    #[test]
    fn test_factory_rejects_unknown_key() {
        let drivers = DriverRegistry::new();
        drivers.register("mem", Arc::new(MemoryDriver::new(SharedProbe::default())));
        let mut props = Properties::new();
        props.insert("driver".into(), "mem".into());
        props.insert("url".into(), "mem:db".into());
        props.insert("frobnicate".into(), "yes".into());
        let mut factory = UnpooledDataSourceFactory::new();
        assert!(factory.set_properties(&props, &drivers).is_err());
    }
}

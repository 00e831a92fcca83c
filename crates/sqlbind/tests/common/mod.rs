// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Shared test driver: an in-memory database stand-in.

use sqlbind::datasource::{Driver, IsolationLevel, RawConnection};
use sqlbind::error::ConnectionError;
use sqlbind::Properties;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct TestDriverStats {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

pub struct TestDriver {
    product: String,
    pub stats: Arc<TestDriverStats>,
}

impl TestDriver {
    pub fn new(product: &str) -> Self {
        Self {
            product: product.to_string(),
            stats: Arc::new(TestDriverStats::default()),
        }
    }
}

impl Driver for TestDriver {
    fn connect(
        &self,
        _url: &str,
        _properties: &Properties,
    ) -> Result<Box<dyn RawConnection>, ConnectionError> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TestConnection {
            product: self.product.clone(),
            stats: Arc::clone(&self.stats),
            closed: false,
            auto_commit: true,
        }))
    }
}

struct TestConnection {
    product: String,
    stats: Arc<TestDriverStats>,
    closed: bool,
    auto_commit: bool,
}

impl RawConnection for TestConnection {
    fn is_closed(&self) -> bool {
        self.closed
    }

    fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    fn set_auto_commit(&mut self, on: bool) -> Result<(), ConnectionError> {
        self.auto_commit = on;
        Ok(())
    }

    fn set_transaction_isolation(&mut self, _level: IsolationLevel) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn execute(&mut self, _sql: &str) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), ConnectionError> {
        self.closed = true;
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn product_name(&self) -> String {
        self.product.clone()
    }
}

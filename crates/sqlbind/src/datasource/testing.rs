// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! In-memory driver doubles for unit tests.

use super::{Driver, IsolationLevel, RawConnection};
use crate::error::ConnectionError;
use crate::value::Properties;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct ProbeInner {
    opened: AtomicUsize,
    closed: AtomicUsize,
    rollbacks: AtomicUsize,
    executed: AtomicUsize,
    fail_connect: AtomicBool,
    fail_execute: AtomicBool,
    report_closed: AtomicBool,
}

/// Shared counters observing driver activity across connections.
#[derive(Clone, Default)]
pub(crate) struct SharedProbe(Arc<ProbeInner>);

impl SharedProbe {
    pub(crate) fn opened(&self) -> usize {
        self.0.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn closed(&self) -> usize {
        self.0.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn rollbacks(&self) -> usize {
        self.0.rollbacks.load(Ordering::SeqCst)
    }

    pub(crate) fn executed(&self) -> usize {
        self.0.executed.load(Ordering::SeqCst)
    }

    pub(crate) fn set_fail_connect(&self, fail: bool) {
        self.0.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_fail_execute(&self, fail: bool) {
        self.0.fail_execute.store(fail, Ordering::SeqCst);
    }

    /// Makes every connection report itself closed.
    pub(crate) fn set_report_closed(&self, closed: bool) {
        self.0.report_closed.store(closed, Ordering::SeqCst);
    }
}

pub(crate) struct MemoryDriver {
    probe: SharedProbe,
}

impl MemoryDriver {
    pub(crate) fn new(probe: SharedProbe) -> Self {
        Self { probe }
    }
}

impl Driver for MemoryDriver {
    fn connect(
        &self,
        _url: &str,
        _properties: &Properties,
    ) -> Result<Box<dyn RawConnection>, ConnectionError> {
        if self.probe.0.fail_connect.load(Ordering::SeqCst) {
            return Err(ConnectionError::Driver {
                message: "connect refused by probe".to_string(),
            });
        }
        self.probe.0.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            probe: self.probe.clone(),
            closed: false,
            auto_commit: true,
        }))
    }
}

struct MemoryConnection {
    probe: SharedProbe,
    closed: bool,
    auto_commit: bool,
}

impl RawConnection for MemoryConnection {
    fn is_closed(&self) -> bool {
        self.closed || self.probe.0.report_closed.load(Ordering::SeqCst)
    }

    fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    fn set_auto_commit(&mut self, on: bool) -> Result<(), ConnectionError> {
        self.auto_commit = on;
        Ok(())
    }

    fn set_transaction_isolation(
        &mut self,
        _level: IsolationLevel,
    ) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), ConnectionError> {
        self.probe.0.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn execute(&mut self, _sql: &str) -> Result<(), ConnectionError> {
        if self.probe.0.fail_execute.load(Ordering::SeqCst) {
            return Err(ConnectionError::Driver {
                message: "execute refused by probe".to_string(),
            });
        }
        self.probe.0.executed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ConnectionError> {
        self.closed = true;
        self.probe.0.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn product_name(&self) -> String {
        "MemoryDB".to_string()
    }
}

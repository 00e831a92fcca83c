// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Pooled connection wrappers.
//!
//! A wrapper owns the raw connection only while it is valid. Returning or
//! reclaiming a connection moves the raw connection into a fresh wrapper
//! and invalidates the old one, so a lingering user reference errors
//! instead of touching a connection it no longer owns.

use super::PoolShared;
use crate::datasource::RawConnection;
use crate::error::ConnectionError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

struct Timestamps {
    last_used: Instant,
    checked_out: Instant,
}

pub(crate) struct ConnInner {
    raw: Mutex<Option<Box<dyn RawConnection>>>,
    valid: AtomicBool,
    type_code: AtomicU64,
    created_at: Instant,
    timestamps: Mutex<Timestamps>,
}

/// Cheap cloneable handle; the pool keeps its own clone while checked out.
#[derive(Clone)]
pub struct PooledConnection {
    inner: Arc<ConnInner>,
    pool: Weak<PoolShared>,
}

impl PooledConnection {
    pub(crate) fn new(
        pool: &Arc<PoolShared>,
        raw: Box<dyn RawConnection>,
        type_code: u64,
    ) -> Self {
        let now = Instant::now();
        Self::assemble(pool, raw, type_code, now, now)
    }

    /// Rewraps a raw connection, inheriting the original creation and
    /// last-used timestamps.
    pub(crate) fn adopt(
        pool: &Arc<PoolShared>,
        raw: Box<dyn RawConnection>,
        type_code: u64,
        created_at: Instant,
        last_used: Instant,
    ) -> Self {
        Self::assemble(pool, raw, type_code, created_at, last_used)
    }

    fn assemble(
        pool: &Arc<PoolShared>,
        raw: Box<dyn RawConnection>,
        type_code: u64,
        created_at: Instant,
        last_used: Instant,
    ) -> Self {
        Self {
            inner: Arc::new(ConnInner {
                raw: Mutex::new(Some(raw)),
                valid: AtomicBool::new(true),
                type_code: AtomicU64::new(type_code),
                created_at,
                timestamps: Mutex::new(Timestamps {
                    last_used,
                    checked_out: Instant::now(),
                }),
            }),
            pool: Arc::downgrade(pool),
        }
    }

    /// Same underlying wrapper, regardless of handle clones.
    pub fn same_as(&self, other: &PooledConnection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_valid_flag(&self) -> bool {
        self.inner.valid.load(Ordering::SeqCst)
    }

    /// Flag check plus raw-connection liveness.
    pub(crate) fn is_open(&self) -> bool {
        if !self.is_valid_flag() {
            return false;
        }
        self.inner
            .raw
            .lock()
            .as_ref()
            .is_some_and(|raw| !raw.is_closed())
    }

    /// Invalidates the wrapper and surrenders the raw connection.
    pub(crate) fn invalidate_take(&self) -> Option<Box<dyn RawConnection>> {
        self.inner.valid.store(false, Ordering::SeqCst);
        self.inner.raw.lock().take()
    }

    pub(crate) fn created_at(&self) -> Instant {
        self.inner.created_at
    }

    pub(crate) fn last_used(&self) -> Instant {
        self.inner.timestamps.lock().last_used
    }

    pub fn idle_elapsed(&self) -> Duration {
        self.last_used().elapsed()
    }

    pub fn checkout_elapsed(&self) -> Duration {
        self.inner.timestamps.lock().checked_out.elapsed()
    }

    pub(crate) fn mark_checked_out(&self) {
        let mut ts = self.inner.timestamps.lock();
        ts.checked_out = Instant::now();
        ts.last_used = Instant::now();
    }

    pub fn type_code(&self) -> u64 {
        self.inner.type_code.load(Ordering::SeqCst)
    }

    pub(crate) fn set_type_code(&self, code: u64) {
        self.inner.type_code.store(code, Ordering::SeqCst);
    }

    /// Runs a closure against the raw connection while it is still owned.
    pub(crate) fn with_raw<T>(
        &self,
        f: impl FnOnce(&mut Box<dyn RawConnection>) -> Result<T, ConnectionError>,
    ) -> Result<T, ConnectionError> {
        if !self.is_valid_flag() {
            return Err(ConnectionError::Invalidated);
        }
        let mut guard = self.inner.raw.lock();
        match guard.as_mut() {
            Some(raw) => f(raw),
            None => Err(ConnectionError::Invalidated),
        }
    }

    pub fn execute(&self, sql: &str) -> Result<(), ConnectionError> {
        let result = self.with_raw(|raw| raw.execute(sql));
        if result.is_ok() {
            self.inner.timestamps.lock().last_used = Instant::now();
        }
        result
    }

    pub fn commit(&self) -> Result<(), ConnectionError> {
        self.with_raw(|raw| raw.commit())
    }

    pub fn rollback(&self) -> Result<(), ConnectionError> {
        self.with_raw(|raw| raw.rollback())
    }

    pub fn auto_commit(&self) -> Result<bool, ConnectionError> {
        self.with_raw(|raw| Ok(raw.auto_commit()))
    }

    pub fn set_auto_commit(&self, on: bool) -> Result<(), ConnectionError> {
        self.with_raw(|raw| raw.set_auto_commit(on))
    }

    pub fn product_name(&self) -> Result<String, ConnectionError> {
        self.with_raw(|raw| Ok(raw.product_name()))
    }

    /// Returns the connection to its pool. Without a pool (force-closed
    /// mid-flight), the raw connection is closed outright.
    pub fn close(self) -> Result<(), ConnectionError> {
        match self.pool.upgrade() {
            Some(shared) => {
                super::push_connection(&shared, self);
                Ok(())
            }
            None => match self.invalidate_take() {
                Some(mut raw) => raw.close(),
                None => Ok(()),
            },
        }
    }
}

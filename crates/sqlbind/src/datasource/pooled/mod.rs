// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Bounded synchronous connection pool.
//!
//! One mutex serializes all pool mutations; one condition variable signals
//! returning connections. Checkout prefers idle connections, grows the pool
//! under the active cap, reclaims overdue checkouts, and otherwise waits.
//! Credential and dimension setters force-close everything so stale
//! connections are never recycled.

mod connection;
mod state;

pub use connection::PooledConnection;
pub use state::PoolState;

use super::unpooled::{UnpooledDataSource, UnpooledDataSourceFactory};
use super::{DataSource, DataSourceFactory, DriverRegistry, IsolationLevel, SessionConnection};
use crate::error::{BuilderError, ConnectionError};
use crate::value::Properties;
use parking_lot::{Condvar, Mutex, RwLock};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct PoolOptions {
    max_active: usize,
    max_idle: usize,
    max_checkout_ms: u64,
    time_to_wait_ms: u64,
    max_local_bad_tolerance: u32,
    ping_enabled: bool,
    ping_query: String,
    ping_not_used_for_ms: i64,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_active: 10,
            max_idle: 5,
            max_checkout_ms: 20_000,
            time_to_wait_ms: 20_000,
            max_local_bad_tolerance: 3,
            ping_enabled: false,
            ping_query: "NO PING QUERY SET".to_string(),
            ping_not_used_for_ms: 0,
        }
    }
}

pub(crate) struct PoolShared {
    unpooled: RwLock<UnpooledDataSource>,
    options: RwLock<PoolOptions>,
    state: Mutex<PoolState>,
    available: Condvar,
    expected_type_code: AtomicU64,
}

impl PoolShared {
    fn expected_type_code(&self) -> u64 {
        self.expected_type_code.load(Ordering::SeqCst)
    }

    fn refresh_expected_type_code(&self) {
        let unpooled = self.unpooled.read();
        let code = assemble_type_code(
            unpooled.url_str(),
            unpooled.username_str(),
            unpooled.password_str(),
        );
        self.expected_type_code.store(code, Ordering::SeqCst);
    }

    /// Liveness check. A connection is valid when its raw connection is
    /// open and, once idle past the ping threshold, the ping query runs.
    fn is_connection_valid(&self, conn: &PooledConnection, options: &PoolOptions) -> bool {
        if !conn.is_open() {
            return false;
        }
        if !options.ping_enabled || options.ping_not_used_for_ms < 0 {
            return true;
        }
        if duration_ms(conn.idle_elapsed()) <= options.ping_not_used_for_ms as u64 {
            return true;
        }
        let ping = conn.with_raw(|raw| {
            raw.execute(&options.ping_query)?;
            if !raw.auto_commit() {
                raw.rollback()?;
            }
            Ok(())
        });
        match ping {
            Ok(()) => {
                log::debug!("[pool] ping succeeded");
                true
            }
            Err(e) => {
                log::warn!("[pool] ping failed, closing connection: {}", e);
                if let Some(mut raw) = conn.invalidate_take() {
                    let _ = raw.close();
                }
                false
            }
        }
    }

}

/// Return path. Valid connections within idle capacity and with a current
/// type code are rewrapped and signalled; everything else is closed.
/// Invalid returns only count.
pub(crate) fn push_connection(shared: &Arc<PoolShared>, conn: PooledConnection) {
    let options = shared.options.read().clone();
    let mut state = shared.state.lock();
    let before = state.active_connections.len();
    state.active_connections.retain(|c| !c.same_as(&conn));
    let was_active = state.active_connections.len() < before;

    if shared.is_connection_valid(&conn, &options) {
        let checkout_ms = duration_ms(conn.checkout_elapsed());
        if was_active {
            state.accumulated_checkout_time_ms += checkout_ms;
        }
        let within_capacity = state.idle_connections.len() < options.max_idle;
        let code_matches = conn.type_code() == shared.expected_type_code();
        if within_capacity && code_matches {
            if !conn.auto_commit().unwrap_or(true) {
                let _ = conn.rollback();
            }
            let created = conn.created_at();
            let last_used = conn.last_used();
            if let Some(raw) = conn.invalidate_take() {
                let fresh = PooledConnection::adopt(
                    shared,
                    raw,
                    shared.expected_type_code(),
                    created,
                    last_used,
                );
                state.idle_connections.push(fresh);
                log::debug!("[pool] returned connection to idle set");
                shared.available.notify_one();
            }
        } else {
            if !conn.auto_commit().unwrap_or(true) {
                let _ = conn.rollback();
            }
            if let Some(mut raw) = conn.invalidate_take() {
                let _ = raw.close();
            }
            log::debug!("[pool] closed returned connection");
        }
    } else {
        log::debug!("[pool] a bad connection was returned");
        state.bad_connection_count += 1;
        if let Some(mut raw) = conn.invalidate_take() {
            let _ = raw.close();
        }
    }
}

fn assemble_type_code(url: &str, username: Option<&str>, password: Option<&str>) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    url.hash(&mut hasher);
    username.unwrap_or_default().hash(&mut hasher);
    password.unwrap_or_default().hash(&mut hasher);
    hasher.finish()
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

pub struct PooledDataSource {
    shared: Arc<PoolShared>,
}

impl PooledDataSource {
    pub fn new(unpooled: UnpooledDataSource) -> Self {
        let shared = Arc::new(PoolShared {
            unpooled: RwLock::new(unpooled),
            options: RwLock::new(PoolOptions::default()),
            state: Mutex::new(PoolState::default()),
            available: Condvar::new(),
            expected_type_code: AtomicU64::new(0),
        });
        shared.refresh_expected_type_code();
        Self { shared }
    }

    pub fn get_connection(&self) -> Result<PooledConnection, ConnectionError> {
        self.pop_connection()
    }

    fn pop_connection(&self) -> Result<PooledConnection, ConnectionError> {
        let request_start = Instant::now();
        let mut counted_wait = false;
        let mut local_bad_count: u32 = 0;

        loop {
            let options = self.shared.options.read().clone();
            let mut state = self.shared.state.lock();
            let mut candidate: Option<PooledConnection> = None;

            if !state.idle_connections.is_empty() {
                candidate = Some(state.idle_connections.remove(0));
                log::debug!("[pool] checked out an idle connection");
            } else if state.active_connections.len() < options.max_active {
                let raw = self.shared.unpooled.read().open()?;
                candidate = Some(PooledConnection::new(
                    &self.shared,
                    raw,
                    self.shared.expected_type_code(),
                ));
                log::debug!("[pool] created a new connection");
            } else {
                let oldest = state.active_connections[0].clone();
                let checkout = oldest.checkout_elapsed();
                if duration_ms(checkout) > options.max_checkout_ms {
                    state.claimed_overdue_connection_count += 1;
                    state.accumulated_checkout_time_of_overdue_ms += duration_ms(checkout);
                    state.accumulated_checkout_time_ms += duration_ms(checkout);
                    state.active_connections.remove(0);
                    let created = oldest.created_at();
                    let last_used = oldest.last_used();
                    if !oldest.auto_commit().unwrap_or(true) {
                        let _ = oldest.rollback();
                    }
                    if let Some(raw) = oldest.invalidate_take() {
                        candidate = Some(PooledConnection::adopt(
                            &self.shared,
                            raw,
                            self.shared.expected_type_code(),
                            created,
                            last_used,
                        ));
                    }
                    log::warn!("[pool] claimed an overdue connection");
                } else {
                    if !counted_wait {
                        state.had_to_wait_count += 1;
                        counted_wait = true;
                    }
                    log::debug!("[pool] waiting up to {}ms for a connection", options.time_to_wait_ms);
                    let wait_start = Instant::now();
                    let _ = self
                        .shared
                        .available
                        .wait_for(&mut state, Duration::from_millis(options.time_to_wait_ms));
                    state.accumulated_wait_time_ms += duration_ms(wait_start.elapsed());
                    continue;
                }
            }

            if let Some(conn) = candidate {
                if self.shared.is_connection_valid(&conn, &options) {
                    if !conn.auto_commit().unwrap_or(true) {
                        let _ = conn.rollback();
                    }
                    conn.set_type_code(self.shared.expected_type_code());
                    conn.mark_checked_out();
                    state.active_connections.push(conn.clone());
                    state.request_count += 1;
                    state.accumulated_request_time_ms += duration_ms(request_start.elapsed());
                    return Ok(conn);
                }
                log::debug!("[pool] discarded a bad connection");
                state.bad_connection_count += 1;
                local_bad_count += 1;
                if local_bad_count as usize
                    > options.max_idle + options.max_local_bad_tolerance as usize
                {
                    log::debug!("[pool] could not get a good connection");
                    return Err(ConnectionError::BadConnectionTolerance {
                        attempts: local_bad_count,
                    });
                }
            }
        }
    }

    pub fn push_connection(&self, conn: PooledConnection) {
        push_connection(&self.shared, conn);
    }

    /// Closes every idle and active connection and recomputes the expected
    /// type code from the current credentials.
    pub fn force_close_all(&self) {
        let mut state = self.shared.state.lock();
        while let Some(conn) = state.active_connections.pop() {
            close_quietly(&conn);
        }
        while let Some(conn) = state.idle_connections.pop() {
            close_quietly(&conn);
        }
        drop(state);
        self.shared.refresh_expected_type_code();
        log::debug!("[pool] forcefully closed all connections");
    }

    pub fn idle_count(&self) -> usize {
        self.shared.state.lock().idle_count()
    }

    pub fn active_count(&self) -> usize {
        self.shared.state.lock().active_count()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&PoolState) -> R) -> R {
        f(&self.shared.state.lock())
    }

    pub fn status(&self) -> String {
        let options = self.shared.options.read().clone();
        let state = self.shared.state.lock();
        format!(
            "{}\n  max active        {}\n  max idle          {}",
            *state, options.max_active, options.max_idle
        )
    }

    pub fn expected_type_code(&self) -> u64 {
        self.shared.expected_type_code()
    }

    // Credential and dimension setters force-close so stale connections
    // are never recycled.

    pub fn set_url(&self, url: impl Into<String>) {
        self.shared.unpooled.write().set_url(url.into());
        self.force_close_all();
    }

    pub fn set_username(&self, username: Option<String>) {
        self.shared.unpooled.write().set_username(username);
        self.force_close_all();
    }

    pub fn set_password(&self, password: Option<String>) {
        self.shared.unpooled.write().set_password(password);
        self.force_close_all();
    }

    pub fn set_default_auto_commit(&self, auto_commit: Option<bool>) {
        self.shared.unpooled.write().set_auto_commit_default(auto_commit);
        self.force_close_all();
    }

    pub fn set_default_transaction_isolation(&self, level: Option<IsolationLevel>) {
        self.shared.unpooled.write().set_isolation(level);
        self.force_close_all();
    }

    pub fn set_driver_properties(&self, properties: Properties) {
        self.shared.unpooled.write().set_driver_properties(properties);
        self.force_close_all();
    }

    pub fn set_maximum_active_connections(&self, max_active: usize) {
        self.shared.options.write().max_active = max_active.max(1);
        self.force_close_all();
    }

    pub fn set_maximum_idle_connections(&self, max_idle: usize) {
        self.shared.options.write().max_idle = max_idle;
        self.force_close_all();
    }

    pub fn set_maximum_checkout_time(&self, max_checkout: Duration) {
        self.shared.options.write().max_checkout_ms = duration_ms(max_checkout);
        self.force_close_all();
    }

    pub fn set_time_to_wait(&self, time_to_wait: Duration) {
        self.shared.options.write().time_to_wait_ms = duration_ms(time_to_wait).max(1);
        self.force_close_all();
    }

    pub fn set_maximum_local_bad_connection_tolerance(&self, tolerance: u32) {
        self.shared.options.write().max_local_bad_tolerance = tolerance;
        self.force_close_all();
    }

    pub fn set_ping_enabled(&self, enabled: bool) {
        self.shared.options.write().ping_enabled = enabled;
        self.force_close_all();
    }

    pub fn set_ping_query(&self, query: impl Into<String>) {
        self.shared.options.write().ping_query = query.into();
        self.force_close_all();
    }

    pub fn set_ping_connections_not_used_for(&self, millis: i64) {
        self.shared.options.write().ping_not_used_for_ms = millis;
        self.force_close_all();
    }
}

fn close_quietly(conn: &PooledConnection) {
    if !conn.auto_commit().unwrap_or(true) {
        let _ = conn.rollback();
    }
    if let Some(mut raw) = conn.invalidate_take() {
        let _ = raw.close();
    }
}

impl DataSource for PooledDataSource {
    fn connection(&self) -> Result<SessionConnection, ConnectionError> {
        Ok(SessionConnection::Pooled(self.get_connection()?))
    }
}

/// Builds a [`PooledDataSource`] from `<dataSource>` properties, including
/// the `pool*` dimension and ping keys.
pub struct PooledDataSourceFactory {
    built: Option<Arc<PooledDataSource>>,
}

impl PooledDataSourceFactory {
    pub fn new() -> Self {
        Self { built: None }
    }
}

impl Default for PooledDataSourceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSourceFactory for PooledDataSourceFactory {
    fn set_properties(
        &mut self,
        properties: &Properties,
        drivers: &DriverRegistry,
    ) -> Result<(), BuilderError> {
        let unpooled = UnpooledDataSourceFactory::parse(properties, drivers, true)?;
        let pool = PooledDataSource::new(unpooled);
        for (key, value) in properties {
            let invalid = |expected: &'static str| BuilderError::InvalidValue {
                key: key.clone(),
                value: value.clone(),
                expected,
            };
            match key.as_str() {
                "poolMaximumActiveConnections" => {
                    pool.set_maximum_active_connections(
                        value.parse().map_err(|_| invalid("positive integer"))?,
                    );
                }
                "poolMaximumIdleConnections" => {
                    pool.set_maximum_idle_connections(
                        value.parse().map_err(|_| invalid("integer"))?,
                    );
                }
                "poolMaximumCheckoutTime" => {
                    pool.set_maximum_checkout_time(Duration::from_millis(
                        value.parse().map_err(|_| invalid("milliseconds"))?,
                    ));
                }
                "poolTimeToWait" => {
                    pool.set_time_to_wait(Duration::from_millis(
                        value.parse().map_err(|_| invalid("milliseconds"))?,
                    ));
                }
                "poolMaximumLocalBadConnectionTolerance" => {
                    pool.set_maximum_local_bad_connection_tolerance(
                        value.parse().map_err(|_| invalid("integer"))?,
                    );
                }
                "poolPingEnabled" => {
                    pool.set_ping_enabled(value.parse().map_err(|_| invalid("boolean"))?);
                }
                "poolPingQuery" => pool.set_ping_query(value.clone()),
                "poolPingConnectionsNotUsedFor" => {
                    pool.set_ping_connections_not_used_for(
                        value.parse().map_err(|_| invalid("milliseconds"))?,
                    );
                }
                _ => {}
            }
        }
        self.built = Some(Arc::new(pool));
        Ok(())
    }

    fn data_source(&self) -> Result<Arc<dyn DataSource>, BuilderError> {
        self.built
            .as_ref()
            .map(|pool| Arc::clone(pool) as Arc<dyn DataSource>)
            .ok_or(BuilderError::MissingAttribute {
                element: "dataSource",
                attribute: "driver",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::testing::{MemoryDriver, SharedProbe};
    use std::thread;

    fn pool_with_probe() -> (PooledDataSource, SharedProbe) {
        let probe = SharedProbe::default();
        let driver = Arc::new(MemoryDriver::new(probe.clone()));
        let unpooled = UnpooledDataSource::new(driver, "mem:pool").username(Some("app".into()));
        (PooledDataSource::new(unpooled), probe)
    }

    #[test]
    fn test_checkout_and_return_recycles() {
        let (pool, probe) = pool_with_probe();
        let conn = pool.get_connection().unwrap();
        assert_eq!(pool.active_count(), 1);
        conn.close().unwrap();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.idle_count(), 1);

        // second checkout reuses the idle raw connection
        let _conn = pool.get_connection().unwrap();
        assert_eq!(probe.opened(), 1);
    }

    #[test]
    fn test_returned_wrapper_is_invalidated() {
        let (pool, _probe) = pool_with_probe();
        let conn = pool.get_connection().unwrap();
        let stale = conn.clone();
        conn.close().unwrap();
        assert!(matches!(
            stale.execute("select 1"),
            Err(ConnectionError::Invalidated)
        ));
    }

    #[test]
    fn test_idle_overflow_closes_raw() {
        let (pool, probe) = pool_with_probe();
        pool.set_maximum_idle_connections(1);
        let a = pool.get_connection().unwrap();
        let b = pool.get_connection().unwrap();
        a.close().unwrap();
        b.close().unwrap();
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(probe.closed(), 1);
    }

    #[test]
    fn test_overdue_checkout_reclaimed() {
        let (pool, probe) = pool_with_probe();
        pool.set_maximum_active_connections(1);
        pool.set_maximum_checkout_time(Duration::from_millis(50));
        pool.set_time_to_wait(Duration::from_millis(20));

        let holder = pool.get_connection().unwrap();
        thread::sleep(Duration::from_millis(60));

        // second requester reclaims the overdue raw connection
        let reclaimed = pool.get_connection().unwrap();
        assert!(reclaimed.execute("select 1").is_ok());
        assert!(matches!(
            holder.execute("select 1"),
            Err(ConnectionError::Invalidated)
        ));
        assert_eq!(probe.opened(), 1);
        assert_eq!(
            pool.with_state(|s| s.claimed_overdue_connection_count),
            1
        );
    }

    #[test]
    fn test_waiter_wakes_on_return() {
        let (pool, _probe) = pool_with_probe();
        pool.set_maximum_active_connections(1);
        pool.set_maximum_checkout_time(Duration::from_secs(60));
        pool.set_time_to_wait(Duration::from_secs(5));
        let pool = Arc::new(pool);

        let conn = pool.get_connection().unwrap();
        let shared = Arc::clone(&pool);
        let waiter = thread::spawn(move || {
            let start = Instant::now();
            let conn = shared.get_connection().unwrap();
            conn.close().unwrap();
            start.elapsed()
        });
        thread::sleep(Duration::from_millis(40));
        conn.close().unwrap();
        let waited = waiter.join().unwrap();
        assert!(waited < Duration::from_secs(5));
        assert_eq!(pool.with_state(|s| s.had_to_wait_count), 1);
    }

    #[test]
    fn test_pool_conservation_under_concurrency() {
        let (pool, _probe) = pool_with_probe();
        pool.set_maximum_active_connections(4);
        pool.set_maximum_idle_connections(2);
        pool.set_maximum_checkout_time(Duration::from_secs(60));
        let pool = Arc::new(pool);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let shared = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for _ in 0..25 {
                    let conn = shared.get_connection().unwrap();
                    if fastrand::bool() {
                        thread::sleep(Duration::from_millis(1));
                    }
                    conn.close().unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(pool.active_count(), 0);
        assert!(pool.idle_count() <= 2);
        assert_eq!(pool.with_state(|s| s.request_count), 200);
    }

    #[test]
    fn test_ping_discards_dead_connection() {
        let (pool, probe) = pool_with_probe();
        pool.set_ping_enabled(true);
        pool.set_ping_query("select 1");
        pool.set_ping_connections_not_used_for(0);

        let conn = pool.get_connection().unwrap();
        conn.close().unwrap();
        assert_eq!(pool.idle_count(), 1);

        thread::sleep(Duration::from_millis(5));
        probe.set_fail_execute(true);
        // idle candidate fails its ping and a fresh connection is opened
        let conn = pool.get_connection().unwrap();
        probe.set_fail_execute(false);
        assert!(conn.is_valid_flag());
        assert_eq!(probe.opened(), 2);
        assert_eq!(pool.with_state(|s| s.bad_connection_count), 1);
    }

    #[test]
    fn test_bad_connection_tolerance_exhausted() {
        let (pool, probe) = pool_with_probe();
        pool.set_maximum_idle_connections(0);
        pool.set_maximum_local_bad_connection_tolerance(1);
        // every connection reports closed: each candidate counts as bad
        probe.set_report_closed(true);
        let result = pool.get_connection();
        assert!(matches!(
            result,
            Err(ConnectionError::BadConnectionTolerance { .. })
        ));
        assert_eq!(pool.with_state(|s| s.bad_connection_count), 2);
    }

    #[test]
    fn test_stale_type_code_return_is_closed() {
        let (pool, probe) = pool_with_probe();
        let conn = pool.get_connection().unwrap();
        // simulate a wrapper from an older credential generation
        conn.set_type_code(pool.expected_type_code() ^ 1);
        conn.close().unwrap();
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(probe.closed(), 1);
    }

    #[test]
    fn test_credential_change_force_closes() {
        let (pool, probe) = pool_with_probe();
        let conn = pool.get_connection().unwrap();
        let code_before = pool.expected_type_code();
        conn.close().unwrap();
        assert_eq!(pool.idle_count(), 1);

        pool.set_password(Some("changed".into()));
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(probe.closed(), 1);
        assert_ne!(pool.expected_type_code(), code_before);
    }

    #[test]
    fn test_return_after_force_close_counts_bad() {
        let (pool, probe) = pool_with_probe();
        let conn = pool.get_connection().unwrap();
        // credential change while checked out invalidates the wrapper
        pool.set_password(Some("rotated".into()));
        conn.close().unwrap();
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(probe.closed(), 1);
        assert_eq!(pool.with_state(|s| s.bad_connection_count), 1);
    }
}

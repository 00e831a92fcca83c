// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Pooled data source integration tests.

mod common;

use common::TestDriver;
use sqlbind::datasource::{PooledDataSource, UnpooledDataSource};
use sqlbind::error::ConnectionError;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn pool() -> (PooledDataSource, Arc<common::TestDriverStats>) {
    let driver = TestDriver::new("TestDB");
    let stats = Arc::clone(&driver.stats);
    let unpooled = UnpooledDataSource::new(Arc::new(driver), "test:pool")
        .username(Some("app".to_string()));
    (PooledDataSource::new(unpooled), stats)
}

#[test]
fn test_overdue_checkout_reclaimed() {
    let (pool, stats) = pool();
    pool.set_maximum_active_connections(1);
    pool.set_maximum_checkout_time(Duration::from_millis(50));
    pool.set_time_to_wait(Duration::from_millis(20));

    // thread A checks out and sits on the connection
    let holder = pool.get_connection().unwrap();
    thread::sleep(Duration::from_millis(60));

    // thread B reclaims the overdue raw connection without opening a new one
    let reclaimed = pool.get_connection().unwrap();
    assert!(reclaimed.execute("select 1").is_ok());
    assert_eq!(stats.opened.load(Ordering::SeqCst), 1);

    // A's wrapper was invalidated; any further use errors
    assert!(matches!(
        holder.execute("select 1"),
        Err(ConnectionError::Invalidated)
    ));
    assert_eq!(pool.with_state(|s| s.claimed_overdue_connection_count), 1);
}

#[test]
fn test_pool_conservation_invariants() {
    let (pool, _stats) = pool();
    let max_active = 4;
    let max_idle = 2;
    pool.set_maximum_active_connections(max_active);
    pool.set_maximum_idle_connections(max_idle);
    pool.set_maximum_checkout_time(Duration::from_secs(60));
    let pool = Arc::new(pool);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let shared = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                let conn = shared.get_connection().unwrap();
                let active = shared.active_count();
                let idle = shared.idle_count();
                assert!(active + idle <= max_active, "{}+{} over cap", active, idle);
                assert!(idle <= max_idle, "idle {} over cap", idle);
                if fastrand::u8(..4) == 0 {
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
    assert!(pool.idle_count() <= max_idle);
    assert_eq!(pool.with_state(|s| s.request_count), 400);
}

#[test]
fn test_liveness_under_full_contention() {
    // n == maxActive concurrent callers that always return: every checkout
    // completes without error
    let (pool, _stats) = pool();
    pool.set_maximum_active_connections(3);
    pool.set_maximum_checkout_time(Duration::from_secs(60));
    pool.set_time_to_wait(Duration::from_secs(5));
    let pool = Arc::new(pool);

    let mut handles = Vec::new();
    for _ in 0..3 {
        let shared = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                let conn = shared
                    .get_connection()
                    .expect("checkout must not fail under n <= maxActive");
                conn.execute("select 1").unwrap();
                conn.close().unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(pool.with_state(|s| s.bad_connection_count), 0);
}

#[test]
fn test_waiters_make_progress() {
    let (pool, _stats) = pool();
    pool.set_maximum_active_connections(1);
    pool.set_maximum_checkout_time(Duration::from_secs(60));
    pool.set_time_to_wait(Duration::from_secs(10));
    let pool = Arc::new(pool);

    let first = pool.get_connection().unwrap();
    let shared = Arc::clone(&pool);
    let start = Instant::now();
    let waiter = thread::spawn(move || {
        let conn = shared.get_connection().unwrap();
        conn.close().unwrap();
    });
    thread::sleep(Duration::from_millis(30));
    first.close().unwrap();
    waiter.join().unwrap();
    // woken by the return, far below the 10s wait ceiling
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(pool.with_state(|s| s.had_to_wait_count), 1);
}

#[test]
fn test_status_dump_counts() {
    let (pool, _stats) = pool();
    let conn = pool.get_connection().unwrap();
    conn.close().unwrap();
    let status = pool.status();
    assert!(status.contains("requests"), "status: {}", status);
    assert!(status.contains("max active"), "status: {}", status);
}

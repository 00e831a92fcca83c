// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Pool bookkeeping, guarded by the pool's single mutex.

use super::connection::PooledConnection;
use std::fmt;

/// Counters and the idle/active partitions.
#[derive(Default)]
pub struct PoolState {
    pub(crate) idle_connections: Vec<PooledConnection>,
    pub(crate) active_connections: Vec<PooledConnection>,
    pub request_count: u64,
    pub accumulated_request_time_ms: u64,
    pub accumulated_checkout_time_ms: u64,
    pub claimed_overdue_connection_count: u64,
    pub accumulated_checkout_time_of_overdue_ms: u64,
    pub accumulated_wait_time_ms: u64,
    pub had_to_wait_count: u64,
    pub bad_connection_count: u64,
}

impl PoolState {
    pub fn idle_count(&self) -> usize {
        self.idle_connections.len()
    }

    pub fn active_count(&self) -> usize {
        self.active_connections.len()
    }

    pub fn average_request_time_ms(&self) -> u64 {
        if self.request_count == 0 {
            0
        } else {
            self.accumulated_request_time_ms / self.request_count
        }
    }

    pub fn average_wait_time_ms(&self) -> u64 {
        if self.had_to_wait_count == 0 {
            0
        } else {
            self.accumulated_wait_time_ms / self.had_to_wait_count
        }
    }

    pub fn average_checkout_time_ms(&self) -> u64 {
        if self.request_count == 0 {
            0
        } else {
            self.accumulated_checkout_time_ms / self.request_count
        }
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pool status:")?;
        writeln!(f, "  active            {}", self.active_count())?;
        writeln!(f, "  idle              {}", self.idle_count())?;
        writeln!(f, "  requests          {}", self.request_count)?;
        writeln!(f, "  avg request ms    {}", self.average_request_time_ms())?;
        writeln!(f, "  had to wait       {}", self.had_to_wait_count)?;
        writeln!(f, "  avg wait ms       {}", self.average_wait_time_ms())?;
        writeln!(f, "  bad connections   {}", self.bad_connection_count)?;
        writeln!(
            f,
            "  claimed overdue   {}",
            self.claimed_overdue_connection_count
        )?;
        write!(f, "  avg checkout ms   {}", self.average_checkout_time_ms())
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Cache decorators, layered by [`CacheBuilder`](crate::cache::CacheBuilder).

mod blocking;
mod fifo;
mod logging;
mod lru;
mod scheduled;
mod serialized;
mod synchronized;

pub use blocking::BlockingCache;
pub use fifo::FifoCache;
pub use logging::LoggingCache;
pub use lru::LruCache;
pub use scheduled::ScheduledCache;
pub use serialized::SerializedCache;
pub use synchronized::SynchronizedCache;

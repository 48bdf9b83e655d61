//! Queue transports for Habit records.
//!
//! [`RedisQueue`] is the production transport: one Redis list per queue name,
//! `LPUSH` to submit and `LPOP` to drain, which makes every queue
//! last-in-first-out. [`MemoryQueue`] has the same semantics inside the
//! process and backs tests and local runs without a Redis server.

mod memory;
mod redis_queue;

pub mod error;

pub use error::{Error, Result};
pub use memory::MemoryQueue;
pub use redis_queue::RedisQueue;

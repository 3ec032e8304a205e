//! Async helpers shared across the notemover crates.
//!
//! Currently this is just the [`TaskPool`]: a bounded-concurrency scheduler
//! that admits submitted tasks in FIFO order and never lets more than a fixed
//! number of them be in flight at once. It knows nothing about files or rules;
//! anything that needs to fan out many independent async operations without
//! hammering a shared resource can use it.

pub mod error;
mod pool;

pub use crate::pool::{IDLE_POLL_INTERVAL, TaskHandle, TaskPool};

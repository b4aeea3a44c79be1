//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: purges expired entries from an in-process cache at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;

//! Background Tasks Module
//!
//! # Tasks
//! - Token cache purge: drops expired entries at a configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;

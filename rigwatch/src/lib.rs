//! Health watcher for a single mining rig.
//!
//! Polls the pool's statistics endpoint on a fixed interval, classifies
//! the rig's condition and sends SMS alerts when the condition changes
//! or stays bad for too long.

pub mod api_client;
pub mod config;
pub mod error;
pub mod health;
pub mod monitor;
pub mod notify;
pub mod tracing;
pub mod types;

//! Library interface for the depgraph CLI
//!
//! This module exposes the command implementations for integration testing
//! while keeping argument parsing and logging setup in main.rs.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod build;
pub mod inspect;

// Re-export commonly needed types for tests
pub use anyhow::Result;
pub use depgraph_core::config::Config;
pub use std::path::Path;

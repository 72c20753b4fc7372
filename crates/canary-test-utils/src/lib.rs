//! Shared test utilities for the canary component
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection and unique test resource names
//! - [`db`]: In-memory SQLite pools for state store tests

pub mod aws;
pub mod db;

// Re-export commonly used items
pub use aws::{get_test_region, test_canary_name};
pub use db::open_test_db;

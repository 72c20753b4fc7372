//! SQLite store for the recorded state of each component instance
//!
//! One row per instance name holding the JSON-serialized
//! [`canary_common::RecordedState`].

mod crud;
mod db;

pub use crud::{clear_state, load_state, save_state};
pub use db::{DbPool, open_db, setup_schema};

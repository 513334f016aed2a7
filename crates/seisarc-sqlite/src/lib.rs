//! SQLite-backed database driver
//!
//! Implements the [`seisarc_core::DbDriver`] contract on top of `rusqlite`.
//!
//! Key features:
//! - Single-cursor query protocol with buffered result sets
//! - WAL mode and pragma configuration
//! - Framework DDL for the `Object` / `PublicObject` / `Meta` tables

pub mod config;
pub mod driver;
pub mod schema;

pub use config::{SqliteConfig, SynchronousMode};
pub use driver::SqliteDriver;

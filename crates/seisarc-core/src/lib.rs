//! Seisarc Core: traits and types for the seisarc persistence subsystem
//!
//! This crate defines the abstractions shared by the archive engine and the
//! database backends:
//! - Database driver trait: connection, transactions, single-cursor queries
//! - Attribute maps: ordered column/value collections for SQL generation
//! - Serialization hints: per-attribute flags steering the archive protocol
//! - Schema version: parse and gate the database's declared schema version
//!
//! Backends (e.g. the SQLite driver) depend on this crate only; the archive
//! engine builds on the `DbDriver` trait without knowing the vendor.

pub mod attributes;
pub mod driver;
pub mod error;
pub mod hints;
pub mod types;
pub mod version;

pub use attributes::AttributeMap;
pub use driver::DbDriver;
pub use error::{Result, SeisarcError};
pub use hints::Hints;
pub use types::{Oid, TimeValue, INVALID_OID};
pub use version::SchemaVersion;

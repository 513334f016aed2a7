//! Framework DDL and schema metadata
//!
//! Only the tables every seisarc database carries are defined here: the
//! universal `Object` row root, the `PublicObject` id table and the `Meta`
//! key/value table. Domain-class tables mirror their class's attribute list
//! and are maintained by the deployment, not generated by this crate.

use rusqlite::Connection;

use seisarc_core::error::{Result, SeisarcError};
use seisarc_core::SchemaVersion;

/// DDL for the framework tables.
pub const FRAMEWORK_DDL: &str = "
CREATE TABLE IF NOT EXISTS Object (
    _oid INTEGER PRIMARY KEY,
    _timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS PublicObject (
    _oid INTEGER NOT NULL,
    publicID VARCHAR(255) NOT NULL,
    PRIMARY KEY (_oid),
    UNIQUE (publicID)
);

CREATE TABLE IF NOT EXISTS Meta (
    name VARCHAR(80) NOT NULL,
    value VARCHAR(255),
    PRIMARY KEY (name)
);
";

/// Create the framework tables if they do not exist.
pub fn create_framework_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(FRAMEWORK_DDL)
        .map_err(|e| SeisarcError::Driver(e.to_string()))
}

/// Record the schema version served by this database.
pub fn write_schema_version(conn: &Connection, version: SchemaVersion) -> Result<()> {
    conn.execute(
        "INSERT INTO Meta(name, value) VALUES('Schema-Version', ?1)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        [version.to_string()],
    )
    .map_err(|e| SeisarcError::Driver(e.to_string()))?;
    Ok(())
}

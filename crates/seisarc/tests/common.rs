//! Shared helpers for the archive integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use seisarc::prelude::*;
use seisarc::datamodel;
use seisarc_core::{Oid, TimeValue};
use seisarc_sqlite::{SqliteConfig, SqliteDriver};

/// Table definitions for the bundled datamodel classes.
pub const DATAMODEL_DDL: &str = "
CREATE TABLE EventParameters (
    _oid INTEGER PRIMARY KEY,
    _parent_oid INTEGER,
    _last_modified TIMESTAMP
);

CREATE TABLE Pick (
    _oid INTEGER PRIMARY KEY,
    _parent_oid INTEGER,
    _last_modified TIMESTAMP,
    time TIMESTAMP NOT NULL,
    time_ms INTEGER NOT NULL,
    waveformID_networkCode VARCHAR(8) NOT NULL,
    waveformID_stationCode VARCHAR(8) NOT NULL,
    waveformID_locationCode VARCHAR(8),
    waveformID_channelCode VARCHAR(8),
    filterID VARCHAR(255),
    methodID VARCHAR(255),
    creationInfo_used INTEGER NOT NULL DEFAULT 0,
    creationInfo_agencyID VARCHAR(64),
    creationInfo_author VARCHAR(128),
    creationInfo_creationTime TIMESTAMP,
    creationInfo_creationTime_ms INTEGER
);

CREATE TABLE Origin (
    _oid INTEGER PRIMARY KEY,
    _parent_oid INTEGER,
    _last_modified TIMESTAMP,
    time_value TIMESTAMP NOT NULL,
    time_value_ms INTEGER NOT NULL,
    time_uncertainty DOUBLE,
    latitude_value DOUBLE NOT NULL,
    latitude_uncertainty DOUBLE,
    longitude_value DOUBLE NOT NULL,
    longitude_uncertainty DOUBLE,
    depth_used INTEGER NOT NULL DEFAULT 0,
    depth_value DOUBLE,
    depth_uncertainty DOUBLE,
    creationInfo_used INTEGER NOT NULL DEFAULT 0,
    creationInfo_agencyID VARCHAR(64),
    creationInfo_author VARCHAR(128),
    creationInfo_creationTime TIMESTAMP,
    creationInfo_creationTime_ms INTEGER
);

CREATE TABLE Event (
    _oid INTEGER PRIMARY KEY,
    _parent_oid INTEGER,
    _last_modified TIMESTAMP,
    preferredOriginID VARCHAR(255),
    type VARCHAR(64),
    creationInfo_used INTEGER NOT NULL DEFAULT 0,
    creationInfo_agencyID VARCHAR(64),
    creationInfo_author VARCHAR(128),
    creationInfo_creationTime TIMESTAMP,
    creationInfo_creationTime_ms INTEGER
);

CREATE TABLE Comment (
    _oid INTEGER PRIMARY KEY,
    _parent_oid INTEGER,
    _last_modified TIMESTAMP,
    text TEXT NOT NULL,
    id VARCHAR(255),
    creationInfo_used INTEGER NOT NULL DEFAULT 0,
    creationInfo_agencyID VARCHAR(64),
    creationInfo_author VARCHAR(128),
    creationInfo_creationTime TIMESTAMP,
    creationInfo_creationTime_ms INTEGER
);
";

/// Connect an in-memory database, install the framework and datamodel
/// schema, and declare schema version 0.12.0.
pub fn connected_driver() -> SqliteDriver {
    let mut driver = SqliteDriver::new(SqliteConfig::default());
    driver.connect(":memory:").unwrap();
    driver
        .execute(seisarc_sqlite::schema::FRAMEWORK_DDL)
        .unwrap();
    driver.execute(DATAMODEL_DDL).unwrap();
    driver
        .execute("insert into Meta(name, value) values('Schema-Version', '0.12.0')")
        .unwrap();
    driver
}

/// A ready-to-use archive over a fresh in-memory database.
pub fn setup() -> DatabaseArchive {
    datamodel::register_all();
    DatabaseArchive::new(Box::new(connected_driver())).unwrap()
}

/// First column of the first result row, as text.
pub fn query_one(archive: &DatabaseArchive, sql: &str) -> Option<String> {
    archive
        .with_driver(|db| {
            db.begin_query(sql).unwrap();
            let value = if db.fetch_row() {
                db.row_field(0)
                    .map(|field| String::from_utf8_lossy(field).into_owned())
            } else {
                None
            };
            db.end_query();
            value
        })
        .unwrap()
}

pub fn query_count(archive: &DatabaseArchive, sql: &str) -> i64 {
    query_one(archive, sql)
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Driver wrapper counting transaction calls, for batching assertions.
pub struct CountingDriver {
    inner: SqliteDriver,
    pub starts: Arc<AtomicUsize>,
    pub commits: Arc<AtomicUsize>,
    pub rollbacks: Arc<AtomicUsize>,
}

impl CountingDriver {
    pub fn new(inner: SqliteDriver) -> Self {
        Self {
            inner,
            starts: Arc::new(AtomicUsize::new(0)),
            commits: Arc::new(AtomicUsize::new(0)),
            rollbacks: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (
            self.starts.clone(),
            self.commits.clone(),
            self.rollbacks.clone(),
        )
    }
}

impl DbDriver for CountingDriver {
    fn connect(&mut self, dsn: &str) -> seisarc::Result<()> {
        self.inner.connect(dsn)
    }

    fn disconnect(&mut self) {
        self.inner.disconnect()
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn start(&mut self) -> seisarc::Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.inner.start()
    }

    fn commit(&mut self) -> seisarc::Result<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit()
    }

    fn rollback(&mut self) -> seisarc::Result<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.rollback()
    }

    fn execute(&mut self, sql: &str) -> seisarc::Result<()> {
        self.inner.execute(sql)
    }

    fn begin_query(&mut self, sql: &str) -> seisarc::Result<()> {
        self.inner.begin_query(sql)
    }

    fn fetch_row(&mut self) -> bool {
        self.inner.fetch_row()
    }

    fn end_query(&mut self) {
        self.inner.end_query()
    }

    fn find_column(&self, name: &str) -> Option<usize> {
        self.inner.find_column(name)
    }

    fn row_field(&self, index: usize) -> Option<&[u8]> {
        self.inner.row_field(index)
    }

    fn row_field_count(&self) -> usize {
        self.inner.row_field_count()
    }

    fn escape(&self, input: &str) -> String {
        self.inner.escape(input)
    }

    fn time_to_string(&self, time: &TimeValue) -> String {
        self.inner.time_to_string(time)
    }

    fn string_to_time(&self, text: &str) -> Option<TimeValue> {
        self.inner.string_to_time(text)
    }

    fn convert_column_name(&self, name: &str) -> String {
        self.inner.convert_column_name(name)
    }

    fn default_value(&self) -> &str {
        self.inner.default_value()
    }

    fn last_insert_id(&mut self, table: &str) -> seisarc::Result<Oid> {
        self.inner.last_insert_id(table)
    }
}

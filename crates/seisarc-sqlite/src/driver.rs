use chrono::NaiveDateTime;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::warn;

use seisarc_core::error::{Result, SeisarcError};
use seisarc_core::types::{Oid, TimeValue};
use seisarc_core::DbDriver;

use crate::config::{SqliteConfig, SynchronousMode};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Buffered result set of the single active cursor.
///
/// Rows are materialized at `begin_query` time with every field rendered to
/// bytes, which keeps field slices valid until the next cursor motion and
/// keeps the driver object-safe.
struct Cursor {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Vec<u8>>>>,
    /// Row index; `None` before the first `fetch_row`.
    position: Option<usize>,
}

impl Cursor {
    fn current(&self) -> Option<&Vec<Option<Vec<u8>>>> {
        self.rows.get(self.position?)
    }
}

/// SQLite implementation of the [`DbDriver`] contract.
pub struct SqliteDriver {
    conn: Option<Connection>,
    cursor: Option<Cursor>,
    config: SqliteConfig,
}

impl SqliteDriver {
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            conn: None,
            cursor: None,
            config,
        }
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| SeisarcError::Connection("not connected".into()))
    }

    fn configure_connection(conn: &Connection, cfg: &SqliteConfig, in_memory: bool) -> Result<()> {
        if cfg.wal_mode && !in_memory {
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| SeisarcError::Connection(e.to_string()))?;
        }

        let sync_mode = match cfg.synchronous {
            SynchronousMode::Full => "FULL",
            SynchronousMode::Normal => "NORMAL",
            SynchronousMode::Off => "OFF",
        };
        conn.pragma_update(None, "synchronous", sync_mode)
            .map_err(|e| SeisarcError::Connection(e.to_string()))?;

        conn.pragma_update(None, "cache_size", cfg.cache_size)
            .map_err(|e| SeisarcError::Connection(e.to_string()))?;

        Ok(())
    }

    fn render_field(value: ValueRef<'_>) -> Option<Vec<u8>> {
        match value {
            ValueRef::Null => None,
            ValueRef::Integer(i) => Some(i.to_string().into_bytes()),
            ValueRef::Real(f) => Some(f.to_string().into_bytes()),
            ValueRef::Text(t) => Some(t.to_vec()),
            ValueRef::Blob(b) => Some(b.to_vec()),
        }
    }
}

impl DbDriver for SqliteDriver {
    fn connect(&mut self, dsn: &str) -> Result<()> {
        if self.conn.is_some() {
            return Err(SeisarcError::Connection("already connected".into()));
        }

        let conn = Connection::open_with_flags(
            dsn,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| SeisarcError::Connection(e.to_string()))?;

        let in_memory = dsn == ":memory:" || dsn.starts_with("file::memory:");
        Self::configure_connection(&conn, &self.config, in_memory)?;

        self.conn = Some(conn);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.cursor = None;
        self.conn = None;
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn start(&mut self) -> Result<()> {
        self.conn()?
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| SeisarcError::Driver(e.to_string()))
    }

    fn commit(&mut self) -> Result<()> {
        self.conn()?
            .execute_batch("COMMIT")
            .map_err(|e| SeisarcError::Driver(e.to_string()))
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn()?
            .execute_batch("ROLLBACK")
            .map_err(|e| SeisarcError::Driver(e.to_string()))
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn()?
            .execute_batch(sql)
            .map_err(|e| SeisarcError::Driver(e.to_string()))
    }

    fn begin_query(&mut self, sql: &str) -> Result<()> {
        if self.cursor.is_some() {
            return Err(SeisarcError::Query(
                "a query is already active on this connection".into(),
            ));
        }

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SeisarcError::Query(e.to_string()))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut result = stmt
            .query([])
            .map_err(|e| SeisarcError::Query(e.to_string()))?;
        while let Some(row) = result
            .next()
            .map_err(|e| SeisarcError::Query(e.to_string()))?
        {
            let mut fields = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = row
                    .get_ref(i)
                    .map_err(|e| SeisarcError::Query(e.to_string()))?;
                fields.push(Self::render_field(value));
            }
            rows.push(fields);
        }
        drop(result);
        drop(stmt);

        self.cursor = Some(Cursor {
            columns,
            rows,
            position: None,
        });
        Ok(())
    }

    fn fetch_row(&mut self) -> bool {
        match self.cursor.as_mut() {
            Some(cursor) => {
                let next = cursor.position.map_or(0, |p| p + 1);
                cursor.position = Some(next);
                next < cursor.rows.len()
            }
            None => false,
        }
    }

    fn end_query(&mut self) {
        self.cursor = None;
    }

    fn find_column(&self, name: &str) -> Option<usize> {
        self.cursor
            .as_ref()?
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    fn row_field(&self, index: usize) -> Option<&[u8]> {
        self.cursor
            .as_ref()?
            .current()?
            .get(index)?
            .as_deref()
    }

    fn row_field_count(&self) -> usize {
        self.cursor
            .as_ref()
            .map_or(0, |cursor| cursor.columns.len())
    }

    fn escape(&self, input: &str) -> String {
        input.replace('\'', "''")
    }

    fn time_to_string(&self, time: &TimeValue) -> String {
        time.format(TIME_FORMAT).to_string()
    }

    fn string_to_time(&self, text: &str) -> Option<TimeValue> {
        let text = text.trim();
        for format in [
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
        ] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Some(naive.and_utc());
            }
        }
        warn!("could not parse timestamp '{}'", text);
        None
    }

    fn convert_column_name(&self, name: &str) -> String {
        name.to_string()
    }

    fn default_value(&self) -> &str {
        // Inserting NULL into an INTEGER PRIMARY KEY assigns a fresh rowid.
        "NULL"
    }

    fn last_insert_id(&mut self, _table: &str) -> Result<Oid> {
        Ok(self.conn()?.last_insert_rowid() as Oid)
    }
}

use crate::error::Result;
use crate::types::{Oid, TimeValue};

/// Abstract database facade the archive engine is written against.
///
/// A driver owns one connection and at most one in-flight cursor. All
/// failures surface as `Err`; the driver never panics on bad SQL or a lost
/// connection.
///
/// # Cursor protocol
///
/// ```text
/// begin_query(sql)           -> starts the single cursor
/// fetch_row()                -> true while rows remain
/// find_column / row_field    -> valid only while a fetched row is current
/// end_query()                -> releases the cursor
/// ```
///
/// `begin_query` while a cursor is active is an error: concurrent reads on
/// the same connection are not supported and must fail fast. Row fields
/// remain valid until the next cursor motion (`fetch_row`, `end_query`).
pub trait DbDriver: Send {
    /// Connect to the given data source. Connecting while already connected
    /// is an error; the previous connection stays up.
    fn connect(&mut self, dsn: &str) -> Result<()>;

    /// Drop the connection. Disconnecting while not connected is a no-op.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Begin a transaction. Nesting is the call site's responsibility; the
    /// driver need not support savepoints.
    fn start(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;

    /// Execute a non-cursor statement. Affected row counts are not reported.
    fn execute(&mut self, sql: &str) -> Result<()>;

    fn begin_query(&mut self, sql: &str) -> Result<()>;

    /// Advance the cursor. Returns `false` when the result set is exhausted;
    /// after that no row-field operation is valid until the next query.
    fn fetch_row(&mut self) -> bool;

    fn end_query(&mut self);

    /// Column index of `name` in the current result set.
    fn find_column(&self, name: &str) -> Option<usize>;

    /// Field bytes of the current row; `None` represents SQL NULL.
    fn row_field(&self, index: usize) -> Option<&[u8]>;

    fn row_field_count(&self) -> usize;

    /// Escape `input` so it is safe to embed between single quotes. The
    /// caller adds the surrounding quotes.
    fn escape(&self, input: &str) -> String;

    /// Render a timestamp the way this backend stores it. Round-trips with
    /// [`DbDriver::string_to_time`] at the backend's supported resolution.
    fn time_to_string(&self, time: &TimeValue) -> String;

    fn string_to_time(&self, text: &str) -> Option<TimeValue>;

    /// Column name conversion for case-insensitive backends. Identity for
    /// most drivers.
    fn convert_column_name(&self, name: &str) -> String;

    /// SQL token that produces a fresh identity value when inserted into the
    /// primary key column (`DEFAULT`, `NULL`, or a sequence expression).
    fn default_value(&self) -> &str;

    /// Oid of the most recent insert into `table`.
    fn last_insert_id(&mut self, table: &str) -> Result<Oid>;
}

//! Pull-based seismic record reader
//!
//! Reads typed records one at a time from files or stdin:
//! - Codec selection by file extension, via a process-wide codec factory
//! - Per-stream or global time-window filtering (inclusive start,
//!   exclusive end; per-stream windows override the global one)
//! - Cooperative close: `close()` sets a flag the next `next_record`
//!   observes

pub mod codec;
pub mod error;
pub mod file;
pub mod record;

pub use codec::{BinaryCodec, JsonCodec, RecordCodec};
pub use error::{RecordError, Result};
pub use file::FileSource;
pub use record::Record;

use chrono::{DateTime, Utc};

/// Database row identifier assigned by the backend.
pub type Oid = u64;

/// Sentinel for "no row": oid 0 is never assigned by a backend.
pub const INVALID_OID: Oid = 0;

/// Timestamp type used throughout the archive.
///
/// Column storage renders whole seconds; sub-second precision travels in a
/// companion microseconds column when the `SPLIT_TIME` hint is set.
pub type TimeValue = DateTime<Utc>;

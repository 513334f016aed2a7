use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::SeisarcError;

/// Schema version declared by the database (`Meta` table) or compiled into
/// the client.
///
/// Ordering compares `(major, minor)` only; the patch tag is carried for
/// display.
#[derive(Debug, Clone, Copy, Default, Eq)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    /// Newest schema version this client can serve.
    pub const SUPPORTED: SchemaVersion = SchemaVersion::new(0, 12, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor).cmp(&(other.major, other.minor))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = SeisarcError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || SeisarcError::Schema(format!("invalid schema version '{}'", text));

        let mut parts = text.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let patch = match parts.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(SchemaVersion::new(major, minor, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_and_three_part() {
        let v: SchemaVersion = "0.12".parse().unwrap();
        assert_eq!((v.major, v.minor, v.patch), (0, 12, 0));

        let v: SchemaVersion = "1.4.2".parse().unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 4, 2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<SchemaVersion>().is_err());
        assert!("12".parse::<SchemaVersion>().is_err());
        assert!("a.b".parse::<SchemaVersion>().is_err());
        assert!("1.2.3.4".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_ordering_ignores_patch() {
        let a = SchemaVersion::new(0, 12, 0);
        let b = SchemaVersion::new(0, 12, 9);
        assert_eq!(a, b);
        assert!(SchemaVersion::new(0, 13, 0) > SchemaVersion::SUPPORTED);
        assert!(SchemaVersion::new(1, 0, 0) > SchemaVersion::new(0, 99, 0));
    }
}

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Per-attribute serialization flags.
///
/// Hints are scoped to a single attribute declaration: the serializer
/// installs the given set for the duration of the call and restores the
/// previous value afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Hints(u32);

impl Hints {
    pub const NONE: Hints = Hints(0);

    /// Do not recurse into owned child objects (the archive default; child
    /// rows are emitted by the tree visitor, not by `serialize`).
    pub const IGNORE_CHILDS: Hints = Hints(1 << 0);

    /// The attribute is a statically known struct: flatten its fields under
    /// a pushed name prefix instead of resolving a class row.
    pub const STATIC_TYPE: Hints = Hints(1 << 1);

    /// The attribute is stored in its own sub-table; the parent row keeps a
    /// `name_oid` backlink to the emitted child row.
    pub const DB_TABLE: Hints = Hints(1 << 2);

    /// Store the timestamp as a (seconds, microseconds) pair using a
    /// `name_ms` companion column.
    pub const SPLIT_TIME: Hints = Hints(1 << 3);

    /// The attribute participates in the logical index used by updates and
    /// content-based oid lookup.
    pub const INDEX_ATTRIBUTE: Hints = Hints(1 << 4);

    pub fn contains(self, other: Hints) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Hints {
    type Output = Hints;

    fn bitor(self, rhs: Hints) -> Hints {
        Hints(self.0 | rhs.0)
    }
}

impl BitOrAssign for Hints {
    fn bitor_assign(&mut self, rhs: Hints) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Hints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        for (flag, name) in [
            (Hints::IGNORE_CHILDS, "IGNORE_CHILDS"),
            (Hints::STATIC_TYPE, "STATIC_TYPE"),
            (Hints::DB_TABLE, "DB_TABLE"),
            (Hints::SPLIT_TIME, "SPLIT_TIME"),
            (Hints::INDEX_ATTRIBUTE, "INDEX_ATTRIBUTE"),
        ] {
            if self.contains(flag) {
                names.push(name);
            }
        }
        write!(f, "Hints({})", names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_composition() {
        let h = Hints::STATIC_TYPE | Hints::SPLIT_TIME;
        assert!(h.contains(Hints::STATIC_TYPE));
        assert!(h.contains(Hints::SPLIT_TIME));
        assert!(!h.contains(Hints::DB_TABLE));
        assert!(h.contains(Hints::NONE));
        assert!(Hints::NONE.is_empty());
    }

    #[test]
    fn test_hint_debug() {
        let h = Hints::DB_TABLE | Hints::INDEX_ATTRIBUTE;
        assert_eq!(format!("{:?}", h), "Hints(DB_TABLE|INDEX_ATTRIBUTE)");
    }
}

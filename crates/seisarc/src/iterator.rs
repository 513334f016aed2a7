//! Database iterator
//!
//! A restartable, lazy, cursor-backed sequence of typed objects. The
//! iterator shares the archive's driver slot: closing the archive empties
//! the slot and every outstanding iterator terminates on its next advance.
//! Rows that fail hydration are skipped with a warning.

use tracing::warn;

use seisarc_core::{Oid, INVALID_OID};

use crate::archive::{hydrate_current_row, parse_oid, SharedDriver};
use crate::cache::IdentityCache;
use crate::object::ArchiveObject;
use crate::registry::ClassInfo;

pub struct DatabaseIterator {
    shared: Option<SharedDriver>,
    cache: IdentityCache,
    class: &'static ClassInfo,
    produced: usize,
    pending: Option<Box<dyn ArchiveObject>>,
    last_oid: Oid,
    last_parent_oid: Oid,
}

impl DatabaseIterator {
    /// An iterator over an empty or failed result set.
    pub(crate) fn closed(class: &'static ClassInfo) -> Self {
        Self {
            shared: None,
            cache: IdentityCache::new(),
            class,
            produced: 0,
            pending: None,
            last_oid: INVALID_OID,
            last_parent_oid: INVALID_OID,
        }
    }

    /// Take over a cursor positioned on its first row.
    pub(crate) fn open(shared: SharedDriver, cache: IdentityCache, class: &'static ClassInfo) -> Self {
        let mut iterator = Self {
            shared: Some(shared),
            cache,
            class,
            produced: 0,
            pending: None,
            last_oid: INVALID_OID,
            last_parent_oid: INVALID_OID,
        };
        iterator.pending = iterator.hydrate_current();
        if iterator.pending.is_none() {
            iterator.pending = iterator.advance();
        }
        iterator
    }

    /// Whether the iterator still holds a cursor.
    pub fn valid(&self) -> bool {
        self.shared.is_some()
    }

    /// Objects produced so far.
    pub fn fetched(&self) -> usize {
        self.produced
    }

    /// Row id of the most recently hydrated object.
    pub fn oid(&self) -> Oid {
        self.last_oid
    }

    /// Parent row id of the most recently hydrated object.
    pub fn parent_oid(&self) -> Oid {
        self.last_parent_oid
    }

    /// Release the cursor; further `next` calls return `None`.
    pub fn close(&mut self) {
        if let Some(shared) = self.shared.take() {
            let mut guard = shared.lock();
            if let Some(db) = guard.as_deref_mut() {
                db.end_query();
            }
        }
        self.pending = None;
    }

    /// Hydrate the cursor's current row, or `None` when it cannot be
    /// decoded or the archive has been closed.
    fn hydrate_current(&mut self) -> Option<Box<dyn ArchiveObject>> {
        let shared = self.shared.as_ref()?;
        let mut guard = shared.lock();
        let db = guard.as_deref_mut()?;

        self.last_oid = db
            .find_column("_oid")
            .and_then(|index| db.row_field(index))
            .and_then(parse_oid)
            .unwrap_or(INVALID_OID);
        self.last_parent_oid = db
            .find_column("_parent_oid")
            .and_then(|index| db.row_field(index))
            .and_then(parse_oid)
            .unwrap_or(INVALID_OID);

        let last_modified = db.find_column("_last_modified").and_then(|index| {
            let field = db.row_field(index)?;
            let text = std::str::from_utf8(field).ok()?;
            db.string_to_time(text)
        });

        let mut object = self.class.create();
        object.core_mut().set_last_modified(last_modified);

        if hydrate_current_row(db, &self.cache, object.as_mut()) {
            Some(object)
        } else {
            warn!(
                "error while reading object of type '{}': ignoring it",
                self.class.name
            );
            None
        }
    }

    /// Move to the next decodable row.
    fn advance(&mut self) -> Option<Box<dyn ArchiveObject>> {
        loop {
            let has_row = {
                let shared = self.shared.as_ref()?;
                let mut guard = shared.lock();
                match guard.as_deref_mut() {
                    Some(db) => db.fetch_row(),
                    None => false,
                }
            };
            if !has_row {
                return None;
            }
            if let Some(object) = self.hydrate_current() {
                return Some(object);
            }
        }
    }
}

impl Iterator for DatabaseIterator {
    type Item = Box<dyn ArchiveObject>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.shared.is_none() {
            return None;
        }

        let item = self.pending.take().or_else(|| self.advance());
        match item {
            Some(object) => {
                self.produced += 1;
                Some(object)
            }
            None => {
                self.close();
                None
            }
        }
    }
}

impl Drop for DatabaseIterator {
    fn drop(&mut self) {
        self.close();
    }
}

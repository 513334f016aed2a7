//! Bulk object writer
//!
//! Visits an object tree and adds every node to (or removes it from) the
//! archive, batching the writes into transactions. Adds walk top-down so
//! parents exist before their children; removes walk bottom-up.

use tracing::error;

use crate::archive::DatabaseArchive;
use crate::object::{walk, ArchiveObject, TraversalMode, Visitor};

pub struct DatabaseObjectWriter<'a> {
    archive: &'a mut DatabaseArchive,
    add_objects: bool,
    batch_size: usize,
    parent_id: String,
    count: usize,
    errors: usize,
}

impl<'a> DatabaseObjectWriter<'a> {
    /// `add_objects` selects between writing and removing; `batch_size ≤ 1`
    /// wraps every node in its own transaction.
    pub fn new(archive: &'a mut DatabaseArchive, add_objects: bool, batch_size: usize) -> Self {
        Self {
            archive,
            add_objects,
            batch_size,
            parent_id: String::new(),
            count: 0,
            errors: 0,
        }
    }

    /// Walk `object`'s tree and persist (or remove) every node. Returns
    /// `true` when every node succeeded; failed nodes are counted in
    /// [`DatabaseObjectWriter::errors`] and do not abort the walk.
    pub fn run(&mut self, object: &mut dyn ArchiveObject) -> bool {
        self.run_with_parent(object, "")
    }

    /// Like [`DatabaseObjectWriter::run`], resolving the root node's parent
    /// by publicID.
    pub fn run_with_parent(&mut self, object: &mut dyn ArchiveObject, parent_id: &str) -> bool {
        self.parent_id = parent_id.to_string();
        self.count = 0;
        self.errors = 0;

        if self.batch_size > 1 {
            let _ = self.archive.start();
        }
        walk(object, self);
        if self.batch_size > 1 {
            let _ = self.archive.commit();
        }

        self.errors == 0
    }

    /// Nodes visited so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Nodes that failed.
    pub fn errors(&self) -> usize {
        self.errors
    }

    fn write(&mut self, object: &mut dyn ArchiveObject) -> bool {
        self.count += 1;

        if self.batch_size <= 1 {
            let _ = self.archive.start();
        }

        let result = if self.add_objects {
            self.archive.write(object, &self.parent_id)
        } else {
            self.archive.remove(object, &self.parent_id)
        };

        if let Err(e) = result {
            error!(
                "bulk {} of '{}' failed: {}",
                if self.add_objects { "write" } else { "remove" },
                object.class().name,
                e
            );
            self.errors += 1;
            if self.batch_size <= 1 {
                let _ = self.archive.rollback();
            }
            return false;
        }

        if self.batch_size <= 1 {
            let _ = self.archive.commit();
        } else if self.count % self.batch_size == 0 {
            let _ = self.archive.commit();
            let _ = self.archive.start();
        }

        self.parent_id.clear();
        true
    }
}

impl Visitor for DatabaseObjectWriter<'_> {
    fn mode(&self) -> TraversalMode {
        if self.add_objects {
            TraversalMode::TopDown
        } else {
            TraversalMode::BottomUp
        }
    }

    fn visit(&mut self, object: &mut dyn ArchiveObject) -> bool {
        self.write(object)
    }
}

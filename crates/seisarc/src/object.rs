//! Object model
//!
//! Every persisted entity embeds an [`ObjectCore`]: a process-unique
//! [`Identity`] handle, the optional archive modification timestamp, and a
//! non-owning link to its in-memory parent. Identity handles replace raw
//! addresses as cache keys; dropping a handle evicts its entry from every
//! live identity cache, so a recycled allocation can never alias a cached
//! row id.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};

use seisarc_core::error::Result;
use seisarc_core::TimeValue;

use crate::registry::ClassInfo;
use crate::serializer::RowSerializer;

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Process-unique, non-clonable object identity.
#[derive(Debug)]
pub struct Identity(u64);

impl Identity {
    pub fn new() -> Self {
        Self(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Identity {
    fn drop(&mut self) {
        crate::cache::evict_from_all(self.0);
    }
}

/// Non-owning reference to an object's in-memory parent.
///
/// Carries the parent's identity (for the cache fast path) and its publicID
/// (the database fallback when no oid is cached yet).
#[derive(Debug, Clone)]
pub struct ParentLink {
    pub identity: u64,
    pub public_id: String,
}

impl ParentLink {
    /// Link to `parent`. Returns `None` when the parent carries no publicID
    /// and therefore cannot be resolved in the database.
    pub fn to(parent: &dyn ArchiveObject) -> Option<Self> {
        parent.public_id().map(|public_id| Self {
            identity: parent.core().identity_id(),
            public_id: public_id.to_string(),
        })
    }
}

/// State embedded in every archive-managed object.
#[derive(Debug, Default)]
pub struct ObjectCore {
    identity: Identity,
    last_modified: Option<TimeValue>,
    parent: Option<ParentLink>,
}

impl ObjectCore {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn identity_id(&self) -> u64 {
        self.identity.0
    }

    pub fn last_modified(&self) -> Option<TimeValue> {
        self.last_modified
    }

    pub fn set_last_modified(&mut self, time: Option<TimeValue>) {
        self.last_modified = time;
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    pub fn set_parent(&mut self, parent: Option<ParentLink>) {
        self.parent = parent;
    }
}

/// A persistable domain object.
///
/// `serialize` advertises the object's attributes to the archive in a fixed,
/// schema-aligned order; the same sequence drives both the reader and the
/// writer role. Owned child objects are not part of `serialize`; the tree
/// visitor emits their rows.
pub trait ArchiveObject: Any {
    fn core(&self) -> &ObjectCore;

    fn core_mut(&mut self) -> &mut ObjectCore;

    fn class(&self) -> &'static ClassInfo;

    /// The globally unique public identifier, for `PublicObject` subtypes.
    fn public_id(&self) -> Option<&str> {
        None
    }

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()>;

    /// Invoke `f` on each directly owned child, in declaration order.
    fn for_each_child(&mut self, _f: &mut dyn FnMut(&mut dyn ArchiveObject)) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Statically typed access to a class descriptor.
pub trait DomainClass: ArchiveObject + Default {
    fn class_info() -> &'static ClassInfo;
}

/// Traversal order of [`walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    TopDown,
    BottomUp,
}

/// Callback invoked per node by [`walk`].
pub trait Visitor {
    fn mode(&self) -> TraversalMode {
        TraversalMode::TopDown
    }

    /// Visit one node. In top-down mode a `false` return prunes the node's
    /// children; in bottom-up mode the return value is ignored.
    fn visit(&mut self, object: &mut dyn ArchiveObject) -> bool;
}

/// Depth-first traversal of an object tree.
pub fn walk(object: &mut dyn ArchiveObject, visitor: &mut dyn Visitor) {
    match visitor.mode() {
        TraversalMode::TopDown => {
            if visitor.visit(object) {
                object.for_each_child(&mut |child| walk(child, visitor));
            }
        }
        TraversalMode::BottomUp => {
            object.for_each_child(&mut |child| walk(child, visitor));
            visitor.visit(object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identities_are_unique() {
        let a = Identity::new();
        let b = Identity::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_parent_link_requires_public_id() {
        use crate::datamodel::{Comment, Pick};

        let pick = Pick::default();
        assert!(ParentLink::to(&pick).is_some());

        let comment = Comment::default();
        assert!(ParentLink::to(&comment).is_none());
    }

    #[test]
    fn test_walk_orders() {
        use crate::datamodel::{Comment, EventParameters, Pick};

        let mut ep = EventParameters::with_public_id("ep/1");
        let mut pick = Pick::with_public_id("pick/1");
        pick.add_comment(Comment::new("c1", "first"));
        pick.add_comment(Comment::new("c2", "second"));
        ep.add_pick(pick);

        struct Collect {
            mode: TraversalMode,
            names: Vec<String>,
        }

        impl Visitor for Collect {
            fn mode(&self) -> TraversalMode {
                self.mode
            }

            fn visit(&mut self, object: &mut dyn ArchiveObject) -> bool {
                self.names.push(object.class().name.to_string());
                true
            }
        }

        let mut collect = Collect {
            mode: TraversalMode::TopDown,
            names: Vec::new(),
        };
        walk(&mut ep, &mut collect);
        assert_eq!(
            collect.names,
            ["EventParameters", "Pick", "Comment", "Comment"]
        );

        let mut collect = Collect {
            mode: TraversalMode::BottomUp,
            names: Vec::new(),
        };
        walk(&mut ep, &mut collect);
        assert_eq!(
            collect.names,
            ["Comment", "Comment", "Pick", "EventParameters"]
        );
    }
}

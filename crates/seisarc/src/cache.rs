//! Identity cache
//!
//! Maps object identity to the database row id the object was last stored
//! under. The cache has reference semantics: clones share state, so the
//! archive and its iterators observe the same mapping. Eviction on object
//! destruction arrives through [`crate::object::Identity`]'s `Drop` impl,
//! which may fire on any thread; every live cache registers itself in a
//! process-wide list for that purpose.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use seisarc_core::Oid;

static LIVE_CACHES: Lazy<Mutex<Vec<Weak<CacheShared>>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Evict `identity` from every live cache. Called from `Identity::drop`.
pub(crate) fn evict_from_all(identity: u64) {
    let caches = LIVE_CACHES.lock();
    for weak in caches.iter() {
        if let Some(cache) = weak.upgrade() {
            cache.map.lock().remove(&identity);
        }
    }
}

#[derive(Default)]
struct CacheShared {
    map: Mutex<HashMap<u64, Oid>>,
}

/// Concurrency-safe identity → oid mapping with reference semantics.
#[derive(Clone)]
pub struct IdentityCache {
    shared: Arc<CacheShared>,
}

impl IdentityCache {
    pub fn new() -> Self {
        let shared = Arc::new(CacheShared::default());

        let mut caches = LIVE_CACHES.lock();
        caches.retain(|weak| weak.strong_count() > 0);
        caches.push(Arc::downgrade(&shared));

        Self { shared }
    }

    pub fn register(&self, identity: u64, oid: Oid) {
        self.shared.map.lock().insert(identity, oid);
    }

    pub fn cached_id(&self, identity: u64) -> Option<Oid> {
        self.shared.map.lock().get(&identity).copied()
    }

    pub fn remove(&self, identity: u64) {
        self.shared.map.lock().remove(&identity);
    }

    pub fn len(&self) -> usize {
        self.shared.map.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.map.lock().is_empty()
    }

    pub fn clear(&self) {
        self.shared.map.lock().clear();
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new()
    }
}

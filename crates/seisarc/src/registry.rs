//! Class factory and runtime type registry
//!
//! Concrete domain classes are described by a static [`ClassInfo`] carrying
//! the class name (which is also the table name), the `PublicObject` and
//! root-class flags, and a constructor. A process-wide registry maps class
//! names to descriptors for by-name creation, replacing virtual-factory
//! RTTI with plain discriminators.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::object::ArchiveObject;

/// Static descriptor of a concrete domain class.
#[derive(Debug)]
pub struct ClassInfo {
    /// Class name; doubles as the database table name.
    pub name: &'static str,
    /// Whether the class is a `PublicObject` subtype.
    pub public: bool,
    /// Whether rows of this class may be stored without a parent.
    pub root: bool,
    pub ctor: fn() -> Box<dyn ArchiveObject>,
}

impl ClassInfo {
    pub fn create(&self) -> Box<dyn ArchiveObject> {
        (self.ctor)()
    }
}

static REGISTRY: Lazy<RwLock<HashMap<&'static str, &'static ClassInfo>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a class descriptor. Re-registering the same name replaces the
/// previous entry.
pub fn register(info: &'static ClassInfo) {
    REGISTRY.write().insert(info.name, info);
}

/// Look up a class descriptor by name.
pub fn get(name: &str) -> Option<&'static ClassInfo> {
    REGISTRY.read().get(name).copied()
}

/// Construct a fresh instance of the named class.
pub fn create(name: &str) -> Option<Box<dyn ArchiveObject>> {
    get(name).map(|info| info.create())
}

/// Whether the named class is a `PublicObject` subtype.
pub fn is_public(name: &str) -> bool {
    get(name).is_some_and(|info| info.public)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel;

    #[test]
    fn test_lookup_and_create() {
        datamodel::register_all();

        let info = get("Pick").expect("Pick registered");
        assert!(info.public);
        assert!(!info.root);

        let object = create("Pick").expect("constructible");
        assert_eq!(object.class().name, "Pick");

        assert!(get("NoSuchClass").is_none());
        assert!(!is_public("NoSuchClass"));
        assert!(is_public("EventParameters"));
        assert!(!is_public("Comment"));
    }
}

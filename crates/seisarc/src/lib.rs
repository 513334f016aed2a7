//! Seisarc: object-relational persistence core for seismological data models
//!
//! Seisarc maps an in-memory graph of typed domain objects (rooted at an
//! abstract object base, with `PublicObject` subtypes carrying a globally
//! unique public identifier) onto a relational database whose schema
//! mirrors the class hierarchy.
//!
//! Key pieces:
//! - [`archive::DatabaseArchive`]: serializes object trees into
//!   `INSERT`/`UPDATE`/`DELETE` statements and hydrates rows back into
//!   objects through the class factory
//! - [`iterator::DatabaseIterator`]: lazy cursor-backed sequence of typed
//!   objects
//! - [`writer::DatabaseObjectWriter`]: visitor-driven bulk writes with
//!   transaction batching
//! - [`cache::IdentityCache`]: process-safe object → row-id mapping,
//!   invalidated on object destruction
//! - [`datamodel`]: a bundled seismological class hierarchy
//!
//! The database vendor is abstracted behind [`seisarc_core::DbDriver`]; see
//! the `seisarc-sqlite` crate for the SQLite backend.
//!
//! # Example
//!
//! ```no_run
//! use seisarc::prelude::*;
//! use seisarc::datamodel::{self, EventParameters, Pick};
//!
//! # fn main() -> seisarc::Result<()> {
//! datamodel::register_all();
//!
//! # let driver: Box<dyn seisarc::DbDriver> = unimplemented!();
//! let mut archive = DatabaseArchive::new(driver)?;
//!
//! let mut parameters = EventParameters::with_public_id("ep/2024");
//! archive.write(&mut parameters, "")?;
//!
//! let mut pick = Pick::with_public_id("pick/2024/01");
//! archive.write(&mut pick, "ep/2024")?;
//!
//! let stored = archive.get_object::<Pick>("pick/2024/01")?;
//! # let _ = stored;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod cache;
pub mod datamodel;
pub mod iterator;
pub mod object;
pub mod registry;
pub mod serializer;
pub mod writer;

pub use archive::{DatabaseArchive, Parent};
pub use cache::IdentityCache;
pub use iterator::DatabaseIterator;
pub use object::{
    walk, ArchiveObject, DomainClass, Identity, ObjectCore, ParentLink, TraversalMode, Visitor,
};
pub use registry::ClassInfo;
pub use serializer::{ArchiveValue, NestedAttribute, RowSerializer};
pub use writer::DatabaseObjectWriter;

pub use seisarc_core::error::{Result, SeisarcError};
pub use seisarc_core::{AttributeMap, DbDriver, Hints, Oid, SchemaVersion, TimeValue, INVALID_OID};

/// Convenience imports for archive users.
pub mod prelude {
    pub use crate::archive::{DatabaseArchive, Parent};
    pub use crate::object::{ArchiveObject, DomainClass, ParentLink};
    pub use crate::writer::DatabaseObjectWriter;
    pub use seisarc_core::error::{Result, SeisarcError};
    pub use seisarc_core::{DbDriver, Hints, Oid, INVALID_OID};
}

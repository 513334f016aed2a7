//! Bundled seismological data model
//!
//! A compact class hierarchy covering every attribute kind the archive
//! supports: split timestamps, nested and nullable nested structs, optional
//! scalars, and content-indexed non-public children.
//!
//! ```text
//! EventParameters (public, root)
//! ├── Pick (public)
//! │   └── Comment
//! ├── Origin (public)
//! └── Event (public)
//!     └── Comment
//! ```

use crate::object::DomainClass;
use crate::registry;

mod comment;
mod event;
mod origin;
mod pick;
mod types;

pub use comment::Comment;
pub use event::{Event, EventParameters};
pub use origin::Origin;
pub use pick::Pick;
pub use types::{CreationInfo, RealQuantity, TimeQuantity, WaveformStreamId};

/// Register every bundled class with the process-wide class factory.
pub fn register_all() {
    registry::register(EventParameters::class_info());
    registry::register(Event::class_info());
    registry::register(Origin::class_info());
    registry::register(Pick::class_info());
    registry::register(Comment::class_info());
}

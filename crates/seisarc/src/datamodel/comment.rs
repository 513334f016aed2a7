use std::any::Any;

use seisarc_core::error::Result;
use seisarc_core::Hints;

use crate::object::{ArchiveObject, DomainClass, ObjectCore};
use crate::registry::ClassInfo;
use crate::serializer::RowSerializer;

use super::CreationInfo;

/// A free-text annotation attached to a parent object.
///
/// Comments carry no publicID; among their siblings they are identified by
/// content through the `id` index attribute.
#[derive(Debug, Default)]
pub struct Comment {
    core: ObjectCore,
    pub text: String,
    pub id: String,
    pub creation_info: Option<CreationInfo>,
}

static CLASS: ClassInfo = ClassInfo {
    name: "Comment",
    public: false,
    root: false,
    ctor: new_boxed,
};

fn new_boxed() -> Box<dyn ArchiveObject> {
    Box::<Comment>::default()
}

impl Comment {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Default::default()
        }
    }
}

impl DomainClass for Comment {
    fn class_info() -> &'static ClassInfo {
        &CLASS
    }
}

impl ArchiveObject for Comment {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn class(&self) -> &'static ClassInfo {
        &CLASS
    }

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()> {
        ser.value("text", &mut self.text, Hints::NONE)?;
        ser.value("id", &mut self.id, Hints::INDEX_ATTRIBUTE)?;
        ser.optional_nested("creationInfo", &mut self.creation_info, Hints::NONE)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

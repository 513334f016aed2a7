use std::any::Any;

use seisarc_core::error::Result;
use seisarc_core::Hints;

use crate::object::{ArchiveObject, DomainClass, ObjectCore};
use crate::registry::ClassInfo;
use crate::serializer::RowSerializer;

use super::{CreationInfo, RealQuantity, TimeQuantity};

/// A hypocenter estimate: origin time and location with uncertainties.
#[derive(Debug, Default)]
pub struct Origin {
    core: ObjectCore,
    pub public_id: String,
    pub time: TimeQuantity,
    pub latitude: RealQuantity,
    pub longitude: RealQuantity,
    pub depth: Option<RealQuantity>,
    pub creation_info: Option<CreationInfo>,
}

static CLASS: ClassInfo = ClassInfo {
    name: "Origin",
    public: true,
    root: false,
    ctor: new_boxed,
};

fn new_boxed() -> Box<dyn ArchiveObject> {
    Box::<Origin>::default()
}

impl Origin {
    pub fn with_public_id(public_id: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            ..Default::default()
        }
    }
}

impl DomainClass for Origin {
    fn class_info() -> &'static ClassInfo {
        &CLASS
    }
}

impl ArchiveObject for Origin {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn class(&self) -> &'static ClassInfo {
        &CLASS
    }

    fn public_id(&self) -> Option<&str> {
        Some(&self.public_id)
    }

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()> {
        ser.value("publicID", &mut self.public_id, Hints::NONE)?;
        ser.nested("time", &mut self.time, Hints::NONE)?;
        ser.nested("latitude", &mut self.latitude, Hints::NONE)?;
        ser.nested("longitude", &mut self.longitude, Hints::NONE)?;
        ser.optional_nested("depth", &mut self.depth, Hints::NONE)?;
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

use std::any::Any;

use seisarc_core::error::Result;
use seisarc_core::{Hints, TimeValue};

use crate::object::{ArchiveObject, DomainClass, ObjectCore, ParentLink};
use crate::registry::ClassInfo;
use crate::serializer::RowSerializer;

use super::{Comment, CreationInfo, WaveformStreamId};

/// An onset of a seismic signal on one waveform stream.
#[derive(Debug)]
pub struct Pick {
    core: ObjectCore,
    pub public_id: String,
    pub time: TimeValue,
    pub waveform_id: WaveformStreamId,
    pub filter_id: Option<String>,
    pub method_id: Option<String>,
    pub creation_info: Option<CreationInfo>,
    comments: Vec<Comment>,
}

static CLASS: ClassInfo = ClassInfo {
    name: "Pick",
    public: true,
    root: false,
    ctor: new_boxed,
};

fn new_boxed() -> Box<dyn ArchiveObject> {
    Box::<Pick>::default()
}

impl Default for Pick {
    fn default() -> Self {
        Self {
            core: ObjectCore::default(),
            public_id: String::new(),
            time: TimeValue::UNIX_EPOCH,
            waveform_id: WaveformStreamId::default(),
            filter_id: None,
            method_id: None,
            creation_info: None,
            comments: Vec::new(),
        }
    }
}

impl Pick {
    pub fn with_public_id(public_id: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            ..Default::default()
        }
    }

    pub fn add_comment(&mut self, mut comment: Comment) {
        comment.core_mut().set_parent(ParentLink::to(self));
        self.comments.push(comment);
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

impl DomainClass for Pick {
    fn class_info() -> &'static ClassInfo {
        &CLASS
    }
}

impl ArchiveObject for Pick {
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
        ser.value("time", &mut self.time, Hints::SPLIT_TIME)?;
        ser.nested("waveformID", &mut self.waveform_id, Hints::NONE)?;
        ser.optional("filterID", &mut self.filter_id, Hints::NONE)?;
        ser.optional("methodID", &mut self.method_id, Hints::NONE)?;
        ser.optional_nested("creationInfo", &mut self.creation_info, Hints::NONE)?;
        Ok(())
    }

    fn for_each_child(&mut self, f: &mut dyn FnMut(&mut dyn ArchiveObject)) {
        for comment in &mut self.comments {
            f(comment);
        }
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

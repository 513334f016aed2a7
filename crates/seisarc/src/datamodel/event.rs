use std::any::Any;

use seisarc_core::error::Result;
use seisarc_core::Hints;

use crate::object::{ArchiveObject, DomainClass, ObjectCore, ParentLink};
use crate::registry::ClassInfo;
use crate::serializer::RowSerializer;

use super::{Comment, CreationInfo, Origin, Pick};

/// A seismic event, grouping origins under a preferred solution.
#[derive(Debug, Default)]
pub struct Event {
    core: ObjectCore,
    pub public_id: String,
    pub preferred_origin_id: Option<String>,
    pub event_type: Option<String>,
    pub creation_info: Option<CreationInfo>,
    comments: Vec<Comment>,
}

static EVENT_CLASS: ClassInfo = ClassInfo {
    name: "Event",
    public: true,
    root: false,
    ctor: event_boxed,
};

fn event_boxed() -> Box<dyn ArchiveObject> {
    Box::<Event>::default()
}

impl Event {
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

impl DomainClass for Event {
    fn class_info() -> &'static ClassInfo {
        &EVENT_CLASS
    }
}

impl ArchiveObject for Event {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn class(&self) -> &'static ClassInfo {
        &EVENT_CLASS
    }

    fn public_id(&self) -> Option<&str> {
        Some(&self.public_id)
    }

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()> {
        ser.value("publicID", &mut self.public_id, Hints::NONE)?;
        ser.optional(
            "preferredOriginID",
            &mut self.preferred_origin_id,
            Hints::NONE,
        )?;
        ser.optional("type", &mut self.event_type, Hints::NONE)?;
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

/// Root container of the event hierarchy.
#[derive(Debug, Default)]
pub struct EventParameters {
    core: ObjectCore,
    pub public_id: String,
    picks: Vec<Pick>,
    origins: Vec<Origin>,
    events: Vec<Event>,
}

static EVENT_PARAMETERS_CLASS: ClassInfo = ClassInfo {
    name: "EventParameters",
    public: true,
    root: true,
    ctor: event_parameters_boxed,
};

fn event_parameters_boxed() -> Box<dyn ArchiveObject> {
    Box::<EventParameters>::default()
}

impl EventParameters {
    pub fn with_public_id(public_id: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            ..Default::default()
        }
    }

    pub fn add_pick(&mut self, mut pick: Pick) {
        pick.core_mut().set_parent(ParentLink::to(self));
        self.picks.push(pick);
    }

    pub fn add_origin(&mut self, mut origin: Origin) {
        origin.core_mut().set_parent(ParentLink::to(self));
        self.origins.push(origin);
    }

    pub fn add_event(&mut self, mut event: Event) {
        event.core_mut().set_parent(ParentLink::to(self));
        self.events.push(event);
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl DomainClass for EventParameters {
    fn class_info() -> &'static ClassInfo {
        &EVENT_PARAMETERS_CLASS
    }
}

impl ArchiveObject for EventParameters {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn class(&self) -> &'static ClassInfo {
        &EVENT_PARAMETERS_CLASS
    }

    fn public_id(&self) -> Option<&str> {
        Some(&self.public_id)
    }

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()> {
        ser.value("publicID", &mut self.public_id, Hints::NONE)?;
        Ok(())
    }

    fn for_each_child(&mut self, f: &mut dyn FnMut(&mut dyn ArchiveObject)) {
        for pick in &mut self.picks {
            f(pick);
        }
        for origin in &mut self.origins {
            f(origin);
        }
        for event in &mut self.events {
            f(event);
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

//! Physics trigger zones
//!
//! Ground rectangles tested against the car chassis every tick. Sections use
//! them to know which region the car is in (camera framing, labels).

use crate::events::{Event, EventEmitter, SubscriptionId};
use crate::foundation::math::{Rect, Vec2};
use crate::physics::PhysicsWorld;
use crate::scene::{NodeId, SceneGraph};
use std::cell::RefCell;
use std::rc::Rc;

/// Trigger notifications, carrying the zone index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// Chassis entered the zone
    In(usize),
    /// Chassis left the zone
    Out(usize),
}

/// Kinds of [`TriggerEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEventKind {
    /// [`TriggerEvent::In`]
    In,
    /// [`TriggerEvent::Out`]
    Out,
}

impl Event for TriggerEvent {
    type Kind = TriggerEventKind;

    fn kind(&self) -> TriggerEventKind {
        match self {
            Self::In(_) => TriggerEventKind::In,
            Self::Out(_) => TriggerEventKind::Out,
        }
    }
}

/// A trigger rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerZone {
    /// Footprint
    pub rect: Rect,
    /// Free-form tag (section name)
    pub tag: String,
    inside: bool,
}

impl TriggerZone {
    /// True while the chassis is inside
    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

/// Trigger zone set bound to the physics chassis
pub struct Zones {
    container: NodeId,
    physics: Rc<RefCell<PhysicsWorld>>,
    items: Vec<TriggerZone>,
    events: EventEmitter<TriggerEvent>,
}

impl Zones {
    /// Create the zone set
    pub fn new(scene: &mut SceneGraph, physics: Rc<RefCell<PhysicsWorld>>) -> Self {
        Self {
            container: scene.create("zones"),
            physics,
            items: Vec::new(),
            events: EventEmitter::new(),
        }
    }

    /// Container node
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Add a trigger zone, returns its index
    pub fn add(&mut self, position: Vec2, half_extents: Vec2, tag: impl Into<String>) -> usize {
        self.items.push(TriggerZone {
            rect: Rect::new(position, half_extents),
            tag: tag.into(),
            inside: false,
        });
        self.items.len() - 1
    }

    /// Registered zones
    pub fn items(&self) -> &[TriggerZone] {
        &self.items
    }

    /// Subscribe to enter/leave events
    pub fn on<F>(&self, kind: TriggerEventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&TriggerEvent) + 'static,
    {
        self.events.on(kind, handler)
    }

    /// Per-tick chassis test
    pub fn update(&mut self) {
        let position = self.physics.borrow().chassis().position.xy();
        for (index, zone) in self.items.iter_mut().enumerate() {
            let inside = zone.rect.contains(position);
            if inside != zone.inside {
                zone.inside = inside;
                let (verb, event) = if inside {
                    ("entered", TriggerEvent::In(index))
                } else {
                    ("left", TriggerEvent::Out(index))
                };
                log::trace!("Chassis {} zone '{}'", verb, zone.tag);
                self.events.emit(&event);
            }
        }
    }
}

//! Interactive zone registry
//!
//! Zones are rectangles on the ground plane the player can interact with, by
//! clicking them or by pressing Enter while the car stands inside. The
//! starting screen registers its own zone here; sections add link zones.

use crate::events::{Event, EventEmitter, SubscriptionId};
use crate::foundation::math::{Rect, Vec2};
use crate::scene::{NodeId, SceneError, SceneGraph};
use crate::tween::Param;
use crate::world::car::Car;
use bitflags::bitflags;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

bitflags! {
    /// Zone behaviour flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ZoneFlags: u8 {
        /// Show the key hint and accept keyboard interaction
        const HAS_KEY = 1 << 0;
        /// Track the car entering and leaving
        const TEST_CAR = 1 << 1;
        /// Start active
        const ACTIVE = 1 << 2;
    }
}

impl Default for ZoneFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Registration parameters of a zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneSpec {
    /// Center on the ground plane
    pub position: Vec2,
    /// Half width and height
    pub half_extents: Vec2,
    /// Behaviour flags
    pub flags: ZoneFlags,
}

impl ZoneSpec {
    /// Active zone with key hint and car tracking
    pub fn new(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            half_extents,
            flags: ZoneFlags::default(),
        }
    }

    /// Replace the flags
    #[must_use]
    pub fn with_flags(mut self, flags: ZoneFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Ground-plane footprint
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.half_extents)
    }
}

/// Shader parameters of the zone's floor border
#[derive(Debug, Clone)]
pub struct ZoneBorder {
    /// Border opacity
    pub alpha: Param,
    /// Loading fill, used by the starting screen
    pub load_progress: Param,
    /// Activation fill
    pub progress: Param,
}

/// Zone notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    /// The player interacted with an active zone
    Interact,
    /// The car entered the zone
    CarIn,
    /// The car left the zone
    CarOut,
}

/// Kinds of [`ZoneEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneEventKind {
    /// [`ZoneEvent::Interact`]
    Interact,
    /// [`ZoneEvent::CarIn`]
    CarIn,
    /// [`ZoneEvent::CarOut`]
    CarOut,
}

impl Event for ZoneEvent {
    type Kind = ZoneEventKind;

    fn kind(&self) -> ZoneEventKind {
        match self {
            Self::Interact => ZoneEventKind::Interact,
            Self::CarIn => ZoneEventKind::CarIn,
            Self::CarOut => ZoneEventKind::CarOut,
        }
    }
}

/// A registered zone
pub struct Zone {
    id: usize,
    node: NodeId,
    spec: ZoneSpec,
    active: Cell<bool>,
    car_inside: Cell<bool>,
    border: ZoneBorder,
    events: EventEmitter<ZoneEvent>,
}

/// Shared handle to a registered zone
pub type ZoneHandle = Rc<Zone>;

impl Zone {
    /// Registration index
    pub fn id(&self) -> usize {
        self.id
    }

    /// Scene node of the zone's floor border
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Registration parameters
    pub fn spec(&self) -> &ZoneSpec {
        &self.spec
    }

    /// Floor border parameters
    pub fn border(&self) -> &ZoneBorder {
        &self.border
    }

    /// True while the zone accepts interaction
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// True while the car stands inside
    pub fn is_car_inside(&self) -> bool {
        self.car_inside.get()
    }

    /// Start accepting interaction
    pub fn activate(&self) {
        self.active.set(true);
        self.border.progress.set(1.0);
    }

    /// Stop accepting interaction
    pub fn deactivate(&self) {
        self.active.set(false);
    }

    /// Interact with the zone; ignored (returns false) while inactive
    pub fn interact(&self) -> bool {
        if !self.is_active() {
            log::debug!("Ignoring interaction with inactive zone #{}", self.id);
            return false;
        }
        self.events.emit(&ZoneEvent::Interact);
        true
    }

    /// Subscribe to zone events
    pub fn on<F>(&self, kind: ZoneEventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&ZoneEvent) + 'static,
    {
        self.events.on(kind, handler)
    }

    /// Remove a zone subscription
    pub fn off(&self, subscription: SubscriptionId) -> bool {
        self.events.off(subscription)
    }

    fn track_car(&self, position: Vec2) {
        let inside = self.spec.rect().contains(position);
        if inside == self.car_inside.get() {
            return;
        }
        self.car_inside.set(inside);
        self.events.emit(if inside { &ZoneEvent::CarIn } else { &ZoneEvent::CarOut });
    }
}

impl std::fmt::Debug for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zone")
            .field("id", &self.id)
            .field("spec", &self.spec)
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}

/// Zone registry
pub struct Areas {
    container: NodeId,
    zones: Vec<ZoneHandle>,
    car: Option<Rc<RefCell<Car>>>,
}

impl Areas {
    /// Create the registry and its detached container
    pub fn new(scene: &mut SceneGraph) -> Self {
        Self {
            container: scene.create("areas"),
            zones: Vec::new(),
            car: None,
        }
    }

    /// Container holding every zone border
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Register a zone
    pub fn register(
        &mut self,
        scene: &mut SceneGraph,
        spec: ZoneSpec,
    ) -> Result<ZoneHandle, SceneError> {
        let id = self.zones.len();
        let node = scene.create_child(self.container, format!("zone_{}", id))?;
        scene.set_position(node, spec.position.push(0.0))?;

        let active = spec.flags.contains(ZoneFlags::ACTIVE);
        let zone = Rc::new(Zone {
            id,
            node,
            spec,
            active: Cell::new(active),
            car_inside: Cell::new(false),
            border: ZoneBorder {
                alpha: Param::new(0.5),
                load_progress: Param::new(1.0),
                progress: Param::new(if active { 1.0 } else { 0.0 }),
            },
            events: EventEmitter::new(),
        });

        log::debug!("Registered zone #{} at {:?} ({:?})", id, spec.position, spec.flags);
        self.zones.push(Rc::clone(&zone));
        Ok(zone)
    }

    /// Registered zones in registration order
    pub fn zones(&self) -> &[ZoneHandle] {
        &self.zones
    }

    /// Forget zones registered after the first `len`
    pub(crate) fn truncate(&mut self, len: usize) {
        if self.zones.len() > len {
            log::debug!("Dropping {} zones", self.zones.len() - len);
            self.zones.truncate(len);
        }
    }

    /// Hand over the car so zones can track it
    pub fn set_car(&mut self, car: Rc<RefCell<Car>>) {
        self.car = Some(car);
    }

    /// True once the car has been handed over
    pub fn has_car(&self) -> bool {
        self.car.is_some()
    }

    /// Interact with the first active zone under a ground-plane point
    pub fn interact_at(&self, point: Vec2) -> bool {
        self.zones
            .iter()
            .find(|zone| zone.is_active() && zone.spec.rect().contains(point))
            .is_some_and(|zone| zone.interact())
    }

    /// Keyboard interaction with the active zone the car stands in
    pub fn interact_with_car(&self) -> bool {
        self.zones
            .iter()
            .find(|zone| {
                zone.is_active()
                    && zone.is_car_inside()
                    && zone.spec.flags.contains(ZoneFlags::HAS_KEY)
            })
            .is_some_and(|zone| zone.interact())
    }

    /// Per-tick car tracking
    pub fn update(&self) {
        let Some(car) = &self.car else { return };
        let position = car.borrow().position().xy();
        for zone in &self.zones {
            if zone.spec.flags.contains(ZoneFlags::TEST_CAR) {
                zone.track_car(position);
            }
        }
    }
}

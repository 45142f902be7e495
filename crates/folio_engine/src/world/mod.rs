//! World composition
//!
//! [`World`] owns the scene root and builds the world in two phases. The eager
//! phase runs in [`World::new`] and only creates what the starting screen
//! needs. Everything else waits for the player to interact with the start
//! zone, after which [`World::start`] builds the deferred subsystems, attaches
//! their tick handlers to the clock, and the reveal plays.

pub mod areas;
pub mod camera;
pub mod car;
pub mod easter_eggs;
pub mod floor;
pub mod materials;
pub mod objects;
pub mod reveal;
pub mod sections;
pub mod shadows;
pub mod starting_screen;
pub mod tiles;
pub mod walls;
pub mod zones;

#[cfg(test)]
mod tests;

use crate::assets::{AssetError, AssetLoader};
use crate::audio::Sounds;
use crate::config::{ConfigError, WorldConfig};
use crate::events::SubscriptionId;
use crate::foundation::math::{Vec2, Vec3};
use crate::foundation::sizes::Sizes;
use crate::foundation::time::{Clock, TickSubscription};
use crate::input::{ControlEvent, ControlEventKind, Controls, KeyCode};
use crate::physics::PhysicsWorld;
use crate::scene::{NodeId, SceneError, SceneGraph};
use crate::tween::Timeline;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use areas::{Areas, ZoneHandle};
use camera::Camera;
use car::Car;
use easter_eggs::EasterEggs;
use floor::Floor;
use materials::Materials;
use objects::Objects;
use reveal::{Reveal, RevealTargets};
use sections::{SectionContext, Sections};
use shadows::Shadows;
use starting_screen::StartingScreen;
use tiles::Tiles;
use walls::Walls;
use zones::Zones;

/// World errors
#[derive(thiserror::Error, Debug)]
pub enum WorldError {
    /// `start` was called a second time
    #[error("World already started")]
    AlreadyStarted,

    /// `start` was called before the starting screen was passed
    #[error("Starting screen has not been passed")]
    GateClosed,

    /// The operation needs the deferred subsystems
    #[error("World not started")]
    NotStarted,

    /// `go` was called a second time
    #[error("Reveal already started")]
    RevealAlreadyStarted,

    /// Asset error
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Lifecycle of a [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WorldPhase {
    /// Being built
    Constructed,
    /// Eager subsystems up, waiting on the starting screen
    Gated,
    /// Deferred subsystems built
    Started,
    /// Reveal playing
    Revealing,
    /// Reveal finished
    Revealed,
}

/// Which bootstrap phase built a subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapPhase {
    /// Built by [`World::new`]
    Eager,
    /// Built by [`World::start`]
    Deferred,
}

/// Subsystems built by [`World::start`]
pub struct Deferred {
    /// Shade materials
    pub materials: Rc<RefCell<Materials>>,
    /// Ambient shadows
    pub shadows: Rc<RefCell<Shadows>>,
    /// Physics world
    pub physics: Rc<RefCell<PhysicsWorld>>,
    /// Trigger zones
    pub zones: Rc<RefCell<Zones>>,
    /// Renderable objects
    pub objects: Rc<RefCell<Objects>>,
    /// The car
    pub car: Rc<RefCell<Car>>,
    /// Tile paths
    pub tiles: Tiles,
    /// Walls
    pub walls: Walls,
    /// Content sections
    pub sections: Sections,
    /// Easter eggs
    pub easter_eggs: Rc<RefCell<EasterEggs>>,
    /// Reveal sequencer
    pub reveal: Rc<RefCell<Reveal>>,
    car_shadow: usize,
}

impl Deferred {
    /// Containers attached to the root, in attach order
    pub fn containers(&self) -> Vec<NodeId> {
        let mut containers = vec![
            self.shadows.borrow().container(),
            self.zones.borrow().container(),
            self.objects.borrow().container(),
            self.car.borrow().container(),
        ];
        containers.extend(self.sections.containers());
        containers.push(self.easter_eggs.borrow().container());
        containers
    }
}

#[derive(Default)]
struct Subscriptions {
    ticks: Vec<TickSubscription>,
    resize: Option<SubscriptionId>,
    controls: Vec<SubscriptionId>,
}

/// The world
pub struct World {
    config: WorldConfig,
    clock: Clock,
    sizes: Rc<Sizes>,
    resources: Rc<RefCell<AssetLoader>>,
    scene: SceneGraph,
    timeline: Rc<RefCell<Timeline>>,
    phase: WorldPhase,
    construction_log: Vec<(BootstrapPhase, &'static str)>,

    sounds: Rc<RefCell<Sounds>>,
    controls: Rc<RefCell<Controls>>,
    floor: Floor,
    areas: Rc<RefCell<Areas>>,
    starting_screen: StartingScreen,
    camera: Rc<RefCell<Camera>>,

    deferred: Option<Deferred>,
    subscriptions: Subscriptions,
    destroyed: bool,
}

impl World {
    /// Seconds between `start` and the camera allowing pans
    pub const CAMERA_PAN_DELAY: f32 = 2.0;

    /// Build the eager subsystems and wait on the starting screen
    pub fn new(
        config: WorldConfig,
        clock: Clock,
        sizes: Rc<Sizes>,
        resources: Rc<RefCell<AssetLoader>>,
    ) -> Result<Self, WorldError> {
        log::info!("Creating World (touch: {}, debug: {})", config.touch, config.debug);
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let mut construction_log = Vec::new();
        let mut subscriptions = Subscriptions::default();

        let timeline = Rc::new(RefCell::new(Timeline::new()));
        subscriptions.ticks.push(Self::tick_with(&clock, &timeline, |timeline, delta| {
            timeline.advance(delta);
        }));

        let camera = Rc::new(RefCell::new(Camera::new(sizes.viewport())));
        let weak_camera = Rc::downgrade(&camera);
        subscriptions.resize = Some(sizes.on_resize(move |resized| {
            if let Some(camera) = weak_camera.upgrade() {
                camera.borrow_mut().resize(resized.0);
            }
        }));

        let sounds = Rc::new(RefCell::new(Sounds::new()));
        construction_log.push((BootstrapPhase::Eager, "sounds"));

        let controls = Rc::new(RefCell::new(Controls::new(config.touch)));
        construction_log.push((BootstrapPhase::Eager, "controls"));

        let floor = Floor::new(&mut scene);
        scene.attach(root, floor.container())?;
        construction_log.push((BootstrapPhase::Eager, "floor"));

        let mut areas = Areas::new(&mut scene);
        scene.attach(root, areas.container())?;
        construction_log.push((BootstrapPhase::Eager, "areas"));

        let starting_screen =
            StartingScreen::new(&mut scene, &mut areas, &resources.borrow(), &timeline)?;
        scene.attach(root, starting_screen.container())?;
        construction_log.push((BootstrapPhase::Eager, "starting_screen"));

        let mut world = Self {
            config,
            clock,
            sizes,
            resources,
            scene,
            timeline,
            phase: WorldPhase::Constructed,
            construction_log,
            sounds,
            controls,
            floor,
            areas: Rc::new(RefCell::new(areas)),
            starting_screen,
            camera,
            deferred: None,
            subscriptions,
            destroyed: false,
        };
        world.phase = WorldPhase::Gated;
        log::debug!("World gated on the starting screen");
        Ok(world)
    }

    /// Subscribe `update` to the clock for as long as `target` lives
    fn tick_with<T, F>(clock: &Clock, target: &Rc<RefCell<T>>, mut update: F) -> TickSubscription
    where
        T: 'static,
        F: FnMut(&mut T, f32) + 'static,
    {
        let weak: Weak<RefCell<T>> = Rc::downgrade(target);
        clock.on_tick(move |tick| {
            if let Some(target) = weak.upgrade() {
                update(&mut target.borrow_mut(), tick.delta);
            }
        })
    }

    /// Run one frame: apply finished loads, tick the clock, advance the phase
    pub fn frame(&mut self, delta: f32) -> Result<(), WorldError> {
        if self.destroyed {
            return Ok(());
        }
        self.resources.borrow_mut().pump();
        self.poll_gate()?;
        self.clock.tick(delta);

        if self.phase == WorldPhase::Revealing {
            let settled = self.deferred.as_ref().is_some_and(|d| d.reveal.borrow().is_settled());
            if settled {
                self.phase = WorldPhase::Revealed;
                log::info!("World revealed after {:.2}s", self.clock.elapsed());
            }
        }
        Ok(())
    }

    /// Interact with a zone directly, returns whether it reacted
    pub fn interact(&mut self, zone: &ZoneHandle) -> Result<bool, WorldError> {
        let reacted = zone.interact();
        self.poll_gate()?;
        Ok(reacted)
    }

    /// Click or tap at a ground-plane point
    pub fn interact_at(&mut self, point: Vec2) -> Result<bool, WorldError> {
        let reacted = self.areas.borrow().interact_at(point);
        self.poll_gate()?;
        Ok(reacted)
    }

    /// Feed a key transition; Enter interacts with the zone under the car
    pub fn key(&mut self, key: KeyCode, pressed: bool) -> Result<bool, WorldError> {
        self.controls.borrow_mut().handle_key(key, pressed);
        let reacted = pressed && key == KeyCode::Enter && self.areas.borrow().interact_with_car();
        self.poll_gate()?;
        Ok(reacted)
    }

    /// Start and reveal if the starting screen signalled
    fn poll_gate(&mut self) -> Result<bool, WorldError> {
        match self.phase {
            WorldPhase::Gated if self.starting_screen.signal().is_raised() => self.start()?,
            // Started through `start` directly, the reveal still follows
            WorldPhase::Started => {}
            _ => return Ok(false),
        }
        self.reveal_go()?;
        Ok(true)
    }

    /// Build the deferred subsystems and attach their tick handlers
    ///
    /// Only allowed once the starting screen has signalled. Nothing is
    /// committed unless every subsystem builds: on failure the scene, the
    /// zone registry and the construction log are left as they were and the
    /// signal stays raised.
    pub fn start(&mut self) -> Result<(), WorldError> {
        if self.deferred.is_some() {
            log::warn!("World::start called twice, ignoring");
            return Err(WorldError::AlreadyStarted);
        }
        if self.phase != WorldPhase::Gated || !self.starting_screen.signal().is_raised() {
            log::warn!("World::start called before the starting screen was passed");
            return Err(WorldError::GateClosed);
        }
        log::info!("Starting World");

        let existing: HashSet<NodeId> = self.scene.node_ids().collect();
        let zone_count = self.areas.borrow().zones().len();
        let (deferred, built) = match self.build_deferred() {
            Ok(result) => result,
            Err(e) => {
                self.discard_partial_build(&existing, zone_count);
                log::error!("World start failed: {}", e);
                return Err(e);
            }
        };

        self.starting_screen.signal().take();
        self.construction_log
            .extend(built.into_iter().map(|name| (BootstrapPhase::Deferred, name)));
        self.areas.borrow_mut().set_car(Rc::clone(&deferred.car));
        self.attach_handlers(&deferred);
        self.deferred = Some(deferred);

        let camera = Rc::downgrade(&self.camera);
        self.timeline.borrow_mut().call_after(Self::CAMERA_PAN_DELAY, move || {
            if let Some(camera) = camera.upgrade() {
                camera.borrow_mut().enable_pan();
            }
        });

        self.phase = WorldPhase::Started;
        log::info!("World started");
        Ok(())
    }

    fn build_deferred(&mut self) -> Result<(Deferred, Vec<&'static str>), WorldError> {
        let resources = Rc::clone(&self.resources);
        let loader = resources.borrow();
        let items = loader.items();
        let scene = &mut self.scene;
        let touch = self.controls.borrow().touch().is_some();
        let mut built = Vec::new();

        let materials = Rc::new(RefCell::new(Materials::new(items)));
        built.push("materials");

        let mut shadows = Shadows::new(scene);
        built.push("shadows");

        let physics = Rc::new(RefCell::new(PhysicsWorld::new()));
        built.push("physics");

        let mut zones = Zones::new(scene, Rc::clone(&physics));
        built.push("zones");

        let mut objects = Objects::new(scene, Rc::clone(&physics));
        built.push("objects");

        let car = Car::new(scene, items, Rc::clone(&physics), self.config.cyber_truck)?;
        let car_shadow = shadows.add(scene, car.position(), Vec2::new(2.0, 4.0))?;
        built.push("car");

        let mut tiles = Tiles::new();
        built.push("tiles");

        let mut walls = Walls::new();
        built.push("walls");

        let sections = Sections::new(SectionContext {
            scene: &mut *scene,
            items,
            objects: &mut objects,
            areas: &mut self.areas.borrow_mut(),
            zones: &mut zones,
            tiles: &mut tiles,
            walls: &mut walls,
            touch,
        })?;
        built.push("sections");

        let easter_eggs = EasterEggs::new(scene, &mut objects, items, Rc::clone(&physics))?;
        built.push("easter_eggs");
        drop(loader);

        let objects = Rc::new(RefCell::new(objects));
        let shadows = Rc::new(RefCell::new(shadows));
        let intro = sections.intro();
        let reveal = Reveal::new(
            RevealTargets {
                materials: Rc::clone(&materials),
                objects: Rc::clone(&objects),
                shadows_alpha: shadows.borrow().alpha().clone(),
                instructions_label: Some(intro.instructions_label().clone()),
                other_instructions_label: intro.other_instructions_label().cloned(),
                physics: Rc::clone(&physics),
                sounds: Rc::clone(&self.sounds),
                controls: Rc::clone(&self.controls),
            },
            self.config.debug,
        );
        built.push("reveal");

        let deferred = Deferred {
            materials,
            shadows,
            physics,
            zones: Rc::new(RefCell::new(zones)),
            objects,
            car: Rc::new(RefCell::new(car)),
            tiles,
            walls,
            sections,
            easter_eggs: Rc::new(RefCell::new(easter_eggs)),
            reveal: Rc::new(RefCell::new(reveal)),
            car_shadow,
        };

        let root = self.scene.root();
        for container in deferred.containers() {
            self.scene.attach(root, container)?;
        }
        Ok((deferred, built))
    }

    /// Drop every node and zone a failed `build_deferred` left behind
    fn discard_partial_build(&mut self, existing: &HashSet<NodeId>, zone_count: usize) {
        self.areas.borrow_mut().truncate(zone_count);

        let created: Vec<NodeId> =
            self.scene.node_ids().filter(|id| !existing.contains(id)).collect();
        let mut removed = 0;
        for node in created {
            // Already gone when an ancestor was removed first
            if self.scene.get(node).is_none() {
                continue;
            }
            match self.scene.remove(node) {
                Ok(count) => removed += count,
                Err(e) => log::warn!("Could not discard node {:?}: {}", node, e),
            }
        }
        log::debug!("Discarded {} nodes from the partial build", removed);
    }

    fn attach_handlers(&mut self, deferred: &Deferred) {
        let clock = &self.clock;
        let ticks = &mut self.subscriptions.ticks;

        let controls = Rc::clone(&self.controls);
        ticks.push(Self::tick_with(clock, &deferred.physics, move |physics, delta| {
            physics.step(delta, controls.borrow().actions());
        }));
        ticks.push(Self::tick_with(clock, &deferred.zones, |zones, _| zones.update()));
        ticks.push(Self::tick_with(clock, &deferred.car, |car, _| car.update()));
        ticks.push(Self::tick_with(clock, &self.areas, |areas, _| areas.update()));

        let car = Rc::downgrade(&deferred.car);
        let car_shadow = deferred.car_shadow;
        ticks.push(Self::tick_with(clock, &deferred.shadows, move |shadows, _| {
            if let Some(car) = car.upgrade() {
                shadows.follow(car_shadow, car.borrow().position());
            }
        }));

        let car = Rc::downgrade(&deferred.car);
        ticks.push(Self::tick_with(clock, &self.camera, move |camera, _| {
            if let Some(car) = car.upgrade() {
                camera.follow(car.borrow().position());
            }
        }));

        ticks.push(Self::tick_with(clock, &deferred.reveal, |reveal, delta| reveal.tick(delta)));

        let easter_eggs = Rc::downgrade(&deferred.easter_eggs);
        let subscription = self.controls.borrow().on(ControlEventKind::KeyDown, move |event| {
            if let (ControlEvent::KeyDown(key), Some(eggs)) = (event, easter_eggs.upgrade()) {
                eggs.borrow_mut().handle_key(*key);
            }
        });
        self.subscriptions.controls.push(subscription);
        log::debug!("Attached {} tick handlers", self.subscriptions.ticks.len());
    }

    /// Play the reveal
    pub fn reveal_go(&mut self) -> Result<(), WorldError> {
        let deferred = self.deferred.as_ref().ok_or(WorldError::NotStarted)?;
        deferred.reveal.borrow_mut().go()?;
        self.phase = WorldPhase::Revealing;
        Ok(())
    }

    /// Switch controls to touch mode, returns false if already on
    pub fn enable_touch(&mut self) -> bool {
        let mut controls = self.controls.borrow_mut();
        if !controls.enable_touch() {
            return false;
        }
        if self.phase >= WorldPhase::Revealing {
            if let Some(touch) = controls.touch_mut() {
                touch.reveal();
            }
        }
        true
    }

    /// Unsubscribe every handler the world registered and detach its containers
    pub fn destroy(&mut self) -> Result<(), WorldError> {
        if self.destroyed {
            return Ok(());
        }
        for subscription in self.subscriptions.ticks.drain(..) {
            self.clock.off_tick(subscription);
        }
        if let Some(subscription) = self.subscriptions.resize.take() {
            self.sizes.off_resize(subscription);
        }
        for subscription in self.subscriptions.controls.drain(..) {
            self.controls.borrow().off(subscription);
        }
        self.starting_screen.detach(&self.resources.borrow());

        for container in self.containers() {
            if self.scene.is_in_scene(container) {
                self.scene.detach(container)?;
            }
        }
        self.destroyed = true;
        log::info!("World destroyed");
        Ok(())
    }

    /// Containers attached to the root, in attach order
    pub fn containers(&self) -> Vec<NodeId> {
        let mut containers = vec![
            self.floor.container(),
            self.areas.borrow().container(),
            self.starting_screen.container(),
        ];
        if let Some(deferred) = &self.deferred {
            containers.extend(deferred.containers());
        }
        containers
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> WorldPhase {
        self.phase
    }

    /// Subsystems in construction order, tagged with their phase
    pub fn construction_log(&self) -> &[(BootstrapPhase, &'static str)] {
        &self.construction_log
    }

    /// World configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Scene graph
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Clock driving the world
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Sounds
    pub fn sounds(&self) -> &Rc<RefCell<Sounds>> {
        &self.sounds
    }

    /// Controls
    pub fn controls(&self) -> &Rc<RefCell<Controls>> {
        &self.controls
    }

    /// Floor
    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    /// Zone registry
    pub fn areas(&self) -> &Rc<RefCell<Areas>> {
        &self.areas
    }

    /// Starting screen
    pub fn starting_screen(&self) -> &StartingScreen {
        &self.starting_screen
    }

    /// Camera
    pub fn camera(&self) -> &Rc<RefCell<Camera>> {
        &self.camera
    }

    /// Deferred subsystems, once started
    pub fn deferred(&self) -> Option<&Deferred> {
        self.deferred.as_ref()
    }

    /// Car position, once started
    pub fn car_position(&self) -> Option<Vec3> {
        self.deferred.as_ref().map(|d| d.car.borrow().position())
    }
}

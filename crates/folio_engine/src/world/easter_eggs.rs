//! Easter eggs
//!
//! Typing the Konami code drops a crate of lemons from the sky.

use crate::assets::LoadedItems;
use crate::foundation::math::{Vec2, Vec3};
use crate::input::KeyCode;
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::scene::{NodeId, SceneError, SceneGraph};
use crate::world::objects::{ObjectSpec, Objects};
use std::cell::RefCell;
use std::rc::Rc;

/// Up Up Down Down Left Right Left Right B A
pub const KONAMI_SEQUENCE: [KeyCode; 10] = [
    KeyCode::Up,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::B,
    KeyCode::A,
];

/// Incremental Konami code matcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KonamiCode {
    matched: usize,
}

impl KonamiCode {
    /// Feed a key press, returns true when the sequence completes
    pub fn push(&mut self, key: KeyCode) -> bool {
        if KONAMI_SEQUENCE[self.matched] == key {
            self.matched += 1;
        } else if !(self.matched == 2 && key == KeyCode::Up) {
            // A wrong key may still be the start of a new attempt; a third Up keeps two
            self.matched = usize::from(KONAMI_SEQUENCE[0] == key);
        }
        if self.matched == KONAMI_SEQUENCE.len() {
            self.matched = 0;
            return true;
        }
        false
    }
}

/// Easter egg triggers
pub struct EasterEggs {
    container: NodeId,
    physics: Rc<RefCell<PhysicsWorld>>,
    konami: KonamiCode,
    lemons: Vec<BodyHandle>,
    dropped: bool,
}

impl EasterEggs {
    /// Number of lemons in the crate
    pub const LEMON_COUNT: usize = 12;

    /// Create the triggers; lemons wait asleep above the intro
    pub fn new(
        scene: &mut SceneGraph,
        objects: &mut Objects,
        items: &LoadedItems,
        physics: Rc<RefCell<PhysicsWorld>>,
    ) -> Result<Self, SceneError> {
        let container = scene.create("easter_eggs");
        let mut lemons = Vec::with_capacity(Self::LEMON_COUNT);

        for i in 0..Self::LEMON_COUNT {
            let angle = i as f32 / Self::LEMON_COUNT as f32 * std::f32::consts::TAU;
            let offset = Vec3::new(angle.cos() * 2.0, angle.sin() * 2.0, 10.0 + i as f32 * 0.5);
            let spec = ObjectSpec::new(format!("lemon_{}", i), offset)
                .with_base("lemonBase")
                .with_mass(0.2)
                .with_floor_shadow(Vec2::new(0.5, 0.5));
            let index = objects.add(scene, items, spec)?;
            if let Some(body) = objects.items()[index].body {
                lemons.push(body);
            }
        }

        {
            let mut physics = physics.borrow_mut();
            for handle in &lemons {
                if let Some(body) = physics.body_mut(*handle) {
                    body.sleep();
                }
            }
        }

        Ok(Self {
            container,
            physics,
            konami: KonamiCode::default(),
            lemons,
            dropped: false,
        })
    }

    /// Container node
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Feed a key press, returns true if it triggered the lemon drop
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        if !self.konami.push(key) || self.dropped {
            return false;
        }
        self.drop_lemons();
        true
    }

    /// True once the lemons were dropped
    pub fn lemons_dropped(&self) -> bool {
        self.dropped
    }

    fn drop_lemons(&mut self) {
        log::info!("Konami code! Dropping {} lemons", self.lemons.len());
        let mut physics = self.physics.borrow_mut();
        for handle in &self.lemons {
            if let Some(body) = physics.body_mut(*handle) {
                body.wake_up();
            }
        }
        self.dropped = true;
    }
}

//! Physics
//!
//! A minimal rigid-body world: the car chassis plus any dynamic bodies the
//! objects register. Bodies can be put to sleep, woken up and teleported; the
//! solver itself is a plain explicit integrator over a flat floor at `z = 0`.

use crate::foundation::math::{Vec2, Vec3};
use crate::input::Actions;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a body registered with [`PhysicsWorld::add_body`]
    pub struct BodyHandle;
}

/// Downward acceleration applied to awake bodies above the floor
pub const GRAVITY: f32 = 13.0;

/// Chassis acceleration while accelerating, per second squared
pub const CAR_ACCELERATION: f32 = 18.0;

/// Chassis top speed on the ground plane
pub const CAR_MAX_SPEED: f32 = 12.0;

/// Simulated body
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// World position (z up)
    pub position: Vec3,
    /// Linear velocity
    pub velocity: Vec3,
    /// Zero for static bodies
    pub mass: f32,
    sleeping: bool,
    sleep_count: u32,
    wake_count: u32,
}

impl RigidBody {
    /// Awake body at rest
    pub fn new(position: Vec3, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            mass,
            sleeping: false,
            sleep_count: 0,
            wake_count: 0,
        }
    }

    /// Stop simulating this body and clear its velocity
    pub fn sleep(&mut self) {
        self.sleeping = true;
        self.velocity = Vec3::zeros();
        self.sleep_count += 1;
    }

    /// Resume simulation
    pub fn wake_up(&mut self) {
        self.sleeping = false;
        self.wake_count += 1;
    }

    /// Teleport the body
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// True while asleep
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Number of [`RigidBody::sleep`] calls
    pub fn sleep_count(&self) -> u32 {
        self.sleep_count
    }

    /// Number of [`RigidBody::wake_up`] calls
    pub fn wake_count(&self) -> u32 {
        self.wake_count
    }

    /// True for bodies the solver moves
    pub fn is_dynamic(&self) -> bool {
        self.mass > 0.0
    }

    fn integrate(&mut self, delta: f32) {
        if self.sleeping || !self.is_dynamic() {
            return;
        }
        if self.position.z > 0.0 || self.velocity.z > 0.0 {
            self.velocity.z -= GRAVITY * delta;
        }
        self.position += self.velocity * delta;
        if self.position.z < 0.0 {
            self.position.z = 0.0;
            self.velocity.z = 0.0;
        }
    }
}

/// Physics world owning the car chassis and dynamic scene bodies
#[derive(Debug)]
pub struct PhysicsWorld {
    chassis: RigidBody,
    bodies: SlotMap<BodyHandle, RigidBody>,
    heading: f32,
    elapsed: f32,
}

impl PhysicsWorld {
    /// Create the world with the chassis at its spawn point
    pub fn new() -> Self {
        log::debug!("Creating PhysicsWorld");
        Self {
            chassis: RigidBody::new(Vec3::new(0.0, 0.0, 12.0), 40.0),
            bodies: SlotMap::with_key(),
            heading: 0.0,
            elapsed: 0.0,
        }
    }

    /// Car chassis body
    pub fn chassis(&self) -> &RigidBody {
        &self.chassis
    }

    /// Mutable car chassis body
    pub fn chassis_mut(&mut self) -> &mut RigidBody {
        &mut self.chassis
    }

    /// Register a body
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.insert(body)
    }

    /// Body by handle
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Mutable body by handle
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Number of registered bodies, chassis excluded
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Chassis heading in radians, 0 facing +y
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Total simulated time
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance the simulation, steering the chassis from the held actions
    pub fn step(&mut self, delta: f32, actions: Actions) {
        self.elapsed += delta;
        if !self.chassis.is_sleeping() {
            self.drive(delta, actions);
        }
        self.chassis.integrate(delta);
        for body in self.bodies.values_mut() {
            body.integrate(delta);
        }
        log::trace!("Physics step {:.4}: chassis at {:?}", delta, self.chassis.position);
    }

    fn drive(&mut self, delta: f32, actions: Actions) {
        let turn = match (actions.contains(Actions::LEFT), actions.contains(Actions::RIGHT)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        self.heading += turn * 2.0 * delta;

        let forward = Vec2::new(-self.heading.sin(), self.heading.cos());
        let mut planar = Vec2::new(self.chassis.velocity.x, self.chassis.velocity.y);

        let throttle = match (actions.contains(Actions::UP), actions.contains(Actions::DOWN)) {
            (true, false) => 1.0,
            (false, true) => -0.5,
            _ => 0.0,
        };
        let boost = if actions.contains(Actions::BOOST) { 2.0 } else { 1.0 };
        planar += forward * throttle * CAR_ACCELERATION * boost * delta;

        if actions.contains(Actions::BRAKE) || throttle == 0.0 {
            let damping = if actions.contains(Actions::BRAKE) { 6.0 } else { 1.5 };
            planar *= (1.0 - damping * delta).max(0.0);
        }

        let max_speed = CAR_MAX_SPEED * boost;
        if planar.norm() > max_speed {
            planar = planar.normalize() * max_speed;
        }
        self.chassis.velocity.x = planar.x;
        self.chassis.velocity.y = planar.y;
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

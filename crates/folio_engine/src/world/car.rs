//! Drivable car
//!
//! Visual side of the car: picks the model variant, checks its meshes were
//! loaded, and mirrors the physics chassis every tick.

use crate::assets::LoadedItems;
use crate::foundation::math::Vec3;
use crate::physics::PhysicsWorld;
use crate::scene::{NodeId, SceneError, SceneGraph};
use std::cell::RefCell;
use std::rc::Rc;

/// Car model variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarModel {
    /// Default car
    Default,
    /// Truck variant
    CyberTruck,
}

impl CarModel {
    /// Loaded item names of the model parts
    pub fn parts(self) -> [&'static str; 4] {
        match self {
            Self::Default => [
                "carDefaultChassis",
                "carDefaultWheel",
                "carDefaultBackLightsBrake",
                "carDefaultAntena",
            ],
            Self::CyberTruck => [
                "carCyberTruckChassis",
                "carCyberTruckWheel",
                "carCyberTruckBackLightsBrake",
                "carCyberTruckAntena",
            ],
        }
    }
}

/// The car
pub struct Car {
    container: NodeId,
    model: CarModel,
    missing_parts: Vec<&'static str>,
    physics: Rc<RefCell<PhysicsWorld>>,
    position: Vec3,
    heading: f32,
}

impl Car {
    /// Build the car under a detached container
    pub fn new(
        scene: &mut SceneGraph,
        items: &LoadedItems,
        physics: Rc<RefCell<PhysicsWorld>>,
        cyber_truck: bool,
    ) -> Result<Self, SceneError> {
        let model = if cyber_truck { CarModel::CyberTruck } else { CarModel::Default };
        let container = scene.create("car");
        for part in ["chassis", "wheels", "back_lights", "antena"] {
            scene.create_child(container, part)?;
        }

        let missing_parts: Vec<&'static str> =
            model.parts().into_iter().filter(|part| !items.contains(part)).collect();
        if !missing_parts.is_empty() {
            log::warn!("Car model {:?} is missing {:?}", model, missing_parts);
        }

        let position = physics.borrow().chassis().position;
        log::debug!("Creating Car ({:?}) at {:?}", model, position);

        Ok(Self {
            container,
            model,
            missing_parts,
            physics,
            position,
            heading: 0.0,
        })
    }

    /// Container node
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Model variant
    pub fn model(&self) -> CarModel {
        self.model
    }

    /// Model parts that were not among the loaded items
    pub fn missing_parts(&self) -> &[&'static str] {
        &self.missing_parts
    }

    /// Position as of the last tick
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Heading as of the last tick
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Copy the chassis transform
    pub fn update(&mut self) {
        let physics = self.physics.borrow();
        self.position = physics.chassis().position;
        self.heading = physics.heading();
    }
}

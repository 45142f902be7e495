//! Renderable objects
//!
//! Sections, walls and tiles add their props here. An object may carry a
//! physics body and a baked floor shadow; floor shadows are what the reveal
//! fades in.

use crate::assets::LoadedItems;
use crate::foundation::math::{Vec2, Vec3};
use crate::physics::{BodyHandle, PhysicsWorld, RigidBody};
use crate::scene::{NodeId, SceneError, SceneGraph};
use std::cell::RefCell;
use std::rc::Rc;

/// Description of an object to add
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSpec {
    /// Object name, unique per section
    pub name: String,
    /// Loaded item holding the model, if any
    pub base: Option<String>,
    /// World position
    pub offset: Vec3,
    /// Physics mass; 0 for static, `None` for no body
    pub mass: Option<f32>,
    /// Size of the baked floor shadow, `None` for no shadow
    pub floor_shadow: Option<Vec2>,
}

impl ObjectSpec {
    /// Object with no model, body or shadow
    pub fn new(name: impl Into<String>, offset: Vec3) -> Self {
        Self {
            name: name.into(),
            base: None,
            offset,
            mass: None,
            floor_shadow: None,
        }
    }

    /// Use a loaded model
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Give the object a physics body
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Give the object a floor shadow
    #[must_use]
    pub fn with_floor_shadow(mut self, size: Vec2) -> Self {
        self.floor_shadow = Some(size);
        self
    }
}

/// Baked shadow quad under an object
#[derive(Debug, Clone, PartialEq)]
pub struct FloorShadow {
    node: NodeId,
    alpha: f32,
    revision: u64,
}

impl FloorShadow {
    /// Scene node of the quad
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Current alpha parameter
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Number of parameter uploads so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Upload a new alpha value
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.revision += 1;
    }
}

/// An added object
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Object name
    pub name: String,
    /// Scene node
    pub node: NodeId,
    /// Physics body, if any
    pub body: Option<BodyHandle>,
    /// Index into [`Objects::floor_shadows`]
    pub floor_shadow: Option<usize>,
    /// False when a base model was named but not loaded
    pub has_model: bool,
}

/// Object collection
pub struct Objects {
    container: NodeId,
    physics: Rc<RefCell<PhysicsWorld>>,
    items: Vec<SceneObject>,
    floor_shadows: Vec<FloorShadow>,
}

impl Objects {
    /// Create the collection
    pub fn new(scene: &mut SceneGraph, physics: Rc<RefCell<PhysicsWorld>>) -> Self {
        Self {
            container: scene.create("objects"),
            physics,
            items: Vec::new(),
            floor_shadows: Vec::new(),
        }
    }

    /// Container node
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Add an object, returns its index
    pub fn add(
        &mut self,
        scene: &mut SceneGraph,
        items: &LoadedItems,
        spec: ObjectSpec,
    ) -> Result<usize, SceneError> {
        let node = scene.create_child(self.container, spec.name.as_str())?;
        scene.set_position(node, spec.offset)?;

        let has_model = match &spec.base {
            Some(base) if !items.contains(base) => {
                log::debug!("Object '{}' has no loaded model '{}'", spec.name, base);
                false
            }
            _ => true,
        };

        let body = spec
            .mass
            .map(|mass| self.physics.borrow_mut().add_body(RigidBody::new(spec.offset, mass)));

        let floor_shadow = match spec.floor_shadow {
            Some(_) => {
                let shadow_node = scene.create_child(node, "floor_shadow")?;
                self.floor_shadows.push(FloorShadow {
                    node: shadow_node,
                    alpha: 0.0,
                    revision: 0,
                });
                Some(self.floor_shadows.len() - 1)
            }
            None => None,
        };

        self.items.push(SceneObject {
            name: spec.name,
            node,
            body,
            floor_shadow,
            has_model,
        });
        Ok(self.items.len() - 1)
    }

    /// Added objects
    pub fn items(&self) -> &[SceneObject] {
        &self.items
    }

    /// Object by name
    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.items.iter().find(|object| object.name == name)
    }

    /// Every floor shadow
    pub fn floor_shadows(&self) -> &[FloorShadow] {
        &self.floor_shadows
    }

    /// Mutable floor shadows
    pub fn floor_shadows_mut(&mut self) -> &mut [FloorShadow] {
        &mut self.floor_shadows
    }
}

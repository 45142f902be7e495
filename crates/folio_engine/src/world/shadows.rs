//! Ambient shadows
//!
//! Blob shadows projected from a fixed sun direction onto the floor. The
//! shared alpha fades in during the reveal.

use crate::foundation::math::{Vec2, Vec3};
use crate::scene::{NodeId, SceneError, SceneGraph};
use crate::tween::Param;

/// Registered shadow caster
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowCaster {
    /// Scene node of the projected shadow
    pub node: NodeId,
    /// Footprint size of the caster
    pub size: Vec2,
    /// Ground position of the projected shadow
    pub position: Vec2,
}

/// Shadow system
#[derive(Debug)]
pub struct Shadows {
    container: NodeId,
    alpha: Param,
    sun: Vec3,
    max_distance: f32,
    casters: Vec<ShadowCaster>,
}

impl Shadows {
    /// Create the shadow container; shadows start fully transparent
    pub fn new(scene: &mut SceneGraph) -> Self {
        Self {
            container: scene.create("shadows"),
            alpha: Param::new(0.0),
            sun: Vec3::new(-0.5, -0.5, 1.0).normalize(),
            max_distance: 1.5,
            casters: Vec::new(),
        }
    }

    /// Container node
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Shared shadow opacity
    pub fn alpha(&self) -> &Param {
        &self.alpha
    }

    /// Registered casters
    pub fn casters(&self) -> &[ShadowCaster] {
        &self.casters
    }

    /// Register a caster standing at `position`
    pub fn add(
        &mut self,
        scene: &mut SceneGraph,
        position: Vec3,
        size: Vec2,
    ) -> Result<usize, SceneError> {
        let node = scene.create_child(self.container, format!("shadow_{}", self.casters.len()))?;
        let caster = ShadowCaster {
            node,
            size,
            position: self.project(position),
        };
        scene.set_position(node, caster.position.push(0.0))?;
        self.casters.push(caster);
        Ok(self.casters.len() - 1)
    }

    /// Move a caster's shadow to follow its owner
    pub fn follow(&mut self, index: usize, position: Vec3) {
        let projected = self.project(position);
        if let Some(caster) = self.casters.get_mut(index) {
            caster.position = projected;
        }
    }

    /// Opacity of a caster's shadow, fading with height above the floor
    pub fn caster_alpha(&self, height: f32) -> f32 {
        let fade = 1.0 - (height / self.max_distance).clamp(0.0, 1.0);
        self.alpha.get() * fade
    }

    fn project(&self, position: Vec3) -> Vec2 {
        let height = position.z.max(0.0);
        let along = self.sun.xy() * (height / self.sun.z);
        position.xy() - along
    }
}

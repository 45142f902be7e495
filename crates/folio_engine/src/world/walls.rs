//! Walls of physics bricks

use crate::assets::LoadedItems;
use crate::foundation::math::Vec3;
use crate::scene::{SceneError, SceneGraph};
use crate::world::objects::{ObjectSpec, Objects};

/// Layout of a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallShape {
    /// Aligned columns
    Rectangle,
    /// Every other row shifted by half a brick
    Brick,
}

/// Description of a wall to build
#[derive(Debug, Clone, PartialEq)]
pub struct WallSpec {
    /// Layout
    pub shape: WallShape,
    /// Center of the bottom row
    pub position: Vec3,
    /// Bricks per row
    pub width_count: usize,
    /// Number of rows
    pub height_count: usize,
    /// Step between bricks in a row
    pub offset_width: Vec3,
    /// Step between rows
    pub offset_height: Vec3,
    /// Brick model
    pub base: String,
    /// Brick mass
    pub mass: f32,
}

/// Wall builder; every brick becomes a dynamic object
#[derive(Debug, Default)]
pub struct Walls {
    built: Vec<Vec<usize>>,
}

impl Walls {
    /// Create the builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a wall, returns the object indices of its bricks
    pub fn add(
        &mut self,
        scene: &mut SceneGraph,
        objects: &mut Objects,
        items: &LoadedItems,
        spec: &WallSpec,
    ) -> Result<&[usize], SceneError> {
        let wall = self.built.len();
        let mut bricks = Vec::with_capacity(spec.width_count * spec.height_count);

        for row in 0..spec.height_count {
            let shifted = spec.shape == WallShape::Brick && row % 2 == 1;
            let count = if shifted { spec.width_count.saturating_sub(1) } else { spec.width_count };
            let row_start = spec.position + spec.offset_height * row as f32
                - spec.offset_width * (count.saturating_sub(1) as f32 / 2.0);

            for column in 0..count {
                let offset = row_start + spec.offset_width * column as f32;
                let name = format!("wall_{}_brick_{}_{}", wall, row, column);
                let object = ObjectSpec::new(name, offset)
                    .with_base(spec.base.as_str())
                    .with_mass(spec.mass);
                bricks.push(objects.add(scene, items, object)?);
            }
        }

        log::debug!("Built {:?} wall #{} with {} bricks", spec.shape, wall, bricks.len());
        self.built.push(bricks);
        Ok(self.built[wall].as_slice())
    }

    /// Number of walls built
    pub fn len(&self) -> usize {
        self.built.len()
    }

    /// True before any wall is built
    pub fn is_empty(&self) -> bool {
        self.built.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsWorld;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn spec(shape: WallShape) -> WallSpec {
        WallSpec {
            shape,
            position: Vec3::new(0.0, 0.0, 0.0),
            width_count: 5,
            height_count: 4,
            offset_width: Vec3::new(0.0, 1.05, 0.0),
            offset_height: Vec3::new(0.0, 0.0, 0.45),
            base: "brickBase".into(),
            mass: 0.5,
        }
    }

    #[test]
    fn test_brick_rows_alternate() {
        let mut scene = SceneGraph::new();
        let physics = Rc::new(RefCell::new(PhysicsWorld::new()));
        let mut objects = Objects::new(&mut scene, Rc::clone(&physics));
        let mut walls = Walls::new();
        let items = LoadedItems::default();

        let bricks =
            walls.add(&mut scene, &mut objects, &items, &spec(WallShape::Brick)).unwrap().len();
        assert_eq!(bricks, 5 + 4 + 5 + 4);

        let bricks =
            walls.add(&mut scene, &mut objects, &items, &spec(WallShape::Rectangle)).unwrap().len();
        assert_eq!(bricks, 20);
        assert_eq!(walls.len(), 2);
        assert_eq!(physics.borrow().body_count(), 38);
    }
}

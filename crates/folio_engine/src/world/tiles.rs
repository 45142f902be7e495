//! Stepping-stone tiles laid along paths between sections

use crate::assets::LoadedItems;
use crate::foundation::math::{Vec2, Vec3};
use crate::scene::{SceneError, SceneGraph};
use crate::world::objects::{ObjectSpec, Objects};

/// Tile models, cycled along a path
pub const TILE_BASES: &[&str] =
    &["tilesABase", "tilesBBase", "tilesCBase", "tilesDBase", "tilesEBase"];

/// Tile layout settings and the paths laid so far
#[derive(Debug, Clone, PartialEq)]
pub struct Tiles {
    interval: f32,
    paths: Vec<TilePath>,
}

/// One laid path
#[derive(Debug, Clone, PartialEq)]
pub struct TilePath {
    /// First tile position
    pub start: Vec2,
    /// Offset from first to last tile
    pub delta: Vec2,
    /// Object indices of the tiles
    pub objects: Vec<usize>,
}

impl Tiles {
    /// Tiles spaced 0.8 apart
    pub fn new() -> Self {
        Self {
            interval: 0.8,
            paths: Vec::new(),
        }
    }

    /// Lay tiles from `start` along `delta`, returns the number of tiles
    pub fn add(
        &mut self,
        scene: &mut SceneGraph,
        objects: &mut Objects,
        items: &LoadedItems,
        start: Vec2,
        delta: Vec2,
    ) -> Result<usize, SceneError> {
        let count = (delta.norm() / self.interval).floor() as usize + 1;
        let path_index = self.paths.len();
        let step = if count > 1 { delta / (count - 1) as f32 } else { Vec2::zeros() };

        let mut indices = Vec::with_capacity(count);
        for i in 0..count {
            let position = start + step * i as f32;
            let name = format!("tile_{}_{}", path_index, i);
            let spec = ObjectSpec::new(name, Vec3::new(position.x, position.y, 0.0))
                .with_base(TILE_BASES[i % TILE_BASES.len()]);
            indices.push(objects.add(scene, items, spec)?);
        }

        log::debug!("Laid {} tiles from {:?}", count, start);
        self.paths.push(TilePath { start, delta, objects: indices });
        Ok(count)
    }

    /// Paths laid so far
    pub fn paths(&self) -> &[TilePath] {
        &self.paths
    }
}

impl Default for Tiles {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsWorld;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_tile_count_follows_length() {
        let mut scene = SceneGraph::new();
        let mut objects = Objects::new(&mut scene, Rc::new(RefCell::new(PhysicsWorld::new())));
        let mut tiles = Tiles::new();
        let items = LoadedItems::default();

        let count = tiles
            .add(&mut scene, &mut objects, &items, Vec2::new(0.0, -4.5), Vec2::new(0.0, -4.2))
            .unwrap();
        assert_eq!(count, 6);
        assert_eq!(objects.items().len(), 6);

        let single =
            tiles.add(&mut scene, &mut objects, &items, Vec2::zeros(), Vec2::zeros()).unwrap();
        assert_eq!(single, 1);
        assert_eq!(tiles.paths().len(), 2);
    }
}

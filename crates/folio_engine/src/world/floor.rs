//! Floor

use crate::scene::{NodeId, SceneGraph};

/// Linear RGB color
pub type Color = [f32; 3];

/// Ground plane with a four-corner color gradient
#[derive(Debug, Clone, PartialEq)]
pub struct Floor {
    container: NodeId,
    /// Corner colors: top left, top right, bottom right, bottom left
    pub colors: [Color; 4],
}

impl Floor {
    /// Create the floor under a detached container
    pub fn new(scene: &mut SceneGraph) -> Self {
        Self {
            container: scene.create("floor"),
            colors: [
                hex(0xf5_88_3c),
                hex(0xff_93_00),
                hex(0xfc_cf_92),
                hex(0xfb_ad_5c),
            ],
        }
    }

    /// Container node
    pub fn container(&self) -> NodeId {
        self.container
    }
}

fn hex(rgb: u32) -> Color {
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_channels() {
        assert_eq!(hex(0xff_00_00), [1.0, 0.0, 0.0]);
        let floor = Floor::new(&mut SceneGraph::new());
        assert!(floor.colors.iter().flatten().all(|c| (0.0..=1.0).contains(c)));
    }
}

//! Math utilities and types
//!
//! Thin aliases over nalgebra for the handful of vector types the world needs.
//! The rendering and physics engines own the heavy math.

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type (ground plane coordinates)
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Axis-aligned rectangle on the ground plane, described by its center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Center of the rectangle
    pub center: Vec2,
    /// Half the width and height
    pub half_extents: Vec2,
}

impl Rect {
    /// Create a rectangle from its center and half extents
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self { center, half_extents }
    }

    /// Check if a ground-plane point lies inside (edges included)
    pub fn contains(&self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extents.x
            && (point.y - self.center.y).abs() <= self.half_extents.y
    }
}

/// Math utility functions
pub mod utils {
    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

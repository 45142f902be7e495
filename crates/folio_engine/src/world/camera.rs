//! Camera rig
//!
//! Follows a target on the ground plane. Panning (dragging the view away
//! from the car) stays disabled until shortly after the world starts.

use crate::foundation::math::{utils::lerp, Vec3};
use crate::foundation::sizes::Viewport;

/// Follow camera state
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    target: Vec3,
    pan_enabled: bool,
    aspect: f32,
    easing: f32,
}

impl Camera {
    /// Camera looking at the origin
    pub fn new(viewport: Viewport) -> Self {
        Self {
            target: Vec3::zeros(),
            pan_enabled: false,
            aspect: viewport.aspect(),
            easing: 0.15,
        }
    }

    /// Allow panning
    pub fn enable_pan(&mut self) {
        if !self.pan_enabled {
            log::debug!("Camera pan enabled");
        }
        self.pan_enabled = true;
    }

    /// True once panning is allowed
    pub fn is_pan_enabled(&self) -> bool {
        self.pan_enabled
    }

    /// Ease the target towards `position`
    pub fn follow(&mut self, position: Vec3) {
        self.target = Vec3::new(
            lerp(self.target.x, position.x, self.easing),
            lerp(self.target.y, position.y, self.easing),
            lerp(self.target.z, position.z, self.easing),
        );
    }

    /// Current look-at target
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Track a viewport resize
    pub fn resize(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    /// Viewport aspect ratio
    pub fn aspect(&self) -> f32 {
        self.aspect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_follow_converges() {
        let mut camera = Camera::new(Viewport { width: 1280, height: 720 });
        for _ in 0..200 {
            camera.follow(Vec3::new(10.0, -5.0, 0.0));
        }
        assert_relative_eq!(camera.target(), Vec3::new(10.0, -5.0, 0.0), epsilon = 1e-3);

        camera.resize(Viewport { width: 500, height: 500 });
        assert_relative_eq!(camera.aspect(), 1.0);
    }
}

//! World to screen projection shared by every backend.
//!
//! Points are projected one at a time to pixel coordinates plus view depth;
//! the beam sampler uses the depth for near-plane culling and fog.

use crate::constants::{FOCAL_SCALE, FOV_DEGREES, NEAR_DEPTH};
use glam::Vec3;

/// Drawing surface size in backing-store pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
        }
    }

    /// Focal length in pixels for the fixed 60 degree field of view.
    #[inline]
    pub fn focal_px(&self) -> f32 {
        let half_fov = FOV_DEGREES.to_radians() * 0.5;
        FOCAL_SCALE * (self.width * 0.5) / half_fov.tan()
    }
}

/// Projected point: pixel coordinates plus view depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Orthonormal camera frame.
#[derive(Clone, Copy, Debug)]
pub struct ViewBasis {
    pub eye: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl ViewBasis {
    pub fn look_at(eye: Vec3, target: Vec3) -> Self {
        let forward = (target - eye).try_normalize().unwrap_or(Vec3::NEG_Z);
        // Looking straight up or down leaves the world-up cross product empty.
        let right = forward
            .cross(Vec3::Y)
            .try_normalize()
            .unwrap_or(Vec3::X);
        let up = right.cross(forward);
        Self {
            eye,
            forward,
            right,
            up,
        }
    }

    #[inline]
    pub fn depth_of(&self, point: Vec3) -> f32 {
        (point - self.eye).dot(self.forward)
    }

    /// Project `point`; `None` when it lies on or behind the near plane.
    pub fn project(&self, point: Vec3, viewport: Viewport) -> Option<ScreenPoint> {
        let rel = point - self.eye;
        let depth = rel.dot(self.forward);
        if depth <= NEAR_DEPTH {
            return None;
        }
        let f = viewport.focal_px();
        Some(ScreenPoint {
            x: rel.dot(self.right) * f / depth + viewport.width * 0.5,
            y: -rel.dot(self.up) * f / depth + viewport.height * 0.5,
            depth,
        })
    }

    /// Pixel size of a world-space length at `depth`.
    #[inline]
    pub fn pixels_at(&self, world: f32, depth: f32, viewport: Viewport) -> f32 {
        world * viewport.focal_px() / depth.max(NEAR_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_lands_at_screen_centre() {
        let vp = Viewport::new(800, 600);
        let basis = ViewBasis::look_at(Vec3::new(0.0, 2.0, 60.0), Vec3::new(0.0, 2.0, 0.0));
        let p = basis.project(Vec3::new(0.0, 2.0, 0.0), vp).unwrap();
        assert!((p.x - 400.0).abs() < 1e-3);
        assert!((p.y - 300.0).abs() < 1e-3);
        assert!((p.depth - 60.0).abs() < 1e-4);
    }

    #[test]
    fn behind_camera_is_culled() {
        let vp = Viewport::new(800, 600);
        let basis = ViewBasis::look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(basis.project(Vec3::new(0.0, 0.0, 5.0), vp).is_none());
        assert!(basis.project(Vec3::new(0.0, 0.0, -0.05), vp).is_none());
    }

    #[test]
    fn vertical_look_has_finite_basis() {
        let basis = ViewBasis::look_at(Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0));
        assert!(basis.right.is_finite());
        assert!(basis.up.is_finite());
    }
}

//! The fixed camera choreography: ground approach, spiral ascent, convergence.

use crate::constants::*;
use crate::view::ViewBasis;
use glam::Vec3;

/// Camera placement for one progress value. The camera always looks at the
/// tree axis (`x = z = 0`) at height `look_y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_y: f32,
}

impl CameraPose {
    #[inline]
    pub fn target(&self) -> Vec3 {
        Vec3::new(0.0, self.look_y, 0.0)
    }
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Clone, Copy, Debug)]
pub struct CameraPath {
    tree_height: f32,
}

impl CameraPath {
    pub fn new(tree_height: f32) -> Self {
        Self { tree_height }
    }

    /// Apex star position for this tree.
    pub fn apex(&self) -> Vec3 {
        Vec3::new(0.0, self.tree_height + 1.0, 0.0)
    }

    /// Pure mapping from progress to pose; `progress` is clamped to [0, 1].
    pub fn pose_at(&self, progress: f32) -> CameraPose {
        let p = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        if p < APPROACH_END {
            let t = p / APPROACH_END;
            return CameraPose {
                position: Vec3::new(
                    0.0,
                    APPROACH_HEIGHT,
                    APPROACH_Z_START + (APPROACH_Z_END - APPROACH_Z_START) * t,
                ),
                look_y: APPROACH_LOOK_Y,
            };
        }
        if p < CONVERGE_START {
            let t = (p - APPROACH_END) / (CONVERGE_START - APPROACH_END);
            let position = self.spiral(t);
            return CameraPose {
                position,
                look_y: position.y + SPIRAL_LOOK_ABOVE,
            };
        }
        let t = (p - CONVERGE_START) / (1.0 - CONVERGE_START);
        let from = self.spiral(1.0);
        let to = self.apex() + Vec3::new(0.0, 0.0, CONVERGE_STANDOFF_Z);
        CameraPose {
            position: from.lerp(to, smoothstep(0.0, 1.0, t)),
            look_y: self.apex().y,
        }
    }

    /// Pose slightly ahead on the path; seeds the beam trail.
    pub fn lead_pose(&self, progress: f32) -> CameraPose {
        self.pose_at((progress + LEAD_OFFSET).min(1.0))
    }

    /// Next world-space point for the beam trail.
    ///
    /// Prefers the path-ahead sample so the trail bends with the flight. When
    /// that sample sits behind the camera (the spiral turns sharply near the
    /// top) a point held in front of the lens is used instead, swaying slowly
    /// with `now_ms`.
    pub fn lead_point(&self, progress: f32, eye: Vec3, target: Vec3, now_ms: f64) -> Vec3 {
        let basis = ViewBasis::look_at(eye, target);
        let ahead = self.lead_pose(progress).position;
        if basis.depth_of(ahead) > NEAR_DEPTH {
            return ahead;
        }
        let sway = (now_ms * 0.0016).sin() as f32 * 0.9;
        eye + basis.forward * 26.0 + basis.right * (3.2 + sway) - basis.up * 1.1
    }

    // t in [0, 1] over the spiral segment. Starts at angle pi/2 so the first
    // sample coincides with the end of the approach at (0, 2, 15).
    fn spiral(&self, t: f32) -> Vec3 {
        let angle = std::f32::consts::FRAC_PI_2 + t * std::f32::consts::TAU * SPIRAL_TURNS;
        let radius = SPIRAL_RADIUS_START + (SPIRAL_RADIUS_END - SPIRAL_RADIUS_START) * t;
        let y = APPROACH_HEIGHT + t * (self.tree_height - APPROACH_HEIGHT);
        Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
    }
}

impl Default for CameraPath {
    fn default() -> Self {
        Self::new(TREE_HEIGHT)
    }
}

/// `CameraPath::default().pose_at(progress)`.
pub fn pose_at(progress: f32) -> CameraPose {
    CameraPath::default().pose_at(progress)
}

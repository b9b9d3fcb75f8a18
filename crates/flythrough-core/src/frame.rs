//! One display frame: audio step, phase step, camera, then draw.

use crate::audio::{AudioSync, SignalSource};
use crate::backend::{FrameStyle, RenderBackend};
use crate::beam::BeamRenderer;
use crate::config::SceneConfig;
use crate::constants::*;
use crate::error::Result;
use crate::path::CameraPath;
use crate::phase::{Phase, PhaseController, TimelineInput};
use crate::scene::{draw_star, NeedleCone, OrnamentRing, SnowField};
use crate::view::ViewBasis;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub phase: Phase,
    pub progress: f32,
    pub beat: bool,
    pub particles: usize,
    pub eye: Vec3,
    pub target: Vec3,
}

/// Camera actually used for drawing. Follows the path until the zoom-out,
/// then relaxes toward the resting overhead pose.
#[derive(Clone, Copy, Debug)]
struct CameraRig {
    eye: Vec3,
    target: Vec3,
}

pub struct AnimationContext {
    config: SceneConfig,
    path: CameraPath,
    phases: PhaseController,
    primary: BeamRenderer,
    secondary: BeamRenderer,
    needles: NeedleCone,
    snow: SnowField,
    ornaments: OrnamentRing,
    rig: CameraRig,
    last_ms: Option<f64>,
}

impl AnimationContext {
    pub fn new(config: SceneConfig) -> Self {
        let path = CameraPath::new(config.tree_height);
        let start = path.pose_at(0.0);
        Self {
            primary: BeamRenderer::new(config.primary.clone(), config.trail_len),
            // Holds exactly [primary head, apex] while the star beam is shown.
            secondary: BeamRenderer::new(config.secondary.clone(), 2),
            needles: NeedleCone::new(
                config.needle_count,
                config.tree_height,
                config.tree_radius,
                config.seed.wrapping_add(1),
            ),
            snow: SnowField::new(config.snow_count, config.seed.wrapping_add(2)),
            ornaments: OrnamentRing::new(
                config.ornament_count,
                config.tree_height,
                config.tree_radius,
                config.seed,
            ),
            phases: PhaseController::new(),
            rig: CameraRig {
                eye: start.position,
                target: start.target(),
            },
            last_ms: None,
            path,
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phases.phase()
    }

    pub fn progress(&self) -> f32 {
        self.phases.progress()
    }

    pub fn path(&self) -> &CameraPath {
        &self.path
    }

    pub fn primary_beam(&self) -> &BeamRenderer {
        &self.primary
    }

    pub fn secondary_beam(&self) -> &BeamRenderer {
        &self.secondary
    }

    pub fn frame(
        &mut self,
        audio: &mut AudioSync,
        src: &mut dyn SignalSource,
        backend: &mut dyn RenderBackend,
        now_ms: f64,
    ) -> Result<FrameReport> {
        let dt_sec = match self.last_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT_SEC),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);

        let beat_before = audio.state().last_beat_ms;
        audio.update(src, now_ms);
        let beat = audio.state().last_beat_ms != beat_before;

        let snap = self.phases.advance(TimelineInput {
            time_norm: audio.time_norm(),
            dt_sec,
            speed_mul: audio.speed_mul(),
            now_ms,
        });

        if snap.phase == Phase::ZoomingOut {
            self.rig.eye = self.rig.eye.lerp(rest_eye(), snap.zoom_lerp);
            self.rig.target = self.rig.target.lerp(rest_target(), snap.zoom_lerp);
        } else {
            let pose = self.path.pose_at(snap.progress);
            self.rig.eye = pose.position;
            self.rig.target = pose.target();
        }
        let view = ViewBasis::look_at(self.rig.eye, self.rig.target);

        if snap.phase == Phase::Traveling {
            let lead = self
                .path
                .lead_point(snap.progress, self.rig.eye, self.rig.target, now_ms);
            self.primary.push(lead);
        }
        if snap.effects.ornaments_animate {
            self.ornaments.step(dt_sec);
        }
        self.snow.step(dt_sec, now_ms);

        backend.begin_frame(&FrameStyle {
            clear: self.config.clear_rgb,
            glow_gain: snap.effects.bloom_strength / BLOOM_BASE,
        });
        self.snow.draw(backend, &view);
        self.needles.draw(backend, &view);
        self.ornaments.draw(backend, &view);

        let mut particles = 0;
        if snap.effects.beam_visible {
            let pulse = audio.beam_pulse();
            particles += self.primary.draw(backend, &view, pulse, now_ms);
            let apex = self.path.apex();
            if snap.progress > SECONDARY_TRAIL_PROGRESS && backend.project(&view, apex).is_some() {
                if let Some(head) = self.primary.trail().head() {
                    self.secondary.push(head);
                    self.secondary.push(apex);
                    particles += self.secondary.draw(backend, &view, pulse, now_ms);
                }
            }
        }
        draw_star(backend, &view, self.path.apex(), &snap.effects);
        backend.end_frame()?;

        Ok(FrameReport {
            phase: snap.phase,
            progress: snap.progress,
            beat,
            particles,
            eye: self.rig.eye,
            target: self.rig.target,
        })
    }
}

impl Default for AnimationContext {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

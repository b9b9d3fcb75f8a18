//! The seam between the choreography and whatever draws pixels.

use crate::error::Result;
use crate::path::smoothstep;
use crate::view::{ScreenPoint, ViewBasis, Viewport};
use glam::Vec3;

/// Screen-space glow sprite. Layout matches the GPU instance buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Sprite {
    pub center: [f32; 2],
    pub radius: f32,
    pub _pad: f32,
    /// Linear RGB plus alpha; blended additively as `rgb * a * falloff`.
    pub rgba: [f32; 4],
}

impl Sprite {
    #[inline]
    pub fn new(x: f32, y: f32, radius: f32, rgba: [f32; 4]) -> Self {
        Self {
            center: [x, y],
            radius,
            _pad: 0.0,
            rgba,
        }
    }
}

/// Whole-frame parameters set before any sprite is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStyle {
    pub clear: [f32; 3],
    /// Multiplier on every sprite's contribution; 1.0 at baseline bloom.
    pub glow_gain: f32,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            clear: [0.0, 0.0, 0.0],
            glow_gain: 1.0,
        }
    }
}

/// Radial falloff shared with `sprite.wgsl`; `d` is distance over sprite diameter.
#[inline]
pub fn glow_falloff(d: f32) -> f32 {
    let soft = 1.0 - smoothstep(0.0, 0.5, d);
    let core = 1.0 - smoothstep(0.0, 0.18, d);
    0.65 * soft + 0.35 * core
}

/// Approximate a stroke by evenly spaced round sprites.
pub fn stroke_sprites(points: &[[f32; 2]], width: f32, rgba: [f32; 4]) -> Vec<Sprite> {
    let mut out = Vec::new();
    if points.len() < 2 || width <= 0.0 {
        return out;
    }
    let radius = width * 0.5;
    let step = radius.max(0.5);
    let mut carry = 0.0f32;
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dx = b[0] - a[0];
        let dy = b[1] - a[1];
        let len = (dx * dx + dy * dy).sqrt();
        if len <= 0.001 {
            continue;
        }
        let mut s = carry;
        while s < len {
            let t = s / len;
            out.push(Sprite::new(a[0] + dx * t, a[1] + dy * t, radius, rgba));
            s += step;
        }
        carry = s - len;
    }
    out
}

pub trait RenderBackend {
    fn viewport(&self) -> Viewport;

    fn begin_frame(&mut self, style: &FrameStyle);

    /// Additively composite a batch of sprites.
    fn draw_sprites(&mut self, sprites: &[Sprite]);

    fn draw_line(&mut self, points: &[[f32; 2]], width: f32, rgba: [f32; 4]) {
        let sprites = stroke_sprites(points, width, rgba);
        if !sprites.is_empty() {
            self.draw_sprites(&sprites);
        }
    }

    fn project(&self, view: &ViewBasis, point: Vec3) -> Option<ScreenPoint> {
        view.project(point, self.viewport())
    }

    fn end_frame(&mut self) -> Result<()>;
}

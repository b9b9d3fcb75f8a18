//! Curve-following particle beam.
//!
//! A beam is a world-space trail projected every frame, smoothed into a
//! screen-space curve and then sampled by arc length into glow sprites. All
//! randomness comes from `hash01` seeded by particle index and frame time, so
//! a given (trail, camera, time) always produces the same sprites on every
//! backend.

use crate::backend::{RenderBackend, Sprite};
use crate::config::BeamStyle;
use crate::constants::{BEAM_RGB, RIBBON_RGBA};
use crate::view::{ScreenPoint, ViewBasis};
use glam::Vec3;
use std::collections::VecDeque;

const MIN_PARTICLES: usize = 34;
const PX_PER_PARTICLE: f32 = 10.0;
const MIN_SEGMENT_PX: f32 = 0.001;
const CURVE_SUBDIVISIONS: usize = 4;

/// Deterministic pseudo-random value in [0, 1).
#[inline]
pub fn hash01(n: f64) -> f32 {
    let x = n.sin() * 43758.5453123;
    (x - x.floor()) as f32
}

/// Bounded FIFO of world-space points; the newest point is the beam head.
#[derive(Clone, Debug)]
pub struct TrailBuffer {
    points: VecDeque<Vec3>,
    capacity: usize,
}

impl TrailBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, point: Vec3) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn head(&self) -> Option<Vec3> {
        self.points.back().copied()
    }

    pub fn tail(&self) -> Option<Vec3> {
        self.points.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.points.iter()
    }
}

/// Quadratic smoothing through segment midpoints, tessellated.
///
/// The first and last raw points are kept; each interior point becomes the
/// control point of a curve between neighbouring midpoints. Depth is carried
/// through the same interpolation.
pub fn smooth_curve(points: &[ScreenPoint]) -> Vec<ScreenPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() * CURVE_SUBDIVISIONS + 2);
    out.push(points[0]);
    let mut start = points[0];
    for i in 1..points.len() - 1 {
        let ctrl = points[i];
        let next = points[i + 1];
        let end = ScreenPoint {
            x: (ctrl.x + next.x) * 0.5,
            y: (ctrl.y + next.y) * 0.5,
            depth: (ctrl.depth + next.depth) * 0.5,
        };
        for s in 1..=CURVE_SUBDIVISIONS {
            let t = s as f32 / CURVE_SUBDIVISIONS as f32;
            let a = (1.0 - t) * (1.0 - t);
            let b = 2.0 * (1.0 - t) * t;
            let c = t * t;
            out.push(ScreenPoint {
                x: a * start.x + b * ctrl.x + c * end.x,
                y: a * start.y + b * ctrl.y + c * end.y,
                depth: a * start.depth + b * ctrl.depth + c * end.depth,
            });
        }
        start = end;
    }
    out.push(points[points.len() - 1]);
    out
}

struct Segment {
    a: ScreenPoint,
    b: ScreenPoint,
    len: f32,
}

/// Number of particles for a curve of `length` pixels.
#[inline]
pub fn particle_count(length: f32, max_particles: usize) -> usize {
    let by_length = (length / PX_PER_PARTICLE).floor().max(0.0) as usize;
    by_length.max(MIN_PARTICLES).min(max_particles)
}

/// Sample glow sprites along a projected curve. Returns the number appended.
pub fn sample_beam(
    curve: &[ScreenPoint],
    style: &BeamStyle,
    pulse: f32,
    time_ms: f64,
    out: &mut Vec<Sprite>,
) -> usize {
    if curve.len() < 2 {
        return 0;
    }
    let mut segs = Vec::with_capacity(curve.len() - 1);
    let mut total = 0.0f32;
    for pair in curve.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = (b.x - a.x).hypot(b.y - a.y);
        if len > MIN_SEGMENT_PX {
            segs.push(Segment { a, b, len });
            total += len;
        }
    }
    if segs.is_empty() || total <= MIN_SEGMENT_PX {
        return 0;
    }

    let count = particle_count(total, style.max_particles);
    let pulse_gain = 0.95 + 0.65 * pulse;
    for i in 0..count {
        let u = i as f32 / (count.max(2) - 1) as f32;
        let seed = i as f64 * 37.13 + time_ms * 0.001;
        let jitter = (hash01(seed) - 0.5) * (1.0 / count as f32) * 12.0;
        let uu = (u + jitter).clamp(0.0, 1.0);

        let mut d = uu * total;
        let mut seg = &segs[segs.len() - 1];
        for s in &segs {
            if d <= s.len {
                seg = s;
                break;
            }
            d -= s.len;
        }
        let t = (d / seg.len).clamp(0.0, 1.0);
        let dx = seg.b.x - seg.a.x;
        let dy = seg.b.y - seg.a.y;
        let x = seg.a.x + dx * t;
        let y = seg.a.y + dy * t;

        let inv = 1.0 / seg.len.max(MIN_SEGMENT_PX);
        let (nx, ny) = (-dy * inv, dx * inv);
        let swirl = (hash01(seed + 91.7) - 0.5) * 1.15;
        let spread = style.spread_px * (0.06 + 0.26 * uu.powf(1.15));
        let off = swirl * spread;

        let depth = (seg.a.depth + seg.b.depth) * 0.5;
        let fog = ((depth - 10.0) / 120.0).clamp(0.0, 1.0);
        let sparkle = 0.75 + 0.75 * hash01(seed + 51.3);
        let alpha = ((0.046 + 0.44 * uu.powf(1.55)) * sparkle * pulse_gain * (1.0 - fog * 0.62))
            .min(0.85);
        let radius =
            style.size_px * (0.56 + 1.10 * uu.powf(1.05)) * (0.92 + 0.28 * hash01(seed + 19.2));

        let w = 0.2 + 0.15 * uu;
        let rgb = [
            BEAM_RGB[0] + (1.0 - BEAM_RGB[0]) * w,
            BEAM_RGB[1] + (1.0 - BEAM_RGB[1]) * w,
            BEAM_RGB[2] + (1.0 - BEAM_RGB[2]) * w,
        ];
        out.push(Sprite::new(
            x + nx * off,
            y + ny * off,
            radius,
            [rgb[0], rgb[1], rgb[2], alpha],
        ));
    }
    count
}

pub struct BeamRenderer {
    style: BeamStyle,
    trail: TrailBuffer,
    sprites: Vec<Sprite>,
}

impl BeamRenderer {
    pub fn new(style: BeamStyle, trail_len: usize) -> Self {
        Self {
            sprites: Vec::with_capacity(style.max_particles),
            style,
            trail: TrailBuffer::new(trail_len),
        }
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn push(&mut self, point: Vec3) {
        self.trail.push(point);
    }

    /// Draw the owned trail. Returns the number of particles emitted.
    pub fn draw(
        &mut self,
        backend: &mut dyn RenderBackend,
        view: &ViewBasis,
        pulse: f32,
        time_ms: f64,
    ) -> usize {
        let points: Vec<Vec3> = self.trail.iter().copied().collect();
        self.draw_points(&points, backend, view, pulse, time_ms)
    }

    fn draw_points(
        &mut self,
        points: &[Vec3],
        backend: &mut dyn RenderBackend,
        view: &ViewBasis,
        pulse: f32,
        time_ms: f64,
    ) -> usize {
        if points.len() < 2 {
            return 0;
        }
        let projected: Vec<ScreenPoint> = points
            .iter()
            .filter_map(|p| backend.project(view, *p))
            .collect();
        if projected.len() < 2 {
            return 0;
        }
        let curve = smooth_curve(&projected);
        if self.style.ribbon {
            let line: Vec<[f32; 2]> = curve.iter().map(|p| [p.x, p.y]).collect();
            backend.draw_line(&line, self.style.spread_px * 0.5, RIBBON_RGBA);
        }
        self.sprites.clear();
        let n = sample_beam(
            &curve,
            &self.style,
            pulse,
            time_ms + self.style.time_offset_ms,
            &mut self.sprites,
        );
        if n > 0 {
            backend.draw_sprites(&self.sprites);
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_unit_interval() {
        for i in 0..500 {
            let h = hash01(i as f64 * 1.37 - 40.0);
            assert!((0.0..1.0).contains(&h));
        }
    }

    #[test]
    fn particle_count_is_bounded() {
        assert_eq!(particle_count(0.5, 92), 34);
        assert_eq!(particle_count(500.0, 92), 50);
        assert_eq!(particle_count(5000.0, 92), 92);
    }

    #[test]
    fn smoothing_keeps_endpoints() {
        let pts = [
            ScreenPoint { x: 0.0, y: 0.0, depth: 10.0 },
            ScreenPoint { x: 10.0, y: 5.0, depth: 12.0 },
            ScreenPoint { x: 20.0, y: 0.0, depth: 14.0 },
        ];
        let c = smooth_curve(&pts);
        assert_eq!(c.first(), pts.first());
        assert_eq!(c.last(), pts.last());
        assert!(c.len() > pts.len());
    }

    #[test]
    fn trail_drops_oldest() {
        let mut t = TrailBuffer::new(2);
        t.push(Vec3::X);
        t.push(Vec3::Y);
        t.push(Vec3::Z);
        assert_eq!(t.len(), 2);
        assert_eq!(t.tail(), Some(Vec3::Y));
        assert_eq!(t.head(), Some(Vec3::Z));
    }
}

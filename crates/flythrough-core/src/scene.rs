//! Everything drawn around the beams: falling snow, the needle cone, the
//! ornament ring and the apex star.

use crate::backend::{RenderBackend, Sprite};
use crate::constants::STAR_RADIUS;
use crate::phase::PhaseEffects;
use crate::view::ViewBasis;
use glam::Vec3;
use rand::prelude::*;

const ORNAMENT_RGB: [f32; 3] = [0.85, 0.93, 1.0];
const STAR_HUE: f32 = 0.16;
const NEEDLE_TIP_RGB: [f32; 3] = [0.533, 0.8, 1.0];
const NEEDLE_LAYERS: usize = 12;
const NEEDLE_DOTS: usize = 3;
const SNOW_RGB: [f32; 3] = [0.9, 0.95, 1.0];
const SNOW_SPAN: f32 = 110.0;
const SNOW_CEILING: f32 = 70.0;

/// HSL to RGB, all components in [0, 1].
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |mut t: f32| {
        t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    [
        channel(h + 1.0 / 3.0),
        channel(h),
        channel(h - 1.0 / 3.0),
    ]
}

/// Big decorative flake riding the cone surface.
#[derive(Clone, Debug)]
pub struct Ornament {
    pub base_angle: f32,
    pub base_y: f32,
    /// Orbit speed in radians per second; sign picks the direction.
    pub orbit: f32,
    pub phase: f32,
    pub bob: f32,
    pub out: f32,
    /// World-space width.
    pub size: f32,
}

pub struct OrnamentRing {
    ornaments: Vec<Ornament>,
    tree_height: f32,
    tree_radius: f32,
    time_s: f32,
}

impl OrnamentRing {
    pub fn new(count: usize, tree_height: f32, tree_radius: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let ornaments = (0..count)
            .map(|i| {
                let t = (i as f32 + 0.5) / count as f32;
                let dir = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
                Ornament {
                    base_angle: (i as f32 / count as f32) * std::f32::consts::TAU
                        + (rng.gen::<f32>() - 0.5) * 0.18,
                    base_y: 4.0 + t * (tree_height - 6.0),
                    orbit: dir * rng.gen_range(0.10..0.20),
                    phase: rng.gen_range(0.0..std::f32::consts::TAU),
                    bob: rng.gen_range(0.35..0.60),
                    out: rng.gen_range(0.30..0.50),
                    size: rng.gen_range(4.2..6.6),
                }
            })
            .collect();
        Self {
            ornaments,
            tree_height,
            tree_radius,
            time_s: 0.0,
        }
    }

    pub fn ornaments(&self) -> &[Ornament] {
        &self.ornaments
    }

    /// Advance the orbit clock; called only while ornaments animate.
    pub fn step(&mut self, dt_sec: f32) {
        self.time_s += dt_sec.max(0.0);
    }

    /// Cone radius at height `y`, with the same +1 skirt as the needle layers.
    pub fn surface_radius(&self, y: f32) -> f32 {
        let t = (y / self.tree_height.max(1e-6)).clamp(0.0, 1.0);
        self.tree_radius * (1.0 - t) + 1.0
    }

    pub fn positions(&self) -> impl Iterator<Item = (Vec3, &Ornament)> + '_ {
        self.ornaments.iter().map(move |o| {
            let ang = o.base_angle + self.time_s * o.orbit;
            let y = o.base_y + (self.time_s * 0.9 + o.phase).sin() * o.bob;
            let r = self.surface_radius(y) + o.out;
            (Vec3::new(ang.cos() * r, y, ang.sin() * r), o)
        })
    }

    pub fn draw(&self, backend: &mut dyn RenderBackend, view: &ViewBasis) -> usize {
        let vp = backend.viewport();
        let mut sprites = Vec::with_capacity(self.ornaments.len());
        for (world, o) in self.positions() {
            let Some(sp) = backend.project(view, world) else {
                continue;
            };
            let fog = ((sp.depth - 10.0) / 120.0).clamp(0.0, 1.0);
            let alpha = 0.65 * (1.0 - fog * 0.75);
            if alpha <= 0.03 {
                continue;
            }
            let radius = view.pixels_at(o.size * 0.5, sp.depth, vp);
            sprites.push(Sprite::new(
                sp.x,
                sp.y,
                radius,
                [ORNAMENT_RGB[0], ORNAMENT_RGB[1], ORNAMENT_RGB[2], alpha * 0.35],
            ));
        }
        if !sprites.is_empty() {
            backend.draw_sprites(&sprites);
        }
        sprites.len()
    }
}

/// Short bright stroke pointing up and out of the cone.
#[derive(Clone, Copy, Debug)]
pub struct Needle {
    pub base: Vec3,
    pub tip: Vec3,
    pub rgb: [f32; 3],
}

/// The tree itself: needles scattered through stacked cone layers.
pub struct NeedleCone {
    needles: Vec<Needle>,
    sprites: Vec<Sprite>,
}

impl NeedleCone {
    pub fn new(count: usize, tree_height: f32, tree_radius: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let per_layer = count / NEEDLE_LAYERS;
        let mut needles = Vec::with_capacity(per_layer * NEEDLE_LAYERS);
        for layer in 0..NEEDLE_LAYERS {
            let t = layer as f32 / NEEDLE_LAYERS as f32;
            let layer_y = t * tree_height;
            let layer_radius = tree_radius * (1.0 - t) + 1.0;
            for _ in 0..per_layer {
                let angle = rng.gen::<f32>() * std::f32::consts::TAU;
                let r = rng.gen::<f32>().sqrt() * layer_radius;
                let y = layer_y + (rng.gen::<f32>() - 0.5) * 3.0;
                let base = Vec3::new(angle.cos() * r, y, angle.sin() * r);
                let tip = base + Vec3::new(base.x * 0.22, 1.0, base.z * 0.22);
                let mix = rng.gen::<f32>();
                let rgb = [
                    1.0 + (NEEDLE_TIP_RGB[0] - 1.0) * mix,
                    1.0 + (NEEDLE_TIP_RGB[1] - 1.0) * mix,
                    1.0 + (NEEDLE_TIP_RGB[2] - 1.0) * mix,
                ];
                needles.push(Needle { base, tip, rgb });
            }
        }
        Self {
            sprites: Vec::with_capacity(needles.len() * NEEDLE_DOTS),
            needles,
        }
    }

    pub fn needles(&self) -> &[Needle] {
        &self.needles
    }

    /// Each visible needle becomes a few small sprites along its projected stroke.
    pub fn draw(&mut self, backend: &mut dyn RenderBackend, view: &ViewBasis) -> usize {
        self.sprites.clear();
        let mut drawn = 0;
        for n in &self.needles {
            let Some(a) = backend.project(view, n.base) else {
                continue;
            };
            let Some(b) = backend.project(view, n.tip) else {
                continue;
            };
            let fog = ((a.depth - 12.0) / 110.0).clamp(0.0, 1.0);
            let alpha = 0.55 * (1.0 - fog * 0.75);
            if alpha <= 0.02 {
                continue;
            }
            let len = (b.x - a.x).hypot(b.y - a.y);
            let radius = (len / (2.0 * NEEDLE_DOTS as f32)).clamp(0.75, 3.0);
            for i in 0..NEEDLE_DOTS {
                let t = i as f32 / (NEEDLE_DOTS - 1) as f32;
                self.sprites.push(Sprite::new(
                    a.x + (b.x - a.x) * t,
                    a.y + (b.y - a.y) * t,
                    radius,
                    [n.rgb[0], n.rgb[1], n.rgb[2], alpha * 0.3],
                ));
            }
            drawn += 1;
        }
        if !self.sprites.is_empty() {
            backend.draw_sprites(&self.sprites);
        }
        drawn
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Flake {
    pub position: Vec3,
    /// Fall speed in world units per second.
    pub fall: f32,
    pub size: f32,
    pub alpha: f32,
}

/// Snow falling through a box around the tree; flakes that reach the ground
/// respawn at the ceiling.
pub struct SnowField {
    flakes: Vec<Flake>,
    rng: StdRng,
    sprites: Vec<Sprite>,
}

impl SnowField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let flakes = (0..count)
            .map(|_| {
                let (x, z) = Self::scatter(&mut rng);
                Flake {
                    position: Vec3::new(x, rng.gen::<f32>() * SNOW_CEILING, z),
                    fall: rng.gen_range(2.0..7.0),
                    size: rng.gen_range(0.35..1.2),
                    alpha: rng.gen_range(0.35..0.9),
                }
            })
            .collect();
        Self {
            sprites: Vec::with_capacity(count),
            flakes,
            rng,
        }
    }

    fn scatter(rng: &mut StdRng) -> (f32, f32) {
        (
            (rng.gen::<f32>() - 0.5) * SNOW_SPAN,
            (rng.gen::<f32>() - 0.5) * SNOW_SPAN,
        )
    }

    pub fn flakes(&self) -> &[Flake] {
        &self.flakes
    }

    pub fn step(&mut self, dt_sec: f32, now_ms: f64) {
        let dt = dt_sec.max(0.0);
        let drift_phase = (now_ms * 0.0005) as f32;
        for f in &mut self.flakes {
            f.position.y -= f.fall * dt;
            f.position.x += (drift_phase + f.position.z).sin() * dt * 0.3;
            if f.position.y < 0.0 {
                let (x, z) = Self::scatter(&mut self.rng);
                f.position = Vec3::new(x, SNOW_CEILING, z);
            }
        }
    }

    pub fn draw(&mut self, backend: &mut dyn RenderBackend, view: &ViewBasis) -> usize {
        let vp = backend.viewport();
        self.sprites.clear();
        for f in &self.flakes {
            let Some(sp) = backend.project(view, f.position) else {
                continue;
            };
            let fog = ((sp.depth - 10.0) / 120.0).clamp(0.0, 1.0);
            let alpha = f.alpha * (1.0 - fog * 0.65);
            // Flakes closer than this stop growing.
            let radius = view.pixels_at(0.3 * f.size, sp.depth.max(16.8), vp);
            self.sprites.push(Sprite::new(
                sp.x,
                sp.y,
                radius,
                [SNOW_RGB[0], SNOW_RGB[1], SNOW_RGB[2], alpha * 0.45],
            ));
        }
        if !self.sprites.is_empty() {
            backend.draw_sprites(&self.sprites);
        }
        self.sprites.len()
    }
}

/// Draw the apex star as a core plus a glow halo sized by the light level.
pub fn draw_star(
    backend: &mut dyn RenderBackend,
    view: &ViewBasis,
    apex: Vec3,
    fx: &PhaseEffects,
) -> bool {
    let vp = backend.viewport();
    let Some(sp) = backend.project(view, apex) else {
        return false;
    };
    let rgb = hsl_to_rgb(STAR_HUE, 1.0, fx.star_lightness.clamp(0.0, 1.0));
    let core = view.pixels_at(STAR_RADIUS * 2.0 * fx.star_scale, sp.depth, vp);
    let halo_alpha = (0.10 + 0.12 * fx.star_glow).min(1.0);
    backend.draw_sprites(&[
        Sprite::new(
            sp.x,
            sp.y,
            core * (2.0 + fx.star_glow * 0.5),
            [rgb[0], rgb[1], rgb[2], halo_alpha],
        ),
        Sprite::new(sp.x, sp.y, core, [rgb[0], rgb[1], rgb[2], 0.95]),
    ]);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FrameStyle;
    use crate::raster::SoftwareBackend;

    #[test]
    fn hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-5 && red[1].abs() < 1e-5 && red[2].abs() < 1e-5);
        let white = hsl_to_rgb(0.16, 1.0, 1.0);
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-5));
    }

    #[test]
    fn ring_is_seeded() {
        let a = OrnamentRing::new(10, 40.0, 15.0, 7);
        let b = OrnamentRing::new(10, 40.0, 15.0, 7);
        for (x, y) in a.ornaments().iter().zip(b.ornaments()) {
            assert_eq!(x.base_angle, y.base_angle);
            assert_eq!(x.size, y.size);
        }
    }

    #[test]
    fn needles_stay_inside_their_layers() {
        let cone = NeedleCone::new(1200, 40.0, 15.0, 3);
        assert_eq!(cone.needles().len(), 1200);
        for n in cone.needles() {
            let r = (n.base.x * n.base.x + n.base.z * n.base.z).sqrt();
            assert!(r <= 16.0 + 1e-4);
            assert!(n.base.y >= -1.5 && n.base.y <= 40.0 + 1.5);
            assert!(n.tip.y > n.base.y);
        }
    }

    #[test]
    fn cone_is_visible_on_approach() {
        let eye = Vec3::new(0.0, 2.0, 60.0);
        let view = ViewBasis::look_at(eye, Vec3::new(0.0, 6.0, 0.0));
        let mut cone = NeedleCone::new(600, 40.0, 15.0, 3);
        let mut backend = SoftwareBackend::new(320, 180);
        backend.begin_frame(&FrameStyle::default());
        let drawn = cone.draw(&mut backend, &view);
        assert!(drawn > 300);
        assert_eq!(backend.sprites_drawn(), drawn * NEEDLE_DOTS);
    }

    #[test]
    fn snow_falls_and_respawns_at_the_ceiling() {
        let mut snow = SnowField::new(200, 9);
        let before: Vec<f32> = snow.flakes().iter().map(|f| f.position.y).collect();
        snow.step(0.05, 0.0);
        for (f, y0) in snow.flakes().iter().zip(&before) {
            if f.position.y < SNOW_CEILING {
                assert!(f.position.y < *y0);
            }
        }
        for i in 0..2000 {
            snow.step(0.05, i as f64 * 50.0);
        }
        for f in snow.flakes() {
            assert!((0.0..=SNOW_CEILING).contains(&f.position.y));
            assert!(f.position.x.abs() < SNOW_SPAN);
        }
    }

    #[test]
    fn ornaments_hug_the_cone() {
        let ring = OrnamentRing::new(10, 40.0, 15.0, 1);
        for (p, o) in ring.positions() {
            let r = (p.x * p.x + p.z * p.z).sqrt();
            let expected = ring.surface_radius(p.y) + o.out;
            assert!((r - expected).abs() < 1e-3);
        }
    }
}

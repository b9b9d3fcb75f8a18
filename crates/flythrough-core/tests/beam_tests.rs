// Host-side tests for beam sampling and the software rasterizer.

mod common;

use common::RecordingBackend;
use flythrough_core::{
    sample_beam, smooth_curve, BeamRenderer, BeamStyle, FrameStyle, RenderBackend,
    ScreenPoint, SoftwareBackend, Sprite, ViewBasis,
};
use glam::Vec3;

fn straight_trail(n: usize) -> Vec<Vec3> {
    (0..n)
        .map(|i| Vec3::new(-10.0 + i as f32 * 0.5, 0.0, 0.0))
        .collect()
}

fn camera() -> ViewBasis {
    ViewBasis::look_at(Vec3::new(0.0, 0.0, 40.0), Vec3::ZERO)
}

#[test]
fn single_point_draws_nothing() {
    let mut beam = BeamRenderer::new(BeamStyle::primary(), 140);
    let mut backend = RecordingBackend::new(800, 600);
    beam.push(Vec3::ZERO);
    backend.begin_frame(&FrameStyle::default());
    assert_eq!(beam.draw(&mut backend, &camera(), 1.0, 0.0), 0);
    assert!(backend.sprites.is_empty());
}

#[test]
fn count_is_between_floor_and_cap() {
    let style = BeamStyle::primary();
    let mut beam = BeamRenderer::new(style.clone(), 140);
    for p in straight_trail(40) {
        beam.push(p);
    }
    let mut backend = RecordingBackend::new(800, 600);
    backend.begin_frame(&FrameStyle::default());
    let n = beam.draw(&mut backend, &camera(), 1.0, 1234.0);
    assert!(n >= 34 && n <= style.max_particles);
}

#[test]
fn trail_behind_camera_is_culled() {
    let mut beam = BeamRenderer::new(BeamStyle::primary(), 140);
    for p in straight_trail(10) {
        beam.push(p + Vec3::new(0.0, 0.0, 80.0));
    }
    let mut backend = RecordingBackend::new(800, 600);
    backend.begin_frame(&FrameStyle::default());
    assert_eq!(beam.draw(&mut backend, &camera(), 1.0, 0.0), 0);
}

#[test]
fn sampling_is_deterministic_for_same_time() {
    let curve: Vec<ScreenPoint> = (0..30)
        .map(|i| ScreenPoint {
            x: 100.0 + i as f32 * 20.0,
            y: 300.0 + (i as f32 * 0.3).sin() * 40.0,
            depth: 30.0,
        })
        .collect();
    let style = BeamStyle::primary();
    let mut a = Vec::new();
    let mut b = Vec::new();
    sample_beam(&curve, &style, 1.2, 5000.0, &mut a);
    sample_beam(&curve, &style, 1.2, 5000.0, &mut b);
    assert_eq!(a, b);
    let mut c = Vec::new();
    sample_beam(&curve, &style, 1.2, 5016.0, &mut c);
    assert_ne!(a, c);
}

#[test]
fn head_is_larger_and_brighter_than_tail() {
    let curve = vec![
        ScreenPoint { x: 0.0, y: 100.0, depth: 20.0 },
        ScreenPoint { x: 1000.0, y: 100.0, depth: 20.0 },
    ];
    let style = BeamStyle::primary();
    let mut sprites: Vec<Sprite> = Vec::new();
    let n = sample_beam(&curve, &style, 1.0, 0.0, &mut sprites);
    assert_eq!(n, 92);
    let tail: f32 = sprites[..10].iter().map(|s| s.radius).sum();
    let head: f32 = sprites[n - 10..].iter().map(|s| s.radius).sum();
    assert!(head > tail * 1.5);
    assert!(sprites.iter().all(|s| s.rgba[3] <= 0.85 && s.rgba[3] > 0.0));
}

#[test]
fn distant_particles_fade() {
    let near = vec![
        ScreenPoint { x: 0.0, y: 0.0, depth: 10.0 },
        ScreenPoint { x: 400.0, y: 0.0, depth: 10.0 },
    ];
    let far: Vec<ScreenPoint> = near
        .iter()
        .map(|p| ScreenPoint { depth: 130.0, ..*p })
        .collect();
    let style = BeamStyle::primary();
    let (mut a, mut b) = (Vec::new(), Vec::new());
    sample_beam(&near, &style, 0.0, 0.0, &mut a);
    sample_beam(&far, &style, 0.0, 0.0, &mut b);
    for (n, f) in a.iter().zip(&b) {
        assert!(f.rgba[3] < n.rgba[3] || n.rgba[3] >= 0.85);
    }
}

#[test]
fn degenerate_curve_is_skipped() {
    let p = ScreenPoint { x: 5.0, y: 5.0, depth: 20.0 };
    let mut out = Vec::new();
    assert_eq!(sample_beam(&[p, p, p], &BeamStyle::primary(), 1.0, 0.0, &mut out), 0);
    assert_eq!(smooth_curve(&[p]).len(), 1);
}

#[test]
fn software_matches_recorded_sprites() {
    let mut beam_a = BeamRenderer::new(BeamStyle::primary(), 140);
    let mut beam_b = BeamRenderer::new(BeamStyle::primary(), 140);
    for p in straight_trail(30) {
        beam_a.push(p);
        beam_b.push(p);
    }
    let mut rec = RecordingBackend::new(320, 240);
    let mut soft = SoftwareBackend::new(320, 240);
    let style = FrameStyle::default();
    rec.begin_frame(&style);
    soft.begin_frame(&style);
    let na = beam_a.draw(&mut rec, &camera(), 1.0, 777.0);
    let nb = beam_b.draw(&mut soft, &camera(), 1.0, 777.0);
    assert_eq!(na, nb);
    assert_eq!(soft.sprites_drawn(), rec.sprites.len());
}

#[test]
fn splats_only_add_light() {
    let mut soft = SoftwareBackend::new(64, 64);
    soft.begin_frame(&FrameStyle {
        clear: [0.1, 0.1, 0.1],
        glow_gain: 1.0,
    });
    let before: Vec<[f32; 3]> = (0..64)
        .flat_map(|y| (0..64).map(move |x| (x, y)))
        .map(|(x, y)| soft.framebuffer().pixel(x, y))
        .collect();
    soft.draw_sprites(&[
        Sprite::new(32.0, 32.0, 10.0, [0.6, 0.8, 1.0, 0.5]),
        Sprite::new(40.0, 30.0, 6.0, [1.0, 1.0, 1.0, 0.9]),
    ]);
    soft.end_frame().unwrap();
    let mut brighter = 0;
    for (i, b) in before.iter().enumerate() {
        let a = soft.framebuffer().pixel((i % 64) as u32, (i / 64) as u32);
        for c in 0..3 {
            assert!(a[c] >= b[c]);
        }
        if a[0] > b[0] {
            brighter += 1;
        }
    }
    assert!(brighter > 0);
    assert_eq!(soft.rgba8().len(), 64 * 64 * 4);
}

#[test]
fn glow_gain_scales_contribution() {
    let sprite = Sprite::new(8.0, 8.0, 4.0, [1.0, 1.0, 1.0, 0.2]);
    let mut a = SoftwareBackend::new(16, 16);
    let mut b = SoftwareBackend::new(16, 16);
    a.begin_frame(&FrameStyle::default());
    b.begin_frame(&FrameStyle {
        clear: [0.0; 3],
        glow_gain: 2.0,
    });
    a.draw_sprites(&[sprite]);
    b.draw_sprites(&[sprite]);
    let pa = a.framebuffer().pixel(8, 8)[0];
    let pb = b.framebuffer().pixel(8, 8)[0];
    assert!((pb - 2.0 * pa).abs() < 1e-5);
}

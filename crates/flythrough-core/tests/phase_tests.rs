// Host-side tests for the phase state machine and its timeline mapping.

use flythrough_core::{
    timeline_phase, Phase, PhaseController, TimelineInput, BLOOM_BASE, BLOOM_FLASH,
    CONVERGE_START, TRAVEL_END,
};

fn timeline(t: f32, now_ms: f64) -> TimelineInput {
    TimelineInput {
        time_norm: Some(t),
        dt_sec: 1.0 / 60.0,
        speed_mul: 1.0,
        now_ms,
    }
}

fn fallback(now_ms: f64, speed_mul: f32) -> TimelineInput {
    TimelineInput {
        time_norm: None,
        dt_sec: 1.0 / 60.0,
        speed_mul,
        now_ms,
    }
}

#[test]
fn timeline_examples() {
    let (p, prog) = timeline_phase(0.5);
    assert_eq!(p, Phase::Traveling);
    assert!((prog - 0.595).abs() < 1e-3);

    let (p, prog) = timeline_phase(0.88);
    assert_eq!(p, Phase::Flashing);
    assert_eq!(prog, 1.0);

    let (p, prog) = timeline_phase(0.96);
    assert_eq!(p, Phase::ZoomingOut);
    assert!((prog - 0.85).abs() < 1e-4);

    let (_, end) = timeline_phase(1.0);
    assert!((end - 0.7).abs() < 1e-6);
}

#[test]
fn boundaries_belong_to_the_later_phase() {
    assert_eq!(timeline_phase(TRAVEL_END).0, Phase::Flashing);
    assert_eq!(timeline_phase(CONVERGE_START).0, Phase::ZoomingOut);
}

#[test]
fn zoomed_out_never_returns() {
    let mut pc = PhaseController::new();
    pc.advance(timeline(0.97, 0.0));
    assert_eq!(pc.phase(), Phase::ZoomingOut);
    for (i, t) in [0.1, 0.5, 0.85, 0.0].iter().enumerate() {
        let snap = pc.advance(timeline(*t, 16.0 * (i + 1) as f64));
        assert_eq!(snap.phase, Phase::ZoomingOut);
    }
}

#[test]
fn flashing_does_not_reenter_traveling_on_seek_back() {
    let mut pc = PhaseController::new();
    pc.advance(timeline(0.86, 0.0));
    let snap = pc.advance(timeline(0.3, 16.0));
    assert_eq!(snap.phase, Phase::Flashing);
    assert_eq!(snap.progress, 1.0);
}

#[test]
fn fallback_travel_rate_scales_with_speed() {
    let mut slow = PhaseController::new();
    let mut fast = PhaseController::new();
    for i in 0..60 {
        slow.advance(fallback(i as f64 * 16.0, 0.9));
        fast.advance(fallback(i as f64 * 16.0, 1.7));
    }
    assert!(fast.progress() > slow.progress());
    assert!((slow.progress() - 60.0 * 0.00055 * 0.9).abs() < 1e-4);
}

#[test]
fn fallback_runs_whole_choreography() {
    let mut pc = PhaseController::new();
    let mut now = 0.0;
    let mut seen = vec![Phase::Traveling];
    for _ in 0..20_000 {
        now += 1000.0 / 60.0;
        let snap = pc.advance(fallback(now, 1.4));
        if *seen.last().unwrap() != snap.phase {
            seen.push(snap.phase);
        }
        if snap.phase == Phase::ZoomingOut {
            break;
        }
    }
    assert_eq!(
        seen,
        vec![Phase::Traveling, Phase::Flashing, Phase::ZoomingOut]
    );
}

#[test]
fn flash_exit_waits_for_hold() {
    let mut pc = PhaseController::new();
    let mut now = 0.0;
    while pc.phase() == Phase::Traveling {
        now += 16.0;
        pc.advance(fallback(now, 2.0));
    }
    while pc.pending().is_none() {
        now += 16.0;
        pc.advance(fallback(now, 1.0));
    }
    let fire_at = pc.pending().unwrap().fire_at_ms;
    assert!((fire_at - now - 1000.0).abs() < 1e-9);
    pc.advance(fallback(fire_at - 1.0, 1.0));
    assert_eq!(pc.phase(), Phase::Flashing);
    pc.advance(fallback(fire_at + 1.0, 1.0));
    assert_eq!(pc.phase(), Phase::ZoomingOut);
}

#[test]
fn known_duration_discards_scheduled_exit() {
    let mut pc = PhaseController::new();
    let mut now = 0.0;
    while pc.pending().is_none() {
        now += 16.0;
        pc.advance(fallback(now, 3.0));
        assert!(now < 1.0e6);
    }
    let snap = pc.advance(timeline(0.86, now + 16.0));
    assert!(pc.pending().is_none());
    assert_eq!(snap.phase, Phase::Flashing);
    // Well past the old deadline, the timeline still says Flashing.
    let snap = pc.advance(timeline(0.87, now + 5000.0));
    assert_eq!(snap.phase, Phase::Flashing);
}

#[test]
fn fallback_zoom_retreats_to_floor() {
    let mut pc = PhaseController::new();
    pc.advance(timeline(0.93, 0.0));
    let mut now = 0.0;
    let mut last = pc.progress();
    for _ in 0..3000 {
        now += 50.0;
        let snap = pc.advance(TimelineInput {
            time_norm: None,
            dt_sec: 0.05,
            speed_mul: 1.0,
            now_ms: now,
        });
        assert!(snap.progress <= last);
        assert!(snap.progress >= 0.7);
        assert!((snap.zoom_lerp - 0.01).abs() < 1e-6);
        last = snap.progress;
    }
    assert!((last - 0.7).abs() < 1e-6);
}

#[test]
fn effects_follow_phase() {
    let mut pc = PhaseController::new();
    let travel = pc.advance(timeline(0.2, 0.0));
    assert!(travel.effects.beam_visible);
    assert_eq!(travel.effects.bloom_strength, BLOOM_BASE);
    assert_eq!(travel.zoom_lerp, 0.0);

    let flash = pc.advance(timeline(0.85, 16.0));
    assert!(!flash.effects.beam_visible);
    assert_eq!(flash.effects.bloom_strength, BLOOM_FLASH);
    assert!(flash.effects.star_glow > 0.0);
    assert!((0.5..=1.0).contains(&flash.effects.star_lightness));

    let mut zoom = pc.advance(timeline(0.93, 32.0));
    for i in 0..200 {
        zoom = pc.advance(timeline(0.94, 48.0 + i as f64 * 16.0));
    }
    assert!((zoom.effects.bloom_strength - BLOOM_BASE).abs() < 1e-3);
    assert!(zoom.effects.star_glow < 0.01);
    assert!(zoom.zoom_lerp > 0.02);
}

// Host-side tests for the camera path and projection.

use flythrough_core::{
    pose_at, CameraPath, ViewBasis, Viewport, APPROACH_END, CONVERGE_START, TREE_HEIGHT,
};
use glam::Vec3;

#[test]
fn endpoints_are_deterministic_and_order_independent() {
    let a0 = pose_at(0.0);
    let a1 = pose_at(1.0);
    let _ = pose_at(0.5);
    let _ = pose_at(0.93);
    assert_eq!(pose_at(1.0), a1);
    assert_eq!(pose_at(0.0), a0);
}

#[test]
fn approach_starts_far_and_low() {
    let p = pose_at(0.0);
    assert_eq!(p.position, Vec3::new(0.0, 2.0, 60.0));
    assert_eq!(p.look_y, 6.0);
    let mid = pose_at(APPROACH_END * 0.5);
    assert!((mid.position.z - 37.5).abs() < 1e-4);
}

#[test]
fn spiral_narrows_and_climbs() {
    let path = CameraPath::default();
    let mut last_y = f32::MIN;
    let mut last_r = f32::MAX;
    let steps = 200;
    for i in 0..steps {
        let p = APPROACH_END + (CONVERGE_START - APPROACH_END) * i as f32 / steps as f32;
        let pose = path.pose_at(p);
        let r = (pose.position.x.powi(2) + pose.position.z.powi(2)).sqrt();
        assert!(pose.position.y >= last_y);
        assert!(r <= last_r + 1e-4);
        assert!((pose.look_y - (pose.position.y + 2.0)).abs() < 1e-5);
        last_y = pose.position.y;
        last_r = r;
    }
    assert!((last_r - 5.0).abs() < 0.1);
}

#[test]
fn spiral_makes_three_turns() {
    let path = CameraPath::default();
    let mut crossings = 0;
    let mut prev = path.pose_at(APPROACH_END).position;
    let steps = 3000;
    for i in 1..=steps {
        let p = APPROACH_END + (CONVERGE_START - APPROACH_END) * i as f32 / steps as f32 - 1e-6;
        let cur = path.pose_at(p).position;
        // count passes through the -z half-axis
        if prev.x < 0.0 && cur.x >= 0.0 && cur.z < 0.0 {
            crossings += 1;
        }
        prev = cur;
    }
    assert_eq!(crossings, 3);
}

#[test]
fn convergence_ends_in_front_of_star() {
    let path = CameraPath::default();
    let end = path.pose_at(1.0);
    let star = path.apex();
    assert_eq!(star, Vec3::new(0.0, TREE_HEIGHT + 1.0, 0.0));
    assert!(end.position.distance(star) < 4.0);
    assert_eq!(end.look_y, star.y);
    let basis = ViewBasis::look_at(end.position, end.target());
    let sp = basis.project(star, Viewport::new(1280, 720)).unwrap();
    assert!((sp.x - 640.0).abs() < 1.0);
}

#[test]
fn out_of_range_progress_is_clamped() {
    assert_eq!(pose_at(-3.0), pose_at(0.0));
    assert_eq!(pose_at(7.0), pose_at(1.0));
}

#[test]
fn lead_point_prefers_path_ahead() {
    let path = CameraPath::default();
    let pose = path.pose_at(0.05);
    let lead = path.lead_point(0.05, pose.position, pose.target(), 0.0);
    assert_eq!(lead, path.lead_pose(0.05).position);
}

#[test]
fn lead_point_falls_back_in_front_of_camera() {
    let path = CameraPath::default();
    // Looking away from the path makes the ahead sample land behind the lens.
    let eye = path.pose_at(0.05).position;
    let away = eye + Vec3::new(0.0, 0.0, 10.0);
    let lead = path.lead_point(0.05, eye, away, 0.0);
    let basis = ViewBasis::look_at(eye, away);
    assert!(basis.depth_of(lead) > 25.0);
    assert_ne!(lead, path.lead_pose(0.05).position);
}

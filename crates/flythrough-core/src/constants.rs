use glam::Vec3;

// Shared choreography and tuning constants used by both web and native frontends.

// Audio analysis
pub const WAVEFORM_FRAME_LEN: usize = 1024; // analyser window (fftSize)
pub const ANALYSER_SMOOTHING: f32 = 0.65; // WebAudio smoothingTimeConstant
pub const ENERGY_HISTORY_LEN: usize = 60; // roughly one second of frames
pub const MIN_RUNNING_AVERAGE: f32 = 1e-6;
pub const ENERGY_RATIO_GAIN: f32 = 1.6;
pub const ENERGY_SMOOTHING: f32 = 0.85; // EMA weight kept from the previous frame
pub const SILENCE_DECAY: f32 = 0.92; // per-frame decay while not analysing
pub const BEAT_THRESHOLD: f32 = 0.38;
pub const BEAT_REFRACTORY_MS: f64 = 260.0;
pub const BEAT_PULSE_DECAY: f32 = 0.08; // per frame

// Timeline
pub const TRAVEL_END: f32 = 0.84; // normalized playback time where Flashing begins
pub const CONVERGE_START: f32 = 0.92; // both the path convergence and Flashing end
pub const FALLBACK_TRAVEL_RATE: f32 = 0.000_55; // progress per 60 Hz frame
pub const MAX_FRAME_DT_SEC: f32 = 0.05;
pub const ZOOM_MIN_PROGRESS: f32 = 0.7;
pub const ZOOM_PROGRESS_SPAN: f32 = 0.30;
pub const FALLBACK_ZOOM_RETREAT_PER_SEC: f32 = 0.02;
pub const FALLBACK_ZOOM_EASE: f32 = 0.01; // per frame
pub const FLASH_HOLD_MS: f64 = 1000.0; // glow plateau before zooming out

// Star and bloom
pub const BLOOM_BASE: f32 = 1.5;
pub const BLOOM_FLASH: f32 = 3.0;
pub const STAR_GLOW_PEAK: f32 = 5.0;
pub const STAR_GLOW_TRIGGER: f32 = 4.0; // glow level that arms the zoom-out
pub const STAR_GLOW_LERP: f32 = 0.1;
pub const FADE_LERP: f32 = 0.05; // bloom and glow relaxation while zooming out

// Scene layout
pub const TREE_HEIGHT: f32 = 40.0;
pub const TREE_RADIUS: f32 = 15.0;
pub const STAR_RADIUS: f32 = 1.5; // world units

// Camera path
pub const APPROACH_END: f32 = 0.18;
pub const APPROACH_Z_START: f32 = 60.0;
pub const APPROACH_Z_END: f32 = 15.0;
pub const APPROACH_HEIGHT: f32 = 2.0;
pub const APPROACH_LOOK_Y: f32 = 6.0;
pub const SPIRAL_TURNS: f32 = 3.0;
pub const SPIRAL_RADIUS_START: f32 = 15.0;
pub const SPIRAL_RADIUS_END: f32 = 5.0;
pub const SPIRAL_LOOK_ABOVE: f32 = 2.0;
pub const CONVERGE_STANDOFF_Z: f32 = 3.0; // final distance in front of the star
pub const LEAD_OFFSET: f32 = 0.02; // path-ahead sample that seeds the trail

// Resting overhead pose used by the zoom-out
pub const REST_EYE: [f32; 3] = [0.0, 30.0, 80.0];
pub const REST_TARGET: [f32; 3] = [0.0, 20.0, 0.0];

// Projection
pub const FOV_DEGREES: f32 = 60.0;
pub const FOCAL_SCALE: f32 = 0.9;
pub const NEAR_DEPTH: f32 = 0.1;

// Trails
pub const PRIMARY_TRAIL_LEN: usize = 140;
pub const SECONDARY_TRAIL_PROGRESS: f32 = 0.94;
pub const SECONDARY_TIME_OFFSET_MS: f64 = 77.0;

// Beam colour
pub const BEAM_RGB: [f32; 3] = [0.667, 0.867, 1.0]; // #aaddff
pub const RIBBON_RGBA: [f32; 4] = [0.549, 0.784, 1.0, 0.032];

// Scenery
pub const ORNAMENT_COUNT: usize = 10;
pub const ORNAMENT_SEED: u64 = 42;
pub const NEEDLE_COUNT: usize = 1800;
pub const SNOW_COUNT: usize = 900;

// Background, night blue in linear light
pub const CLEAR_RGB: [f32; 3] = [0.0, 0.0032, 0.011];

#[inline]
pub fn rest_eye() -> Vec3 {
    Vec3::from(REST_EYE)
}

#[inline]
pub fn rest_target() -> Vec3 {
    Vec3::from(REST_TARGET)
}

/// World-space position of the apex star.
#[inline]
pub fn star_position() -> Vec3 {
    Vec3::new(0.0, TREE_HEIGHT + 1.0, 0.0)
}

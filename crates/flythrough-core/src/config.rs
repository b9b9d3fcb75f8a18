use crate::constants::*;

/// Look of one particle beam.
#[derive(Clone, Debug, PartialEq)]
pub struct BeamStyle {
    /// Base sprite radius in pixels before the head/tail taper.
    pub size_px: f32,
    /// Maximum perpendicular scatter in pixels.
    pub spread_px: f32,
    pub max_particles: usize,
    /// Added to the frame clock before seeding so two beams never shimmer in lockstep.
    pub time_offset_ms: f64,
    /// Stroke a faint continuous ribbon under the particles.
    pub ribbon: bool,
}

impl BeamStyle {
    pub fn primary() -> Self {
        Self {
            size_px: 16.2,
            spread_px: 46.0,
            max_particles: 92,
            time_offset_ms: 0.0,
            ribbon: true,
        }
    }

    pub fn secondary() -> Self {
        Self {
            size_px: 10.0,
            spread_px: 32.0,
            max_particles: 72,
            time_offset_ms: SECONDARY_TIME_OFFSET_MS,
            ribbon: false,
        }
    }
}

impl Default for BeamStyle {
    fn default() -> Self {
        Self::primary()
    }
}

/// Tunables for one flythrough run.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub tree_height: f32,
    pub tree_radius: f32,
    pub trail_len: usize,
    pub primary: BeamStyle,
    pub secondary: BeamStyle,
    pub ornament_count: usize,
    pub needle_count: usize,
    pub snow_count: usize,
    /// Seeds the ornaments; needles and snow use their own offsets from it.
    pub seed: u64,
    pub clear_rgb: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tree_height: TREE_HEIGHT,
            tree_radius: TREE_RADIUS,
            trail_len: PRIMARY_TRAIL_LEN,
            primary: BeamStyle::primary(),
            secondary: BeamStyle::secondary(),
            ornament_count: ORNAMENT_COUNT,
            needle_count: NEEDLE_COUNT,
            snow_count: SNOW_COUNT,
            seed: ORNAMENT_SEED,
            clear_rgb: CLEAR_RGB,
        }
    }
}

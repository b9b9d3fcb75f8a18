//! Traveling -> Flashing -> ZoomingOut.
//!
//! With a known track duration the phase is a pure function of normalized
//! playback time. Before that, a wall-clock fallback advances progress at a
//! beat-modulated rate and uses a scheduled transition for the end of the
//! flash. Either way the controller never moves backwards.

use crate::constants::*;
use crate::path::smoothstep;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Traveling,
    Flashing,
    ZoomingOut,
}

/// Map normalized playback time to its phase and path progress.
pub fn timeline_phase(t: f32) -> (Phase, f32) {
    let t = t.clamp(0.0, 1.0);
    if t < TRAVEL_END {
        (Phase::Traveling, (t / TRAVEL_END).clamp(0.0, 1.0))
    } else if t < CONVERGE_START {
        (Phase::Flashing, 1.0)
    } else {
        (Phase::ZoomingOut, zoom_progress(zoom_fraction(t)))
    }
}

#[inline]
fn zoom_fraction(t: f32) -> f32 {
    ((t - CONVERGE_START) / (1.0 - CONVERGE_START).max(1e-6)).clamp(0.0, 1.0)
}

#[inline]
fn zoom_progress(tz: f32) -> f32 {
    (1.0 - tz * ZOOM_PROGRESS_SPAN).max(ZOOM_MIN_PROGRESS)
}

/// One-shot deferred transition, checked against the frame clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledTransition {
    pub to: Phase,
    pub fire_at_ms: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct TimelineInput {
    pub time_norm: Option<f32>,
    pub dt_sec: f32,
    pub speed_mul: f32,
    pub now_ms: f64,
}

/// Per-phase render parameters derived each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseEffects {
    pub bloom_strength: f32,
    pub star_glow: f32,
    /// HSL lightness of the star at hue 0.16, full saturation.
    pub star_lightness: f32,
    pub star_scale: f32,
    pub beam_visible: bool,
    pub ornaments_animate: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSnapshot {
    pub phase: Phase,
    pub progress: f32,
    /// Per-frame lerp factor pulling the camera toward the resting pose; 0 outside ZoomingOut.
    pub zoom_lerp: f32,
    pub effects: PhaseEffects,
    pub changed: bool,
}

pub struct PhaseController {
    phase: Phase,
    progress: f32,
    bloom: f32,
    star_glow: f32,
    pending: Option<ScheduledTransition>,
}

impl PhaseController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Traveling,
            progress: 0.0,
            bloom: BLOOM_BASE,
            star_glow: 0.0,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn pending(&self) -> Option<ScheduledTransition> {
        self.pending
    }

    pub fn advance(&mut self, input: TimelineInput) -> PhaseSnapshot {
        let before = self.phase;
        let zoom_lerp = match input.time_norm {
            Some(t) => self.follow_timeline(t),
            None => self.run_fallback(&input),
        };
        let effects = self.apply_effects(input.now_ms);
        if input.time_norm.is_none() {
            self.arm_flash_exit(input.now_ms);
        }
        let changed = self.phase != before;
        if changed {
            log::info!(
                "[phase] {:?} -> {:?} at progress {:.3}",
                before,
                self.phase,
                self.progress
            );
        }
        PhaseSnapshot {
            phase: self.phase,
            progress: self.progress,
            zoom_lerp: if self.phase == Phase::ZoomingOut {
                zoom_lerp
            } else {
                0.0
            },
            effects,
            changed,
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = self.phase.max(phase);
    }

    fn follow_timeline(&mut self, t: f32) -> f32 {
        if let Some(p) = self.pending.take() {
            log::debug!("[phase] dropping scheduled {:?}; timeline is authoritative", p.to);
        }
        let (derived, progress) = timeline_phase(t);
        self.enter(derived);
        let tz = zoom_fraction(t);
        self.progress = match self.phase {
            Phase::Traveling => progress,
            Phase::Flashing => 1.0,
            Phase::ZoomingOut => zoom_progress(tz),
        };
        0.02 + smoothstep(0.0, 1.0, tz) * 0.10
    }

    fn run_fallback(&mut self, input: &TimelineInput) -> f32 {
        match self.phase {
            Phase::Traveling => {
                self.progress +=
                    FALLBACK_TRAVEL_RATE * (input.dt_sec * 60.0) * input.speed_mul.max(0.0);
                if self.progress >= 1.0 {
                    self.progress = 1.0;
                    self.enter(Phase::Flashing);
                }
            }
            Phase::Flashing => {
                if let Some(p) = self.pending {
                    if input.now_ms >= p.fire_at_ms {
                        self.pending = None;
                        self.enter(p.to);
                    }
                }
            }
            Phase::ZoomingOut => {
                self.progress = (self.progress - input.dt_sec * FALLBACK_ZOOM_RETREAT_PER_SEC)
                    .max(ZOOM_MIN_PROGRESS);
            }
        }
        FALLBACK_ZOOM_EASE
    }

    // The glow plateau arms a single deferred exit from Flashing.
    fn arm_flash_exit(&mut self, now_ms: f64) {
        if self.phase == Phase::Flashing
            && self.pending.is_none()
            && self.star_glow > STAR_GLOW_TRIGGER
        {
            self.pending = Some(ScheduledTransition {
                to: Phase::ZoomingOut,
                fire_at_ms: now_ms + FLASH_HOLD_MS,
            });
        }
    }

    fn apply_effects(&mut self, now_ms: f64) -> PhaseEffects {
        let t_s = (now_ms / 1000.0) as f32;
        match self.phase {
            Phase::Traveling => {
                let tw = (t_s * 10.0).sin() * 0.5 + 0.5;
                self.bloom = BLOOM_BASE;
                PhaseEffects {
                    bloom_strength: self.bloom,
                    star_glow: self.star_glow,
                    star_lightness: 0.5 + 0.15 * tw,
                    star_scale: 1.0 + 0.12 * tw,
                    beam_visible: true,
                    ornaments_animate: true,
                }
            }
            Phase::Flashing => {
                let flicker = (t_s * 10.0).sin() * 0.5 + 0.5;
                self.star_glow += (STAR_GLOW_PEAK - self.star_glow) * STAR_GLOW_LERP;
                self.bloom = BLOOM_FLASH;
                PhaseEffects {
                    bloom_strength: self.bloom,
                    star_glow: self.star_glow,
                    star_lightness: 0.5 + 0.5 * flicker,
                    star_scale: 1.1 + 0.35 * flicker,
                    beam_visible: false,
                    ornaments_animate: false,
                }
            }
            Phase::ZoomingOut => {
                let tw = (t_s * 5.0).sin() * 0.5 + 0.5;
                self.bloom += (BLOOM_BASE - self.bloom) * FADE_LERP;
                self.star_glow -= self.star_glow * FADE_LERP;
                PhaseEffects {
                    bloom_strength: self.bloom,
                    star_glow: self.star_glow,
                    star_lightness: 0.5 + 0.5 * tw,
                    star_scale: 1.0 + 0.1 * tw,
                    beam_visible: false,
                    ornaments_animate: false,
                }
            }
        }
    }
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new()
    }
}

//! Beat tracking against a live playback signal.
//!
//! `AudioSync` owns all analysis state. Frontends hand it a [`SignalSource`]
//! (an `<audio>` element on the web, a decoded file on native) and call
//! [`AudioSync::update`] once per frame. Everything else reads the derived
//! modulators (`speed_mul`, `beam_pulse`, `time_norm`).

use crate::constants::*;
use crate::error::{FlightError, Result};
use std::collections::VecDeque;

/// A playable media track with a time-domain analysis tap.
pub trait SignalSource {
    /// Build the analysis tap. Called at most once, from a user gesture.
    fn attach_analyser(&mut self) -> Result<()>;
    /// Resume the analysis context if the platform suspended it.
    fn resume_analyser(&mut self) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Playback position in seconds.
    fn current_time(&self) -> f64;
    /// Raw media duration in seconds. May be NaN, infinite or zero while unknown.
    fn duration(&self) -> f64;
    /// Fill `out` with normalized samples in [-1, 1]; returns how many were written.
    fn read_waveform(&mut self, out: &mut [f32]) -> usize;
}

/// A source that never plays; drives the wall-clock fallback timeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSignal;

impl SignalSource for NoSignal {
    fn attach_analyser(&mut self) -> Result<()> {
        Err(FlightError::UnsupportedSignalProcessing(
            "no audio track loaded".into(),
        ))
    }
    fn resume_analyser(&mut self) -> Result<()> {
        Ok(())
    }
    fn play(&mut self) -> Result<()> {
        Err(FlightError::AutoplayBlocked("no audio track loaded".into()))
    }
    fn pause(&mut self) {}
    fn is_paused(&self) -> bool {
        true
    }
    fn current_time(&self) -> f64 {
        0.0
    }
    fn duration(&self) -> f64 {
        f64::NAN
    }
    fn read_waveform(&mut self, _out: &mut [f32]) -> usize {
        0
    }
}

/// Result of toggling playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    Playing,
    Paused,
}

/// Outcome of the passive autoplay attempt at load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutoplayOutcome {
    pub ok: bool,
    pub reason: Option<String>,
}

/// Bounded FIFO of instantaneous energies.
#[derive(Clone, Debug)]
pub struct EnergyHistory {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl EnergyHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, energy: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(energy);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn oldest(&self) -> Option<f32> {
        self.samples.front().copied()
    }

    /// Mean of the window, never below `MIN_RUNNING_AVERAGE`.
    pub fn average(&self) -> f32 {
        if self.samples.is_empty() {
            return MIN_RUNNING_AVERAGE;
        }
        let sum: f32 = self.samples.iter().sum();
        (sum / self.samples.len() as f32).max(MIN_RUNNING_AVERAGE)
    }
}

impl Default for EnergyHistory {
    fn default() -> Self {
        Self::new(ENERGY_HISTORY_LEN)
    }
}

#[derive(Clone, Debug)]
pub struct AudioState {
    pub started: bool,
    pub ready: bool,
    pub duration_known: bool,
    pub duration: f64,
    pub playback_time: f64,
    pub instant_energy: f32,
    pub smoothed_energy: f32,
    pub beat_pulse: f32,
    pub last_beat_ms: f64,
    pub running_average: f32,
}

impl Default for AudioState {
    fn default() -> Self {
        Self {
            started: false,
            ready: false,
            duration_known: false,
            duration: 0.0,
            playback_time: 0.0,
            instant_energy: 0.0,
            smoothed_energy: 0.0,
            beat_pulse: 0.0,
            last_beat_ms: -1e9,
            running_average: MIN_RUNNING_AVERAGE,
        }
    }
}

pub struct AudioSync {
    state: AudioState,
    history: EnergyHistory,
    frame: Vec<f32>,
}

impl AudioSync {
    pub fn new() -> Self {
        Self {
            state: AudioState::default(),
            history: EnergyHistory::default(),
            frame: vec![0.0; WAVEFORM_FRAME_LEN],
        }
    }

    pub fn state(&self) -> &AudioState {
        &self.state
    }

    pub fn history(&self) -> &EnergyHistory {
        &self.history
    }

    /// Start or pause playback from a user gesture.
    ///
    /// The analysis tap is attached on the first call; an error there is
    /// returned untouched so the caller can offer the toggle again.
    pub fn toggle(&mut self, src: &mut dyn SignalSource) -> Result<Playback> {
        if !self.state.ready {
            src.attach_analyser()?;
            self.state.ready = true;
            log::info!("[audio] analyser attached");
        }
        src.resume_analyser()?;
        if src.is_paused() {
            src.play()?;
            self.state.started = true;
            self.probe_duration(src);
            log::info!("[audio] playing");
            Ok(Playback::Playing)
        } else {
            src.pause();
            log::info!("[audio] paused");
            Ok(Playback::Paused)
        }
    }

    /// Best-effort playback at load. Never attaches the analyser, never fails.
    pub fn try_autoplay(&mut self, src: &mut dyn SignalSource) -> AutoplayOutcome {
        let res = src.play().map_err(|e| e.to_string());
        self.finish_autoplay(src, res)
    }

    /// Bookkeeping for an autoplay attempt whose play request completed elsewhere.
    pub fn finish_autoplay(
        &mut self,
        src: &dyn SignalSource,
        result: std::result::Result<(), String>,
    ) -> AutoplayOutcome {
        match result {
            Ok(()) => {
                self.state.started = true;
                self.probe_duration(src);
                log::info!("[audio] autoplay ok");
                AutoplayOutcome {
                    ok: true,
                    reason: None,
                }
            }
            Err(reason) => {
                log::warn!("[audio] autoplay blocked: {}", reason);
                AutoplayOutcome {
                    ok: false,
                    reason: Some(reason),
                }
            }
        }
    }

    /// Per-frame step: decay, probe duration, and analyse when actually playing.
    pub fn update(&mut self, src: &mut dyn SignalSource, now_ms: f64) {
        self.state.beat_pulse = (self.state.beat_pulse - BEAT_PULSE_DECAY).max(0.0);
        self.probe_duration(src);
        self.state.playback_time = src.current_time();
        if !self.state.ready || !self.state.started || src.is_paused() {
            self.silence();
            return;
        }
        let n = src.read_waveform(&mut self.frame).min(self.frame.len());
        if n == 0 {
            self.silence();
            return;
        }
        let frame = std::mem::take(&mut self.frame);
        self.analyse(&frame[..n], now_ms);
        self.frame = frame;
    }

    /// Run the energy/beat step on one frame of samples.
    ///
    /// `update` calls this after its gating; it is public so the detector can
    /// be driven from recorded material.
    pub fn analyse_frame(&mut self, samples: &[f32], now_ms: f64) -> bool {
        if samples.is_empty() {
            self.silence();
            return false;
        }
        self.analyse(samples, now_ms)
    }

    fn analyse(&mut self, samples: &[f32], now_ms: f64) -> bool {
        let energy = samples.iter().map(|v| v * v).sum::<f32>() / samples.len() as f32;
        self.history.push(energy);
        let avg = self.history.average();
        self.state.running_average = avg;
        let ratio = energy / avg;
        let norm = ((ratio - 1.0) * ENERGY_RATIO_GAIN).clamp(0.0, 1.0);
        self.state.instant_energy = norm;
        self.state.smoothed_energy =
            self.state.smoothed_energy * ENERGY_SMOOTHING + norm * (1.0 - ENERGY_SMOOTHING);

        if norm > BEAT_THRESHOLD && now_ms - self.state.last_beat_ms > BEAT_REFRACTORY_MS {
            self.state.last_beat_ms = now_ms;
            self.state.beat_pulse = 1.0;
            log::debug!("[audio] beat at {:.0}ms energy={:.2}", now_ms, norm);
            return true;
        }
        false
    }

    fn silence(&mut self) {
        self.state.instant_energy = 0.0;
        self.state.smoothed_energy *= SILENCE_DECAY;
    }

    fn probe_duration(&mut self, src: &dyn SignalSource) {
        if self.state.duration_known {
            return;
        }
        let d = src.duration();
        if d.is_finite() && d > 0.0 {
            self.state.duration_known = true;
            self.state.duration = d;
            log::info!("[audio] duration {:.2}s", d);
        }
    }

    /// Travel speed multiplier for the wall-clock fallback timeline.
    pub fn speed_mul(&self) -> f32 {
        0.90 + 0.30 * self.state.smoothed_energy + 0.50 * self.state.beat_pulse
    }

    /// Beam brightness multiplier; driven mostly by beats since raw energy jitters.
    pub fn beam_pulse(&self) -> f32 {
        0.80 + 0.55 * self.state.beat_pulse + 0.15 * self.state.smoothed_energy
    }

    /// Normalized playback position, once the duration is known.
    pub fn time_norm(&self) -> Option<f32> {
        if !self.state.duration_known || self.state.duration <= 0.0 {
            return None;
        }
        Some(((self.state.playback_time / self.state.duration) as f32).clamp(0.0, 1.0))
    }
}

impl Default for AudioSync {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_floored() {
        let h = EnergyHistory::new(4);
        assert!(h.average() >= MIN_RUNNING_AVERAGE);
    }

    #[test]
    fn history_evicts_oldest() {
        let mut h = EnergyHistory::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            h.push(v);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.oldest(), Some(2.0));
        assert!((h.average() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn silent_frame_keeps_average_positive() {
        let mut sync = AudioSync::new();
        sync.analyse_frame(&[0.0; 16], 0.0);
        assert!(sync.state().running_average > 0.0);
        assert_eq!(sync.state().instant_energy, 0.0);
    }
}

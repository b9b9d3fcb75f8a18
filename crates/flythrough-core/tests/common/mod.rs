// Test doubles shared by the integration tests.

#![allow(dead_code)]

use flythrough_core::{FlightError, FrameStyle, RenderBackend, Sprite, SignalSource, Viewport};

/// Media track whose clock, duration and waveform are set by the test.
pub struct ScriptedSource {
    pub paused: bool,
    pub time: f64,
    pub duration: f64,
    pub samples: Vec<f32>,
    pub attach_fails: bool,
    pub play_fails: bool,
    pub attach_calls: usize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            paused: true,
            time: 0.0,
            duration: f64::NAN,
            samples: vec![0.0; 1024],
            attach_fails: false,
            play_fails: false,
            attach_calls: 0,
        }
    }

    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration,
            ..Self::new()
        }
    }

    /// Fill the waveform with a constant-amplitude square wave.
    pub fn set_level(&mut self, amp: f32) {
        for (i, s) in self.samples.iter_mut().enumerate() {
            *s = if i % 2 == 0 { amp } else { -amp };
        }
    }
}

impl SignalSource for ScriptedSource {
    fn attach_analyser(&mut self) -> Result<(), FlightError> {
        self.attach_calls += 1;
        if self.attach_fails {
            return Err(FlightError::UnsupportedSignalProcessing("no WebAudio".into()));
        }
        Ok(())
    }

    fn resume_analyser(&mut self) -> Result<(), FlightError> {
        Ok(())
    }

    fn play(&mut self) -> Result<(), FlightError> {
        if self.play_fails {
            return Err(FlightError::AutoplayBlocked("NotAllowedError".into()));
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn read_waveform(&mut self, out: &mut [f32]) -> usize {
        let n = out.len().min(self.samples.len());
        out[..n].copy_from_slice(&self.samples[..n]);
        n
    }
}

/// Backend that keeps every sprite of the current frame.
pub struct RecordingBackend {
    pub viewport: Viewport,
    pub style: Option<FrameStyle>,
    pub sprites: Vec<Sprite>,
    /// Sprite count of each `draw_sprites` call this frame, in order.
    pub batches: Vec<usize>,
    pub frames: usize,
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            style: None,
            sprites: Vec::new(),
            batches: Vec::new(),
            frames: 0,
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn begin_frame(&mut self, style: &FrameStyle) {
        self.style = Some(*style);
        self.sprites.clear();
        self.batches.clear();
    }

    fn draw_sprites(&mut self, sprites: &[Sprite]) {
        self.sprites.extend_from_slice(sprites);
        self.batches.push(sprites.len());
    }

    fn end_frame(&mut self) -> Result<(), FlightError> {
        self.frames += 1;
        Ok(())
    }
}

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use flythrough_core::{FlightError, SignalSource};
use std::path::Path;
use std::sync::{Arc, Mutex};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Fully decoded mono track.
pub struct DecodedTrack {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

pub fn decode_track(path: &Path) -> Result<DecodedTrack> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio format")?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .context("No audio tracks found")?;
    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track.codec_params.sample_rate.context("Unknown sample rate")?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };
        let spec = *decoded.spec();
        let mut buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        if channels == 1 {
            samples.extend_from_slice(buf.samples());
        } else {
            samples.extend(
                buf.samples()
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }
    }

    log::info!(
        "[audio] decoded {} ({:.1}s @ {}Hz)",
        path.display(),
        samples.len() as f32 / sample_rate as f32,
        sample_rate
    );
    Ok(DecodedTrack {
        samples,
        sample_rate,
    })
}

/// Playback cursor shared with the cpal callback thread.
struct Playhead {
    samples: Arc<[f32]>,
    cursor: f64,
    step: f64,
    paused: bool,
}

impl Playhead {
    fn next_sample(&mut self) -> f32 {
        if self.paused {
            return 0.0;
        }
        let i = self.cursor as usize;
        if i + 1 >= self.samples.len() {
            self.paused = true;
            self.cursor = self.samples.len() as f64;
            return 0.0;
        }
        let frac = (self.cursor - i as f64) as f32;
        let s = self.samples[i] * (1.0 - frac) + self.samples[i + 1] * frac;
        self.cursor += self.step;
        s
    }
}

/// Decoded file played through cpal, tapped for analysis at the playhead.
pub struct NativeTrack {
    shared: Arc<Mutex<Playhead>>,
    samples: Arc<[f32]>,
    sample_rate: u32,
    tap: bool,
    stream: Option<cpal::Stream>,
}

impl NativeTrack {
    pub fn new(track: DecodedTrack) -> Self {
        let samples: Arc<[f32]> = track.samples.into();
        Self {
            shared: Arc::new(Mutex::new(Playhead {
                samples: samples.clone(),
                cursor: 0.0,
                step: 1.0,
                paused: true,
            })),
            samples,
            sample_rate: track.sample_rate.max(1),
            tap: false,
            stream: None,
        }
    }

    fn ensure_stream(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("no default output device")?;
        let config = device.default_output_config()?;
        let channels = config.channels() as usize;
        let out_rate = config.sample_rate().0 as f64;
        if let Ok(mut head) = self.shared.lock() {
            head.step = self.sample_rate as f64 / out_rate;
        }
        let err_fn = |err| log::error!("[audio] stream error: {err}");
        let shared = Arc::clone(&self.shared);
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream_f32(&device, &config.into(), channels, shared, err_fn)?
            }
            cpal::SampleFormat::I16 => {
                build_stream_i16(&device, &config.into(), channels, shared, err_fn)?
            }
            cpal::SampleFormat::U16 => {
                build_stream_u16(&device, &config.into(), channels, shared, err_fn)?
            }
            other => anyhow::bail!("unsupported sample format {other:?}"),
        };
        stream.play()?;
        log::info!("[audio] output {} ch @ {}Hz", channels, out_rate);
        self.stream = Some(stream);
        Ok(())
    }
}

impl SignalSource for NativeTrack {
    fn attach_analyser(&mut self) -> flythrough_core::Result<()> {
        self.tap = true;
        Ok(())
    }

    fn resume_analyser(&mut self) -> flythrough_core::Result<()> {
        Ok(())
    }

    fn play(&mut self) -> flythrough_core::Result<()> {
        self.ensure_stream()
            .map_err(|e| FlightError::AutoplayBlocked(format!("{e:#}")))?;
        let mut head = self
            .shared
            .lock()
            .map_err(|_| FlightError::AutoplayBlocked("playhead poisoned".into()))?;
        if head.cursor as usize + 1 >= head.samples.len() {
            head.cursor = 0.0;
        }
        head.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        if let Ok(mut head) = self.shared.lock() {
            head.paused = true;
        }
    }

    fn is_paused(&self) -> bool {
        self.shared.lock().map_or(true, |h| h.paused)
    }

    fn current_time(&self) -> f64 {
        self.shared
            .lock()
            .map_or(0.0, |h| h.cursor / self.sample_rate as f64)
    }

    fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    fn read_waveform(&mut self, out: &mut [f32]) -> usize {
        if !self.tap {
            return 0;
        }
        let end = self
            .shared
            .lock()
            .map_or(0, |h| h.cursor as usize)
            .min(self.samples.len());
        let start = end.saturating_sub(out.len());
        let window = &self.samples[start..end];
        out[..window.len()].copy_from_slice(window);
        window.len()
    }
}

fn fill<T>(
    data: &mut [T],
    channels: usize,
    state: &Mutex<Playhead>,
    convert: impl Fn(f32) -> T,
) where
    T: Copy,
{
    let Ok(mut head) = state.lock() else {
        return;
    };
    for frame in data.chunks_mut(channels.max(1)) {
        let v = convert(head.next_sample());
        for slot in frame.iter_mut() {
            *slot = v;
        }
    }
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<Playhead>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [f32], _| fill(data, channels, &state, |s| s),
        err_fn,
        None,
    )
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<Playhead>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [i16], _| {
            fill(data, channels, &state, |s| {
                (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
            })
        },
        err_fn,
        None,
    )
}

fn build_stream_u16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<Playhead>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [u16], _| {
            fill(data, channels, &state, |s| {
                ((s * 0.5 + 0.5).clamp(0.0, 1.0) * u16::MAX as f32) as u16
            })
        },
        err_fn,
        None,
    )
}

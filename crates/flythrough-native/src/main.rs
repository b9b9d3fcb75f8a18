use flythrough_core::{AnimationContext, AudioSync, NoSignal, Playback, SignalSource};
use std::path::PathBuf;
use std::time::Instant;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

mod audio;
mod render;

fn open_track(path: Option<PathBuf>) -> Box<dyn SignalSource> {
    let Some(path) = path else {
        log::info!("[audio] no file given; running on the wall clock");
        return Box::new(NoSignal);
    };
    match audio::decode_track(&path) {
        Ok(track) => Box::new(audio::NativeTrack::new(track)),
        Err(e) => {
            log::error!("[audio] {:#}", e);
            Box::new(NoSignal)
        }
    }
}

fn toggle(audio: &mut AudioSync, track: &mut dyn SignalSource) {
    match audio.toggle(track) {
        Ok(Playback::Playing) => log::info!("[audio] playing (Space pauses)"),
        Ok(Playback::Paused) => log::info!("[audio] paused (Space resumes)"),
        Err(e) => log::warn!("[audio] {}", e),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut track = open_track(std::env::args_os().nth(1).map(PathBuf::from));
    let mut audio = AudioSync::new();
    // No autoplay gate on desktop; start with the analyser attached.
    toggle(&mut audio, track.as_mut());

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Flythrough")
        .build(&event_loop)?;

    let mut backend = pollster::block_on(render::ActiveBackend::for_window(&window))?;
    let mut anim = AnimationContext::default();
    let start = Instant::now();
    let window = &window;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => backend.resize(size.width, size.height),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(KeyCode::Space),
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                },
            ..
        } => toggle(&mut audio, track.as_mut()),
        Event::AboutToWait => {
            let now_ms = start.elapsed().as_secs_f64() * 1000.0;
            match anim.frame(&mut audio, track.as_mut(), backend.as_dyn(), now_ms) {
                Ok(report) => {
                    if report.beat {
                        log::debug!(
                            "[frame] beat phase={:?} progress={:.3}",
                            report.phase,
                            report.progress
                        );
                    }
                }
                Err(e) => log::error!("[frame] {}", e),
            }
            window.request_redraw();
        }
        _ => {}
    })?;
    Ok(())
}

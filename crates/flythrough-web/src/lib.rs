#![cfg(target_arch = "wasm32")]
use flythrough_core::{AnimationContext, AudioSync, FlightError, NoSignal, Playback, SignalSource};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

mod audio;
mod dom;
mod frame;
mod render;
mod ui;

use frame::FrameContext;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("flythrough-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
            if let Some(document) = dom::window_document() {
                ui::show_fatal(&document, "Unable to start the animation.");
            }
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let dpr = web::window().map_or(1.0, |w| w.device_pixel_ratio());
    dom::sync_canvas_backing_size(&canvas, dpr);

    let (backend, canvas) = render::ActiveBackend::attach(&document, canvas).await?;
    {
        let canvas = canvas.clone();
        let ratio = backend.pixel_ratio();
        dom::on_window_resize(move || dom::sync_canvas_backing_size(&canvas, ratio));
    }

    let element = document
        .get_element_by_id("bgm")
        .and_then(|el| el.dyn_into::<web::HtmlAudioElement>().ok());
    let track: Box<dyn SignalSource> = match &element {
        Some(el) => Box::new(audio::MediaTrack::new(el.clone())),
        None => {
            log::warn!("[audio] no #bgm element; running on the wall clock");
            Box::new(NoSignal)
        }
    };

    let frame_ctx = Rc::new(RefCell::new(FrameContext {
        anim: AnimationContext::default(),
        audio: AudioSync::new(),
        track,
        backend,
        canvas,
    }));

    {
        let frame_ctx = frame_ctx.clone();
        let doc = document.clone();
        dom::add_click_listener(&document, "audio-btn", move || {
            let Ok(mut ctx) = frame_ctx.try_borrow_mut() else {
                return;
            };
            let FrameContext { audio, track, .. } = &mut *ctx;
            match audio.toggle(track.as_mut()) {
                Ok(Playback::Playing) => {
                    ui::set_audio_button(&doc, ui::LABEL_PAUSE);
                    ui::show_audio_ui(&doc, false);
                }
                Ok(Playback::Paused) => ui::set_audio_button(&doc, ui::LABEL_PLAY),
                Err(e) => {
                    log::error!("[audio] failed to start: {}", e);
                    ui::show_audio_ui(&doc, true);
                    ui::set_audio_button(&doc, ui::LABEL_ENABLE);
                }
            }
        });
    }

    if let Some(el) = element {
        spawn_local(autoplay(el, frame_ctx.clone(), document.clone()));
    }

    ui::hide_loading(&document);
    frame::start_loop(frame_ctx);
    Ok(())
}

/// Best-effort playback at load; a rejection only reveals the audio panel.
async fn autoplay(
    element: web::HtmlAudioElement,
    frame_ctx: Rc<RefCell<FrameContext>>,
    document: web::Document,
) {
    element.set_loop(false);
    element.set_preload("auto");
    let result = match element.play() {
        Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
        Err(e) => Err(e),
    }
    .map_err(|e| FlightError::AutoplayBlocked(audio::js_reason(&e)).to_string());

    let outcome = {
        let Ok(mut ctx) = frame_ctx.try_borrow_mut() else {
            return;
        };
        let FrameContext { audio, track, .. } = &mut *ctx;
        audio.finish_autoplay(track.as_ref(), result)
    };
    if outcome.ok {
        ui::show_audio_ui(&document, false);
        ui::set_audio_button(&document, ui::LABEL_PAUSE);
    } else {
        ui::show_audio_ui(&document, true);
    }
}

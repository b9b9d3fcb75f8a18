use crate::render::ActiveBackend;
use flythrough_core::{AnimationContext, AudioSync, SignalSource};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct FrameContext {
    pub anim: AnimationContext,
    pub audio: AudioSync,
    pub track: Box<dyn SignalSource>,
    pub backend: ActiveBackend,
    pub canvas: web::HtmlCanvasElement,
}

impl FrameContext {
    pub fn frame(&mut self, now_ms: f64) {
        self.backend
            .resize(self.canvas.width(), self.canvas.height());
        let Self {
            anim,
            audio,
            track,
            backend,
            ..
        } = self;
        match anim.frame(audio, track.as_mut(), backend.as_dyn(), now_ms) {
            Ok(report) => {
                if report.beat {
                    log::debug!(
                        "[frame] beat phase={:?} progress={:.3} particles={}",
                        report.phase,
                        report.progress,
                        report.particles
                    );
                }
            }
            Err(e) => log::error!("[frame] {}", e),
        }
    }
}

/// Drive `FrameContext::frame` from requestAnimationFrame timestamps.
pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Tick = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        if let Ok(mut ctx) = frame_ctx.try_borrow_mut() {
            ctx.frame(ts);
        }
        request_frame(&tick_clone);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&tick);
}

fn request_frame(tick: &Tick) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

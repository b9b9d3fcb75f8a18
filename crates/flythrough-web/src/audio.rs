use flythrough_core::{FlightError, Result, SignalSource, ANALYSER_SMOOTHING, WAVEFORM_FRAME_LEN};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// `<audio>` element with a lazily built WebAudio analyser tap.
pub struct MediaTrack {
    element: web::HtmlAudioElement,
    graph: Option<AnalyserGraph>,
}

struct AnalyserGraph {
    ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    // Dropping the source node would let the element fall out of the graph.
    _source: web::MediaElementAudioSourceNode,
}

impl MediaTrack {
    pub fn new(element: web::HtmlAudioElement) -> Self {
        Self {
            element,
            graph: None,
        }
    }
}

fn build_graph(element: &web::HtmlAudioElement) -> std::result::Result<AnalyserGraph, JsValue> {
    let ctx = web::AudioContext::new()?;
    let source = ctx.create_media_element_source(element)?;
    let analyser = ctx.create_analyser()?;
    analyser.set_fft_size(WAVEFORM_FRAME_LEN as u32);
    analyser.set_smoothing_time_constant(ANALYSER_SMOOTHING as f64);
    source.connect_with_audio_node(&analyser)?;
    analyser.connect_with_audio_node(&ctx.destination())?;
    Ok(AnalyserGraph {
        ctx,
        analyser,
        _source: source,
    })
}

/// Short, user-presentable reason for a rejected media promise.
pub fn js_reason(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.name()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

impl SignalSource for MediaTrack {
    fn attach_analyser(&mut self) -> Result<()> {
        if self.graph.is_some() {
            return Ok(());
        }
        let graph = build_graph(&self.element)
            .map_err(|e| FlightError::UnsupportedSignalProcessing(js_reason(&e)))?;
        self.graph = Some(graph);
        Ok(())
    }

    fn resume_analyser(&mut self) -> Result<()> {
        let Some(graph) = &self.graph else {
            return Ok(());
        };
        if graph.ctx.state() == web::AudioContextState::Suspended {
            let promise = graph
                .ctx
                .resume()
                .map_err(|e| FlightError::UnsupportedSignalProcessing(js_reason(&e)))?;
            spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("[audio] resume rejected: {}", js_reason(&e));
                }
            });
        }
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let promise = self
            .element
            .play()
            .map_err(|e| FlightError::AutoplayBlocked(js_reason(&e)))?;
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("[audio] play rejected: {}", js_reason(&e));
                if let Some(document) = crate::dom::window_document() {
                    crate::ui::show_audio_ui(&document, true);
                    crate::ui::set_audio_button(&document, crate::ui::LABEL_ENABLE);
                }
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        let _ = self.element.pause();
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn read_waveform(&mut self, out: &mut [f32]) -> usize {
        let Some(graph) = &self.graph else {
            return 0;
        };
        let n = out.len().min(graph.analyser.fft_size() as usize);
        graph.analyser.get_float_time_domain_data(&mut out[..n]);
        n
    }
}

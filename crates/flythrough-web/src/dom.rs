use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("[dom] missing #{}", element_id);
    }
}

/// Match the canvas backing store to its CSS box times `pixel_ratio`.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, pixel_ratio: f64) {
    let rect = canvas.get_bounding_client_rect();
    let w_px = (rect.width() * pixel_ratio) as u32;
    let h_px = (rect.height() * pixel_ratio) as u32;
    if canvas.width() != w_px.max(1) {
        canvas.set_width(w_px.max(1));
    }
    if canvas.height() != h_px.max(1) {
        canvas.set_height(h_px.max(1));
    }
}

pub fn on_window_resize(mut handler: impl FnMut() + 'static) {
    let Some(window) = web::window() else {
        return;
    };
    let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
    let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Swap `old` for a fresh canvas with the same id and class.
///
/// A canvas that already handed out a `webgpu` context refuses a `2d` one.
pub fn replace_canvas(
    document: &web::Document,
    old: &web::HtmlCanvasElement,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let fresh: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    fresh.set_id(&old.id());
    if let Some(class) = old.get_attribute("class") {
        let _ = fresh.set_attribute("class", &class);
    }
    old.replace_with_with_node_1(&fresh)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(fresh)
}

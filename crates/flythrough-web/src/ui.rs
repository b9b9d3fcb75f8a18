use web_sys as web;

pub const LABEL_PLAY: &str = "Play music";
pub const LABEL_PAUSE: &str = "Pause music";
pub const LABEL_ENABLE: &str = "Tap to enable music";

pub fn set_audio_button(document: &web::Document, label: &str) {
    if let Some(el) = document.get_element_by_id("audio-btn") {
        el.set_text_content(Some(label));
    }
}

/// The audio panel is only shown when playback needs a gesture.
pub fn show_audio_ui(document: &web::Document, visible: bool) {
    if let Some(el) = document.get_element_by_id("audio-ui") {
        let style = if visible { "display:block" } else { "display:none" };
        let _ = el.set_attribute("style", style);
    }
}

pub fn hide_loading(document: &web::Document) {
    if let Some(el) = document.get_element_by_id("loading") {
        let _ = el.set_attribute("style", "opacity:0");
    }
}

pub fn show_fatal(document: &web::Document, message: &str) {
    if let Some(el) = document.get_element_by_id("loading") {
        let _ = el.set_attribute("style", "opacity:1");
        el.set_text_content(Some(message));
    }
}

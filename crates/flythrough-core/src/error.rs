use thiserror::Error;

/// Failures surfaced by the flythrough core and its platform collaborators.
///
/// None of these are fatal to the animation itself: losing audio analysis
/// drops the timeline to its wall-clock fallback and losing the accelerated
/// backend drops rendering to the software rasterizer.
#[derive(Debug, Error)]
pub enum FlightError {
    #[error("signal processing unavailable: {0}")]
    UnsupportedSignalProcessing(String),

    #[error("autoplay blocked: {0}")]
    AutoplayBlocked(String),

    #[error("render backend unavailable: {0}")]
    RenderBackendUnavailable(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, FlightError>;

pub mod audio;
pub mod backend;
pub mod beam;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod path;
pub mod phase;
pub mod raster;
pub mod scene;
pub mod view;

pub static SPRITE_WGSL: &str = include_str!("../shaders/sprite.wgsl");

pub use audio::*;
pub use backend::*;
pub use beam::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
#[cfg(feature = "gpu")]
pub use gpu::{preferred_format, request_device, GpuBackend};
pub use path::*;
pub use phase::*;
pub use raster::*;
pub use scene::*;
pub use view::*;

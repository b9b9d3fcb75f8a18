use flythrough_core::{
    FlightError, FrameStyle, GpuBackend, RenderBackend, Result, SoftwareBackend, Sprite, Viewport,
};
use wasm_bindgen::{Clamped, JsCast};
use web_sys as web;

/// Software raster presented through a Canvas2D `putImageData`.
pub struct CanvasBackend {
    ctx2d: web::CanvasRenderingContext2d,
    raster: SoftwareBackend,
}

impl CanvasBackend {
    pub fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx2d = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("canvas has no 2d context"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Self {
            ctx2d,
            raster: SoftwareBackend::new(canvas.width(), canvas.height()),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.raster.resize(width, height);
    }
}

impl RenderBackend for CanvasBackend {
    fn viewport(&self) -> Viewport {
        self.raster.viewport()
    }

    fn begin_frame(&mut self, style: &FrameStyle) {
        self.raster.begin_frame(style);
    }

    fn draw_sprites(&mut self, sprites: &[Sprite]) {
        self.raster.draw_sprites(sprites);
    }

    fn end_frame(&mut self) -> Result<()> {
        self.raster.end_frame()?;
        let fb = self.raster.framebuffer();
        let image = web::ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(self.raster.rgba8()),
            fb.width(),
            fb.height(),
        )
        .map_err(|e| FlightError::Render(format!("ImageData: {:?}", e)))?;
        self.ctx2d
            .put_image_data(&image, 0.0, 0.0)
            .map_err(|e| FlightError::Render(format!("putImageData: {:?}", e)))
    }
}

pub enum ActiveBackend {
    Accelerated(GpuBackend<'static>),
    Software(CanvasBackend),
}

impl ActiveBackend {
    /// Prefer WebGPU, fall back to Canvas2D on a fresh canvas.
    ///
    /// Returns the canvas that ends up bound to the backend.
    pub async fn attach(
        document: &web::Document,
        canvas: web::HtmlCanvasElement,
    ) -> anyhow::Result<(Self, web::HtmlCanvasElement)> {
        match init_gpu(&canvas).await {
            Ok(gpu) => Ok((Self::Accelerated(gpu), canvas)),
            Err(e) => {
                log::warn!("[render] {}; using Canvas2D software path", e);
                let fresh = crate::dom::replace_canvas(document, &canvas)?;
                crate::dom::sync_canvas_backing_size(&fresh, SOFTWARE_PIXEL_RATIO);
                let backend = CanvasBackend::new(&fresh)?;
                Ok((Self::Software(backend), fresh))
            }
        }
    }

    /// Backing-store scale; the software path renders at CSS resolution.
    pub fn pixel_ratio(&self) -> f64 {
        match self {
            Self::Accelerated(_) => web::window().map_or(1.0, |w| w.device_pixel_ratio()),
            Self::Software(_) => SOFTWARE_PIXEL_RATIO,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        match self {
            Self::Accelerated(g) => g.resize(width, height),
            Self::Software(s) => s.resize(width, height),
        }
    }

    pub fn as_dyn(&mut self) -> &mut dyn RenderBackend {
        match self {
            Self::Accelerated(g) => g,
            Self::Software(s) => s,
        }
    }
}

const SOFTWARE_PIXEL_RATIO: f64 = 1.0;

async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Result<GpuBackend<'static>> {
    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| FlightError::RenderBackendUnavailable(format!("create_surface: {e}")))?;
    GpuBackend::new(&instance, surface, canvas.width(), canvas.height()).await
}

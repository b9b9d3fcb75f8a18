// Surface negotiation helpers exported for the frontends. Needs `--features gpu`.
#![cfg(feature = "gpu")]

use flythrough_core::{preferred_format, GpuBackend, RenderBackend};

fn caps(formats: Vec<wgpu::TextureFormat>) -> wgpu::SurfaceCapabilities {
    wgpu::SurfaceCapabilities {
        formats,
        present_modes: vec![wgpu::PresentMode::Fifo],
        alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
        usages: wgpu::TextureUsages::RENDER_ATTACHMENT,
    }
}

// Frontends hand the accelerated backend to the frame loop as a trait object.
#[allow(dead_code)]
fn as_render_backend<'a, 'w>(gpu: &'a mut GpuBackend<'w>) -> &'a mut dyn RenderBackend {
    gpu
}

#[test]
fn srgb_surface_format_is_preferred() {
    let picked = preferred_format(&caps(vec![
        wgpu::TextureFormat::Bgra8Unorm,
        wgpu::TextureFormat::Bgra8UnormSrgb,
    ]));
    assert_eq!(picked, Some(wgpu::TextureFormat::Bgra8UnormSrgb));
}

#[test]
fn first_format_is_used_without_srgb() {
    let picked = preferred_format(&caps(vec![
        wgpu::TextureFormat::Rgba16Float,
        wgpu::TextureFormat::Bgra8Unorm,
    ]));
    assert_eq!(picked, Some(wgpu::TextureFormat::Rgba16Float));
}

#[test]
fn no_formats_means_no_surface() {
    assert_eq!(preferred_format(&caps(Vec::new())), None);
}

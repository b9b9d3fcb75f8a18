//! CPU rendition of the sprite pipeline.
//!
//! Accumulates linear light in an f32 buffer with the same falloff and
//! additive blend as `sprite.wgsl`, then encodes to sRGB bytes for whatever
//! presents it (a 2D canvas on the web, a texture upload on native).

use crate::backend::{glow_falloff, FrameStyle, RenderBackend, Sprite};
use crate::error::Result;
use crate::view::Viewport;

pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            pixels: vec![[0.0; 3]; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![[0.0; 3]; (width * height) as usize];
    }

    pub fn clear(&mut self, rgb: [f32; 3]) {
        self.pixels.fill(rgb);
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Additively splat one sprite. Pixels are sampled at their centres.
    pub fn splat(&mut self, sprite: &Sprite, gain: f32) {
        let r = sprite.radius;
        let a = sprite.rgba[3] * gain;
        let [cx, cy] = sprite.center;
        if !(r > 0.0 && a > 0.0 && cx.is_finite() && cy.is_finite()) {
            return;
        }
        let x0 = (cx - r).floor().max(0.0) as i64;
        let y0 = (cy - r).floor().max(0.0) as i64;
        let x1 = ((cx + r).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((cy + r).ceil() as i64).min(self.height as i64 - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }
        let inv_diameter = 1.0 / (2.0 * r);
        for y in y0..=y1 {
            let py = y as f32 + 0.5 - cy;
            let row = y as usize * self.width as usize;
            for x in x0..=x1 {
                let px = x as f32 + 0.5 - cx;
                let d = (px * px + py * py).sqrt() * inv_diameter;
                if d >= 0.5 {
                    continue;
                }
                let k = glow_falloff(d) * a;
                let dst = &mut self.pixels[row + x as usize];
                dst[0] += sprite.rgba[0] * k;
                dst[1] += sprite.rgba[1] * k;
                dst[2] += sprite.rgba[2] * k;
            }
        }
    }

    /// Encode to tightly packed sRGB RGBA8, clamping overexposed light.
    pub fn write_rgba8(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.pixels.len() * 4);
        for p in &self.pixels {
            out.push(encode_srgb(p[0]));
            out.push(encode_srgb(p[1]));
            out.push(encode_srgb(p[2]));
            out.push(255);
        }
    }
}

#[inline]
fn encode_srgb(linear: f32) -> u8 {
    let c = linear.clamp(0.0, 1.0);
    let s = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (s * 255.0 + 0.5) as u8
}

/// Software `RenderBackend`. Frontends present `rgba8()` after `end_frame`.
pub struct SoftwareBackend {
    fb: Framebuffer,
    style: FrameStyle,
    encoded: Vec<u8>,
    sprites_drawn: usize,
}

impl SoftwareBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            fb: Framebuffer::new(width, height),
            style: FrameStyle::default(),
            encoded: Vec::new(),
            sprites_drawn: 0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.fb.resize(width, height);
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// sRGB bytes of the last finished frame.
    pub fn rgba8(&self) -> &[u8] {
        &self.encoded
    }

    pub fn sprites_drawn(&self) -> usize {
        self.sprites_drawn
    }
}

impl RenderBackend for SoftwareBackend {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.fb.width(), self.fb.height())
    }

    fn begin_frame(&mut self, style: &FrameStyle) {
        self.style = *style;
        self.sprites_drawn = 0;
        self.fb.clear(style.clear);
    }

    fn draw_sprites(&mut self, sprites: &[Sprite]) {
        for s in sprites {
            self.fb.splat(s, self.style.glow_gain);
        }
        self.sprites_drawn += sprites.len();
    }

    fn end_frame(&mut self) -> Result<()> {
        self.fb.write_rgba8(&mut self.encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints() {
        assert_eq!(encode_srgb(0.0), 0);
        assert_eq!(encode_srgb(1.0), 255);
        assert_eq!(encode_srgb(4.0), 255);
    }

    #[test]
    fn offscreen_sprite_is_ignored() {
        let mut fb = Framebuffer::new(8, 8);
        fb.splat(&Sprite::new(-50.0, -50.0, 4.0, [1.0; 4]), 1.0);
        assert!(fb.pixels.iter().all(|p| *p == [0.0; 3]));
    }
}

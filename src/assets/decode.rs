use std::path::Path;

use crate::foundation::core::{Rgba, Vec2};
use crate::foundation::error::{DepthflowError, DepthflowResult};

/// Decoded color image, straight-alpha RGBA8, row 0 at the top.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8: Vec<u8>,
}

impl SourceImage {
    pub fn new(width: u32, height: u32, rgba8: Vec<u8>) -> DepthflowResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepthflowError::data(format!(
                "image must be non-empty, got {width}x{height}"
            )));
        }
        let expected = (width as usize) * (height as usize) * 4;
        if rgba8.len() != expected {
            return Err(DepthflowError::data(format!(
                "image {width}x{height} expects {expected} bytes, got {}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba8
    }

    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Rgba {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Rgba::from_rgba8([
            self.rgba8[i],
            self.rgba8[i + 1],
            self.rgba8[i + 2],
            self.rgba8[i + 3],
        ])
    }

    /// Bilinear lookup at texel centers with clamp-to-edge addressing.
    pub fn sample_bilinear(&self, uv: Vec2) -> Rgba {
        let (x0, x1, fx) = bilinear_axis(uv.x, self.width);
        let (y0, y1, fy) = bilinear_axis(uv.y, self.height);
        let top = self.texel(x0, y0).lerp(self.texel(x1, y0), fx);
        let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), fx);
        top.lerp(bottom, fy)
    }
}

// Neighbouring texel indices and blend weight along one axis.
fn bilinear_axis(u: f64, size: u32) -> (u32, u32, f32) {
    let max = f64::from(size - 1);
    let t = u * f64::from(size) - 0.5;
    if !t.is_finite() || t <= 0.0 {
        return (0, 0, 0.0);
    }
    if t >= max {
        let last = size - 1;
        return (last, last, 0.0);
    }
    let i0 = t.floor();
    (i0 as u32, i0 as u32 + 1, (t - i0) as f32)
}

/// Decode PNG/JPEG/... bytes into a straight-alpha [`SourceImage`].
pub fn decode_image(bytes: &[u8]) -> DepthflowResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| DepthflowError::resource(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    SourceImage::new(width, height, rgba.into_raw())
}

pub fn load_image(path: impl AsRef<Path>) -> DepthflowResult<SourceImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| DepthflowError::resource(format!("read '{}': {e}", path.display())))?;
    decode_image(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

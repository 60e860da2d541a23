use crate::foundation::core::Vec2;
use crate::foundation::error::{DepthflowError, DepthflowResult};

/// Normalized elevation map in [0,1], row-major, row 0 at the top.
///
/// A heightfield is immutable once built; sessions share it behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Heightfield {
    /// Build a heightfield from already-normalized samples.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> DepthflowResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepthflowError::data("heightfield must be at least 1x1"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| DepthflowError::data("heightfield size overflow"))?;
        if data.len() != expected {
            return Err(DepthflowError::data(format!(
                "heightfield expects {expected} samples for {width}x{height}, got {}",
                data.len()
            )));
        }
        if let Some(bad) = data
            .iter()
            .position(|v| !v.is_finite() || *v < 0.0 || *v > 1.0)
        {
            return Err(DepthflowError::data(format!(
                "heightfield sample {bad} is outside [0,1]"
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Nearest-texel lookup with clamp-to-edge addressing.
    #[inline]
    pub fn sample_nearest(&self, uv: Vec2) -> f32 {
        let x = texel_index(uv.x, self.width);
        let y = texel_index(uv.y, self.height);
        self.get(x, y)
    }

    /// Grayscale RGBA8 rendition, opaque.
    pub fn to_gray_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for &v in &self.data {
            let g = (v * 255.0).round() as u8;
            out.extend_from_slice(&[g, g, g, 255]);
        }
        out
    }
}

#[inline]
pub(crate) fn texel_index(u: f64, size: u32) -> u32 {
    let max = size.saturating_sub(1);
    let t = (u * f64::from(size)).floor();
    if t.is_nan() || t <= 0.0 {
        0
    } else if t >= f64::from(max) {
        max
    } else {
        t as u32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/depth/heightfield.rs"]
mod tests;

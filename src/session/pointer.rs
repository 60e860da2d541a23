use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::foundation::core::Vec2;
use crate::foundation::error::{DepthflowError, DepthflowResult};

/// Latest cursor position in [-1,1]^2, written by the host and read once per frame.
///
/// `y` grows downward like UV rows: `-1` is the top edge and `1` the bottom. Hosts with a
/// y-up convention write through [`PointerState::set_y_up`].
///
/// Both coordinates share one atomic word, so a reader never sees `x` from one update and
/// `y` from another.
#[derive(Debug, Default)]
pub struct PointerState {
    packed: AtomicU64,
    enabled: AtomicBool,
}

fn pack(x: f32, y: f32) -> u64 {
    (u64::from(x.to_bits()) << 32) | u64::from(y.to_bits())
}

fn unpack(bits: u64) -> (f32, f32) {
    (f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new position, clamped to [-1,1]. Non-finite coordinates are rejected.
    pub fn set(&self, x: f64, y: f64) -> DepthflowResult<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(DepthflowError::config(format!(
                "pointer position must be finite, got ({x}, {y})"
            )));
        }
        let x = x.clamp(-1.0, 1.0) as f32;
        let y = y.clamp(-1.0, 1.0) as f32;
        self.packed.store(pack(x, y), Ordering::Release);
        Ok(())
    }

    /// Record a position given with `y` growing upward.
    pub fn set_y_up(&self, x: f64, y: f64) -> DepthflowResult<()> {
        self.set(x, -y)
    }

    pub fn position(&self) -> Vec2 {
        let (x, y) = unpack(self.packed.load(Ordering::Acquire));
        Vec2::new(f64::from(x), f64::from(y))
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Depth origin implied by the pointer, or `None` while pointer tracking is off.
    pub fn depth_origin(&self) -> Option<Vec2> {
        self.is_enabled()
            .then(|| self.position() * 0.6 + Vec2::new(0.5, 0.5))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/pointer.rs"]
mod tests;

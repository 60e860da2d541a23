use std::f64::consts::TAU;

use crate::foundation::core::{Rgba, Vec2};
use crate::foundation::math::smoothstep;
use crate::render::uniforms::{DofUniforms, VignetteUniforms};

/// Disc blur around `center` whose radius grows with distance from the focal plane.
///
/// Averages the center tap and `directions * rings` taps on concentric rings, so a constant
/// image passes through unchanged.
pub fn depth_of_field<F>(sample: F, center: Vec2, point_height: f64, dof: &DofUniforms) -> Rgba
where
    F: Fn(Vec2) -> Rgba,
{
    let intensity =
        dof.intensity * smoothstep(dof.start, dof.end, 1.0 - point_height).powf(dof.exponent);
    let directions = dof.directions.max(1);
    let rings = dof.rings.max(1);

    let mut acc = sample(center);
    for d in 0..directions {
        let angle = TAU * f64::from(d) / f64::from(directions);
        let (sin, cos) = angle.sin_cos();
        for k in 1..=rings {
            let radius = f64::from(k) / f64::from(rings) * intensity;
            acc = acc + sample(center + Vec2::new(cos, sin) * radius);
        }
    }
    acc.scale(1.0 / (directions * rings + 1) as f32)
}

/// Darken toward the frame edges. `uv` is the fragment position, not the solved point.
pub fn vignette(color: Rgba, uv: Vec2, v: &VignetteUniforms) -> Rgba {
    let away = Vec2::new(uv.x * (1.0 - uv.y), uv.y * (1.0 - uv.x));
    let linear = v.intensity * away.x * away.y;
    let factor = linear.powf(v.decay).clamp(0.0, 1.0);
    color.scale_rgb(factor as f32)
}

/// Blend toward the heightfield shown as opaque gray.
pub fn depth_overlay(color: Rgba, height: f32, opacity: f64) -> Rgba {
    color.lerp(Rgba::gray(height), opacity as f32)
}

#[cfg(test)]
#[path = "../../tests/unit/render/post.rs"]
mod tests;

use crate::foundation::core::Vec2;

/// Linear blend `a + (b - a) * t`, unclamped like GLSL `mix`.
#[inline]
pub(crate) fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite step between `edge0` and `edge1`. Equal edges degrade to a hard step.
#[inline]
pub(crate) fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL `mod`: result carries the sign of `y`.
#[inline]
pub(crate) fn glsl_mod(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

/// Mirror-wrap addressing: `|mod(uv, 2) - 1|` per component.
#[inline]
pub(crate) fn mirror_uv(uv: Vec2) -> Vec2 {
    Vec2::new(
        (glsl_mod(uv.x, 2.0) - 1.0).abs(),
        (glsl_mod(uv.y, 2.0) - 1.0).abs(),
    )
}

/// Round to a fixed number of decimal places.
#[inline]
pub(crate) fn round_decimals(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}

#[inline]
pub(crate) fn vec2_is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

use crate::depth::heightfield::Heightfield;
use crate::foundation::core::Vec2;
use crate::foundation::error::{DepthflowError, DepthflowResult};
use crate::foundation::math::{mirror_uv, mix, vec2_is_finite};
use crate::render::camera::Camera;
use crate::render::uniforms::FrameUniforms;

/// Upper bound on the step density of either march stage.
pub const MAX_MARCH_STEPS: f64 = 65_536.0;

/// Step densities of the two march stages, in samples per unit of ray parameter.
///
/// The probe stage blends between `probe_min` and `probe_max` by quality. The refine stage
/// scales with the larger viewport dimension unless `refine_fixed` pins it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarchBudget {
    pub probe_min: f64,
    pub probe_max: f64,
    pub refine_min_factor: f64,
    pub refine_max_factor: f64,
    pub refine_fixed: Option<f64>,
}

impl Default for MarchBudget {
    fn default() -> Self {
        Self {
            probe_min: 50.0,
            probe_max: 100.0,
            refine_min_factor: 0.05,
            refine_max_factor: 0.5,
            refine_fixed: None,
        }
    }
}

impl MarchBudget {
    pub fn validate(&self) -> DepthflowResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(DepthflowError::config(format!(
                    "march budget '{name}' must be finite and > 0, got {v}"
                )))
            }
        };
        let density = |name: &str, v: f64| {
            positive(name, v)?;
            if v > MAX_MARCH_STEPS {
                return Err(DepthflowError::config(format!(
                    "march budget '{name}' must be <= {MAX_MARCH_STEPS}, got {v}"
                )));
            }
            Ok(())
        };
        density("probe_min", self.probe_min)?;
        density("probe_max", self.probe_max)?;
        positive("refine_min_factor", self.refine_min_factor)?;
        positive("refine_max_factor", self.refine_max_factor)?;
        if let Some(v) = self.refine_fixed {
            density("refine_fixed", v)?;
        }
        Ok(())
    }

    /// `quality` in [0,1].
    pub fn probe_steps(&self, quality: f64) -> f64 {
        mix(self.probe_min, self.probe_max, quality).min(MAX_MARCH_STEPS)
    }

    /// Viewport-scaled densities are capped at [`MAX_MARCH_STEPS`].
    pub fn refine_steps(&self, quality: f64, max_dimension: u32) -> f64 {
        if let Some(fixed) = self.refine_fixed {
            return fixed.min(MAX_MARCH_STEPS);
        }
        let dim = f64::from(max_dimension);
        mix(
            dim * self.refine_min_factor,
            dim * self.refine_max_factor,
            quality,
        )
        .min(MAX_MARCH_STEPS)
    }
}

/// Visible surface point for one view ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub uv: Vec2,
    /// Raw heightfield value at `uv`, before scaling or inversion.
    pub height: f64,
}

/// Two-stage ray march of view rays against the relief surface.
pub struct ParallaxSolver<'a> {
    heightfield: &'a Heightfield,
    uniforms: &'a FrameUniforms,
}

impl<'a> ParallaxSolver<'a> {
    pub fn new(heightfield: &'a Heightfield, uniforms: &'a FrameUniforms) -> Self {
        Self {
            heightfield,
            uniforms,
        }
    }

    #[inline]
    fn sample_height(&self, uv: Vec2) -> f64 {
        let uv = if self.uniforms.mirror {
            mirror_uv(uv)
        } else {
            uv
        };
        f64::from(self.heightfield.sample_nearest(uv))
    }

    /// Find the surface point seen by `camera`.
    ///
    /// `None` means the pixel shows the background: the ray misses the image plane or the
    /// geometry degenerates to non-finite values.
    pub fn solve(&self, camera: &Camera) -> Option<SurfacePoint> {
        if camera.out_of_bounds {
            return None;
        }
        let u = self.uniforms;
        let usable = |steps: f64| steps.is_finite() && steps > 0.0;
        if !usable(u.probe_steps) || !usable(u.refine_steps) {
            return None;
        }
        let probe_steps = u.probe_steps.min(MAX_MARCH_STEPS);
        let refine_steps = u.refine_steps.min(MAX_MARCH_STEPS);
        let height = u.height;
        let depth_distance = u.depth_distance();
        let origin = camera.origin.xy();

        let focus_offset = u.focus_center * 2.0;
        // Where the ray meets the fixed image plane.
        let lambda = (camera.uv - Vec2::new(0.5, 0.5)) * 2.0 + u.depth_center;
        // Same, overshot so that points at the focal depth stay put.
        let sigma = lambda - origin * (1.0 + u.static_amount * height / depth_distance)
            + focus_offset * height;
        let displacement = (origin - lambda) + u.depth_origin + focus_offset * height;
        if !vec2_is_finite(sigma) || !vec2_is_finite(displacement) {
            return None;
        }

        let reach = displacement.hypot();
        if reach == 0.0 {
            // Looking straight down the relief: no lateral walk.
            return Some(SurfacePoint {
                uv: sigma,
                height: self.sample_height(sigma),
            });
        }
        let walk = displacement / reach;

        let rise = depth_distance - camera.origin.z;
        let tan_theta = reach.atan2(rise.abs()).tan();
        let delta = tan_theta * (rise - height);
        let alpha = tan_theta * rise;
        let beta = alpha - delta;
        if !(tan_theta.is_finite() && tan_theta > 0.0 && beta.is_finite()) {
            return None;
        }

        let probe = |i: f64| {
            let uv = sigma + walk * (i * beta);
            let true_height = self.sample_height(uv);
            let surface = height * mix(true_height, 1.0 - true_height, u.invert);
            let ray = i * beta / tan_theta;
            (uv, true_height, surface >= ray)
        };

        // Forward: coarse steps toward the plane until the ray is inside the surface. Step
        // `k` sits at `1 - k / probe_steps`; the last one may land just below zero.
        let forward = probe_steps.floor() as u64 + 1;
        let mut i = 1.0;
        let mut inside = false;
        for k in 1..=forward {
            i = 1.0 - k as f64 / probe_steps;
            if probe(i).2 {
                inside = true;
                break;
            }
        }

        let mut point = SurfacePoint {
            uv: sigma,
            height: 0.0,
        };
        if inside {
            // Backward: fine steps out until the ray leaves the surface again.
            let start = i;
            let backward = ((1.0 - start) * refine_steps).floor() as u64 + 1;
            for k in 1..=backward {
                let (uv, true_height, hit) = probe(start + k as f64 / refine_steps);
                if !hit {
                    point = SurfacePoint {
                        uv,
                        height: true_height,
                    };
                    break;
                }
            }
        }

        vec2_is_finite(point.uv).then_some(point)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/solver.rs"]
mod tests;

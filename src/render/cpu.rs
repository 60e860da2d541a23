use rayon::prelude::*;

use crate::assets::decode::SourceImage;
use crate::depth::heightfield::Heightfield;
use crate::foundation::core::{Rgba, Vec2};
use crate::foundation::error::{DepthflowError, DepthflowResult};
use crate::foundation::math::mirror_uv;
use crate::render::camera::Camera;
use crate::render::frame::FrameRGBA;
use crate::render::post::{depth_of_field, depth_overlay, vignette};
use crate::render::solver::ParallaxSolver;
use crate::render::uniforms::FrameUniforms;

/// Per-pixel parallax program evaluated on the CPU.
pub struct FrameRenderer<'a> {
    uniforms: &'a FrameUniforms,
    image: &'a SourceImage,
    heightfield: &'a Heightfield,
}

impl<'a> FrameRenderer<'a> {
    pub fn new(
        uniforms: &'a FrameUniforms,
        image: &'a SourceImage,
        heightfield: &'a Heightfield,
    ) -> Self {
        Self {
            uniforms,
            image,
            heightfield,
        }
    }

    #[inline]
    fn sample_image(&self, uv: Vec2) -> Rgba {
        let uv = if self.uniforms.mirror {
            mirror_uv(uv)
        } else {
            uv
        };
        self.image.sample_bilinear(uv)
    }

    /// Color of the fragment at `uv`.
    pub fn shade(&self, uv: Vec2) -> Rgba {
        let u = self.uniforms;
        let camera = Camera::for_fragment(uv, u);
        let Some(point) = ParallaxSolver::new(self.heightfield, u).solve(&camera) else {
            return u.background;
        };

        let mut color = match &u.dof {
            Some(dof) => depth_of_field(|p| self.sample_image(p), point.uv, point.height, dof),
            None => self.sample_image(point.uv),
        };
        if let Some(v) = &u.vignette {
            color = vignette(color, uv, v);
        }
        if let Some(opacity) = u.depth_map_opacity {
            color = depth_overlay(color, self.heightfield.sample_nearest(uv), opacity);
        }

        if color.is_finite() {
            color
        } else {
            u.background
        }
    }

    /// Evaluate every pixel, one rayon task per row.
    #[tracing::instrument(
        skip(self, pool),
        fields(width = self.uniforms.viewport.width, height = self.uniforms.viewport.height)
    )]
    pub fn render(&self, pool: &rayon::ThreadPool) -> FrameRGBA {
        let viewport = self.uniforms.viewport;
        let row_bytes = (viewport.width as usize) * 4;
        let mut data = vec![0u8; row_bytes * (viewport.height as usize)];

        pool.install(|| {
            data.par_chunks_mut(row_bytes)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, px) in row.chunks_exact_mut(4).enumerate() {
                        let uv = viewport.pixel_uv(x as u32, y as u32);
                        px.copy_from_slice(&self.shade(uv).to_rgba8());
                    }
                });
        });

        FrameRGBA {
            width: viewport.width,
            height: viewport.height,
            data,
            premultiplied: false,
        }
    }
}

/// Worker pool for frame evaluation. `None` uses rayon's default thread count.
pub(crate) fn build_thread_pool(threads: Option<usize>) -> DepthflowResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(DepthflowError::config(
            "render 'threads' must be >= 1 when set",
        ));
    }

    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("depthflow-render-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

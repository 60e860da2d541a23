use crate::config::params::Param;
use crate::config::store::Config;
use crate::foundation::core::{Rgba, Vec2, Viewport};
use crate::foundation::math::mix;
use crate::render::solver::MarchBudget;

/// Flat color for pixels whose view ray misses the image plane.
pub const BACKGROUND: Rgba = Rgba::gray(0.2);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DofUniforms {
    pub intensity: f64,
    pub start: f64,
    pub end: f64,
    pub exponent: f64,
    pub directions: u32,
    pub rings: u32,
}

impl DofUniforms {
    /// Samples per blurred pixel, center included.
    pub fn taps(&self) -> u32 {
        self.directions * self.rings + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VignetteUniforms {
    pub intensity: f64,
    pub decay: f64,
}

/// Everything the per-pixel program reads, frozen for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub viewport: Viewport,
    pub height: f64,
    pub static_amount: f64,
    pub focus: f64,
    pub zoom: f64,
    pub isometric: bool,
    pub dolly: f64,
    pub invert: f64,
    pub focus_center: Vec2,
    pub depth_center: Vec2,
    pub depth_origin: Vec2,
    pub depth_offset: Vec2,
    pub mirror: bool,
    pub aspect_ratio: f64,
    pub probe_steps: f64,
    pub refine_steps: f64,
    pub dof: Option<DofUniforms>,
    pub vignette: Option<VignetteUniforms>,
    pub depth_map_opacity: Option<f64>,
    pub background: Rgba,
}

impl FrameUniforms {
    /// Freeze `config` for one frame. The depth origin comes from the config; callers
    /// tracking a pointer overwrite [`FrameUniforms::depth_origin`].
    pub fn new(config: &Config, viewport: Viewport, march: &MarchBudget, background: Rgba) -> Self {
        let vec = |x: Param, y: Param| Vec2::new(config.get(x), config.get(y));
        let quality = config.get(Param::Quality) / 100.0;

        let dof = config.flag(Param::DofEnable).then(|| DofUniforms {
            intensity: config.get(Param::DofIntensity),
            start: config.get(Param::DofStart),
            end: config.get(Param::DofEnd),
            exponent: config.get(Param::DofExponent),
            directions: config.get(Param::DofDirections).round() as u32,
            rings: config.get(Param::DofQuality).round() as u32,
        });
        let vignette = config
            .flag(Param::VignetteEnable)
            .then(|| VignetteUniforms {
                intensity: config.get(Param::VignetteIntensity),
                decay: config.get(Param::VignetteDecay),
            });
        let depth_map_opacity = config
            .flag(Param::ViewDepthMap)
            .then(|| config.get(Param::DepthMapOpacity));

        Self {
            viewport,
            height: config.get(Param::Height),
            static_amount: config.get(Param::Static),
            focus: config.get(Param::Focus),
            zoom: config.get(Param::Zoom),
            isometric: config.flag(Param::Isometric),
            dolly: config.get(Param::Dolly),
            invert: config.get(Param::Invert),
            focus_center: vec(Param::FocusCenterX, Param::FocusCenterY),
            depth_center: vec(Param::DepthCenterX, Param::DepthCenterY),
            depth_origin: vec(Param::DepthOriginX, Param::DepthOriginY),
            depth_offset: vec(Param::DepthOffsetX, Param::DepthOffsetY),
            mirror: config.flag(Param::DepthMirror),
            aspect_ratio: config.get(Param::AspectRatio),
            probe_steps: march.probe_steps(quality),
            refine_steps: march.refine_steps(quality, viewport.max_dimension()),
            dof,
            vignette,
            depth_map_opacity,
            background,
        }
    }

    /// Distance from the camera plane to the plane of maximum relief.
    #[inline]
    pub fn depth_distance(&self) -> f64 {
        1.0 + mix(0.0, self.height, self.focus)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/uniforms.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{DepthflowError, DepthflowResult};

/// Number of renderer parameters.
pub const PARAM_COUNT: usize = 30;

/// Declared bounds, UI resolution and default for one parameter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl ParamSpec {
    const fn new(name: &'static str, min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            name,
            min,
            max,
            step,
            default,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && self.min <= value && value <= self.max
    }
}

/// A named renderer input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Param {
    Height,
    Static,
    Focus,
    Zoom,
    Isometric,
    Dolly,
    Invert,
    FocusCenterX,
    FocusCenterY,
    DepthCenterX,
    DepthCenterY,
    DepthOriginX,
    DepthOriginY,
    Quality,
    DofEnable,
    DofIntensity,
    DofStart,
    DofEnd,
    DofExponent,
    DofDirections,
    DofQuality,
    VignetteEnable,
    VignetteIntensity,
    VignetteDecay,
    DepthOffsetX,
    DepthOffsetY,
    DepthMirror,
    AspectRatio,
    ViewDepthMap,
    DepthMapOpacity,
}

// Indexed by `Param as usize`.
static SPECS: [ParamSpec; PARAM_COUNT] = [
    ParamSpec::new("height", 0.01, 1.0, 0.01, 1.0),
    ParamSpec::new("static", 0.0, 1.0, 0.01, 0.0),
    ParamSpec::new("focus", 0.6, 100.0, 0.01, 10.0),
    ParamSpec::new("zoom", -2.0, 2.0, 0.01, 0.5),
    ParamSpec::new("isometric", 0.0, 1.0, 0.01, 0.0),
    ParamSpec::new("dolly", -1.0, 1.0, 0.01, 0.0),
    ParamSpec::new("invert", 0.0, 1.0, 0.01, 0.39),
    ParamSpec::new("focusCenterX", -1.0, 1.0, 0.01, 0.0),
    ParamSpec::new("focusCenterY", -1.0, 1.0, 0.01, 0.0),
    ParamSpec::new("depthCenterX", -1.0, 1.0, 0.01, 0.5),
    ParamSpec::new("depthCenterY", -1.0, 1.0, 0.01, 0.5),
    ParamSpec::new("depthOriginX", -1.0, 1.0, 0.01, 0.5),
    ParamSpec::new("depthOriginY", -1.0, 1.0, 0.01, 0.5),
    ParamSpec::new("quality", 0.0, 100.0, 0.01, 100.0),
    ParamSpec::new("dofEnable", 0.0, 1.0, 1.0, 0.0),
    ParamSpec::new("dofIntensity", 0.0, 1.0, 0.01, 0.1),
    ParamSpec::new("dofStart", 0.0, 1.0, 0.01, 0.0),
    ParamSpec::new("dofEnd", 0.0, 1.0, 0.01, 1.0),
    ParamSpec::new("dofExponent", 0.5, 2.5, 0.01, 1.0),
    ParamSpec::new("dofDirections", 4.0, 16.0, 1.0, 8.0),
    ParamSpec::new("dofQuality", 1.0, 8.0, 1.0, 4.0),
    ParamSpec::new("vignetteEnable", 0.0, 1.0, 1.0, 0.0),
    ParamSpec::new("vignetteIntensity", 0.0, 2.0, 0.01, 1.0),
    ParamSpec::new("vignetteDecay", 0.5, 2.5, 0.01, 1.5),
    ParamSpec::new("depthOffsetX", -1.0, 1.0, 0.01, 0.0),
    ParamSpec::new("depthOffsetY", -1.0, 1.0, 0.01, 0.0),
    ParamSpec::new("depthMirror", 0.0, 1.0, 1.0, 0.0),
    ParamSpec::new("aspectRatio", 0.5, 2.0, 0.01, 1.0),
    ParamSpec::new("viewDepthMap", 0.0, 1.0, 1.0, 0.0),
    ParamSpec::new("depthMapOpacity", 0.0, 1.0, 0.01, 1.0),
];

impl Param {
    /// Every parameter, in table order.
    pub const ALL: [Param; PARAM_COUNT] = [
        Param::Height,
        Param::Static,
        Param::Focus,
        Param::Zoom,
        Param::Isometric,
        Param::Dolly,
        Param::Invert,
        Param::FocusCenterX,
        Param::FocusCenterY,
        Param::DepthCenterX,
        Param::DepthCenterY,
        Param::DepthOriginX,
        Param::DepthOriginY,
        Param::Quality,
        Param::DofEnable,
        Param::DofIntensity,
        Param::DofStart,
        Param::DofEnd,
        Param::DofExponent,
        Param::DofDirections,
        Param::DofQuality,
        Param::VignetteEnable,
        Param::VignetteIntensity,
        Param::VignetteDecay,
        Param::DepthOffsetX,
        Param::DepthOffsetY,
        Param::DepthMirror,
        Param::AspectRatio,
        Param::ViewDepthMap,
        Param::DepthMapOpacity,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn spec(self) -> &'static ParamSpec {
        &SPECS[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Resolve a table name. `depthHeight` and `depthFocus` are accepted as aliases.
    pub fn from_name(name: &str) -> DepthflowResult<Self> {
        match name {
            "depthHeight" => return Ok(Self::Height),
            "depthFocus" => return Ok(Self::Focus),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| DepthflowError::config(format!("unknown parameter '{name}'")))
    }

    /// Check a candidate value against the declared bounds.
    pub fn validate(self, value: f64) -> DepthflowResult<f64> {
        let spec = self.spec();
        if !spec.contains(value) {
            return Err(DepthflowError::config(format!(
                "{} = {value} is outside [{}, {}]",
                spec.name, spec.min, spec.max
            )));
        }
        Ok(value)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Param {
    type Err = DepthflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/params.rs"]
mod tests;

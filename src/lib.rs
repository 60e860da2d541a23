//! depthflow turns a single photo plus a depth estimate into a navigable pseudo-3D view.
//!
//! Moving a virtual camera over the image produces motion parallax consistent with the depth
//! map, without reconstructing any geometry. Every output pixel is found by ray-marching a
//! view ray against the heightfield.
//!
//! # Pipeline overview
//!
//! 1. **Normalize**: raw depth matrix -> [`Heightfield`] in [0,1] via histogram equalization
//! 2. **Project**: fragment UV + [`FrameUniforms`] -> per-pixel [`Camera`] ray
//! 3. **Solve**: [`ParallaxSolver`] finds the visible surface point of each ray
//! 4. **Post-process**: depth of field, vignette, depth-map overlay
//! 5. **Animate**: [`LoopEngine`] sweeps chosen parameters as triangle waves between frames
//!
//! [`ParallaxSession`] wires these together: it owns the sources, the live [`ConfigStore`],
//! the loop engine and the pointer, and renders [`FrameRGBA`] frames on a rayon pool.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Bounded parameters**: every [`Config`] value stays within its declared range; bad
//!   writes are rejected and the previous value kept.
//! - **No NaN pixels**: degenerate geometry degrades to the background color.
//! - **Straight alpha**: frames are RGBA8 with unpremultiplied color.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod config;
mod depth;
mod foundation;
mod render;
mod session;

pub use animation::loops::{Direction, LoopEngine, LoopState};
pub use animation::scheduler::{DEFAULT_TICK_INTERVAL, LoopClock, LoopScheduler};
pub use assets::decode::{SourceImage, decode_image, load_image};
pub use assets::loader::{LoadTicket, LoadedSources, PendingLoad, SourceLoader};
pub use config::params::{PARAM_COUNT, Param, ParamSpec};
pub use config::store::{Config, ConfigStore};
pub use depth::estimator::{DepthEstimator, DepthRequest, FileDepthEstimator};
pub use depth::heightfield::Heightfield;
pub use depth::normalize::{DepthMatrix, normalize_depth};
pub use foundation::core::{Rgba, Vec2, Vec3, Viewport};
pub use foundation::error::{DepthflowError, DepthflowResult};
pub use render::camera::{Camera, FOV_DEGREES};
pub use render::cpu::FrameRenderer;
pub use render::frame::FrameRGBA;
pub use render::post::{depth_of_field, depth_overlay, vignette};
pub use render::solver::{MAX_MARCH_STEPS, MarchBudget, ParallaxSolver, SurfacePoint};
pub use render::uniforms::{BACKGROUND, DofUniforms, FrameUniforms, VignetteUniforms};
pub use session::driver::{ParallaxSession, SessionOpts};
pub use session::pointer::PointerState;

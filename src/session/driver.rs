use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::animation::loops::LoopEngine;
use crate::animation::scheduler::{LoopClock, LoopScheduler};
use crate::assets::decode::SourceImage;
use crate::assets::loader::{LoadTicket, LoadedSources};
use crate::config::params::Param;
use crate::config::store::ConfigStore;
use crate::depth::heightfield::Heightfield;
use crate::foundation::core::{Rgba, Viewport};
use crate::foundation::error::{DepthflowError, DepthflowResult};
use crate::render::cpu::{FrameRenderer, build_thread_pool};
use crate::render::frame::FrameRGBA;
use crate::render::solver::MarchBudget;
use crate::render::uniforms::{BACKGROUND, FrameUniforms};
use crate::session::pointer::PointerState;

/// Largest relative aspect difference tolerated between image and heightfield.
const ASPECT_TOLERANCE: f64 = 0.01;

/// Engine knobs that are not renderer parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOpts {
    /// Render worker count; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Color of pixels whose ray misses the image plane.
    pub background: Rgba,
    pub march: MarchBudget,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            threads: None,
            background: BACKGROUND,
            march: MarchBudget::default(),
        }
    }
}

/// One interactive parallax view: a source image with its heightfield, the live parameter
/// values, the loop engine and the pointer.
///
/// Config, loops and pointer are shared handles so a UI thread and a [`LoopScheduler`] can
/// write while frames are rendered.
pub struct ParallaxSession {
    image: Arc<SourceImage>,
    heightfield: Arc<Heightfield>,
    config: Arc<ConfigStore>,
    loops: Arc<Mutex<LoopEngine>>,
    pointer: Arc<PointerState>,
    clock: LoopClock,
    installed: Option<LoadTicket>,
    opts: SessionOpts,
    pool: rayon::ThreadPool,
}

fn check_sources(image: &SourceImage, heightfield: &Heightfield) -> DepthflowResult<()> {
    let image_aspect = image.aspect();
    let depth_aspect = heightfield.aspect();
    if ((image_aspect - depth_aspect) / image_aspect).abs() > ASPECT_TOLERANCE {
        return Err(DepthflowError::data(format!(
            "image {}x{} and heightfield {}x{} differ in aspect ratio",
            image.width(),
            image.height(),
            heightfield.width(),
            heightfield.height()
        )));
    }
    Ok(())
}

impl ParallaxSession {
    pub fn new(
        image: SourceImage,
        heightfield: Heightfield,
        opts: SessionOpts,
    ) -> DepthflowResult<Self> {
        check_sources(&image, &heightfield)?;
        opts.march.validate()?;
        let pool = build_thread_pool(opts.threads)?;

        let session = Self {
            image: Arc::new(image),
            heightfield: Arc::new(heightfield),
            config: Arc::new(ConfigStore::default()),
            loops: Arc::new(Mutex::new(LoopEngine::new())),
            pointer: Arc::new(PointerState::new()),
            clock: LoopClock::default(),
            installed: None,
            opts,
            pool,
        };
        session.sync_aspect_ratio()?;
        Ok(session)
    }

    fn sync_aspect_ratio(&self) -> DepthflowResult<()> {
        let spec = Param::AspectRatio.spec();
        self.config.set(
            Param::AspectRatio,
            self.image.aspect().clamp(spec.min, spec.max),
        )
    }

    /// Swap in a new upload. Config, loops and pointer carry over.
    pub fn replace_sources(
        &mut self,
        image: SourceImage,
        heightfield: Heightfield,
    ) -> DepthflowResult<()> {
        check_sources(&image, &heightfield)?;
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "installing new sources"
        );
        self.image = Arc::new(image);
        self.heightfield = Arc::new(heightfield);
        self.sync_aspect_ratio()
    }

    /// Install a finished load from a [`crate::SourceLoader`].
    ///
    /// Returns `Ok(false)` and keeps the current sources when a load of the same or a newer
    /// generation was already installed. Tickets are compared within one loader.
    pub fn install(&mut self, loaded: LoadedSources) -> DepthflowResult<bool> {
        let generation = loaded.ticket.generation();
        if let Some(current) = self.installed
            && loaded.ticket <= current
        {
            tracing::debug!(
                generation,
                installed = current.generation(),
                "discarding load older than the installed sources"
            );
            return Ok(false);
        }
        self.replace_sources(loaded.image, loaded.heightfield)?;
        self.installed = Some(loaded.ticket);
        Ok(true)
    }

    /// Ticket of the last load accepted by [`ParallaxSession::install`].
    pub fn installed(&self) -> Option<LoadTicket> {
        self.installed
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn loops(&self) -> &Arc<Mutex<LoopEngine>> {
        &self.loops
    }

    pub fn pointer(&self) -> &Arc<PointerState> {
        &self.pointer
    }

    pub fn image(&self) -> &Arc<SourceImage> {
        &self.image
    }

    pub fn heightfield(&self) -> &Arc<Heightfield> {
        &self.heightfield
    }

    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Snapshot config and pointer into this frame's uniforms.
    pub fn uniforms(&self, viewport: Viewport) -> FrameUniforms {
        let config = self.config.snapshot();
        let mut uniforms =
            FrameUniforms::new(&config, viewport, &self.opts.march, self.opts.background);
        if let Some(origin) = self.pointer.depth_origin() {
            uniforms.depth_origin = origin;
        }
        uniforms
    }

    pub fn render_frame(&self, viewport: Viewport) -> FrameRGBA {
        let uniforms = self.uniforms(viewport);
        FrameRenderer::new(&uniforms, &self.image, &self.heightfield).render(&self.pool)
    }

    /// Advance every active loop `ticks` times.
    pub fn tick_loops(&self, ticks: u64) -> DepthflowResult<()> {
        let mut loops = self.loops.lock().unwrap_or_else(PoisonError::into_inner);
        for _ in 0..ticks {
            loops.tick(&self.config)?;
        }
        Ok(())
    }

    /// Render `frames` frames at `fps`, advancing loops by one frame of time before each.
    /// Each frame is handed to `sink` with its index.
    pub fn render_sequence<F>(
        &mut self,
        viewport: Viewport,
        frames: u32,
        fps: f64,
        mut sink: F,
    ) -> DepthflowResult<()>
    where
        F: FnMut(u32, FrameRGBA) -> DepthflowResult<()>,
    {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(DepthflowError::config(format!(
                "fps must be finite and > 0, got {fps}"
            )));
        }
        let frame_time = Duration::from_secs_f64(1.0 / fps);
        for index in 0..frames {
            let ticks = self.clock.advance(frame_time);
            self.tick_loops(ticks)?;
            sink(index, self.render_frame(viewport))?;
        }
        Ok(())
    }

    /// Start a background thread ticking this session's loops in real time.
    pub fn spawn_loop_scheduler(&self, interval: Duration) -> DepthflowResult<LoopScheduler> {
        LoopScheduler::spawn(
            Arc::clone(&self.loops),
            Arc::clone(&self.config),
            interval,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/driver.rs"]
mod tests;

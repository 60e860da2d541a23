use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;

use anyhow::Context;

use crate::assets::decode::{SourceImage, decode_image};
use crate::depth::heightfield::Heightfield;
use crate::depth::normalize::{DepthMatrix, normalize_depth};
use crate::foundation::error::DepthflowResult;

/// Generation stamp of one load request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Image and heightfield decoded together for one upload.
#[derive(Clone, Debug)]
pub struct LoadedSources {
    pub image: SourceImage,
    pub heightfield: Heightfield,
    pub ticket: LoadTicket,
}

/// Issues load generations and runs decoding off the caller's thread.
///
/// Only the most recently issued generation may be installed. Older loads still run to
/// completion but resolve to `None`.
#[derive(Clone, Debug, Default)]
pub struct SourceLoader {
    latest: Arc<AtomicU64>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding every earlier ticket.
    pub fn begin(&self) -> LoadTicket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        LoadTicket { generation }
    }

    /// Whether `ticket` is still the newest generation issued.
    pub fn accept(&self, ticket: LoadTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.generation
    }

    /// Decode `image_bytes` and normalize the JSON depth matrix in `depth_bytes` on a
    /// worker thread.
    pub fn load_async(
        &self,
        image_bytes: Vec<u8>,
        depth_bytes: Vec<u8>,
    ) -> DepthflowResult<PendingLoad> {
        let ticket = self.begin();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = std::thread::Builder::new()
            .name(format!("depthflow-load-{}", ticket.generation))
            .spawn(move || decode_sources(&image_bytes, &depth_bytes, &flag))
            .context("spawn source load thread")?;

        Ok(PendingLoad {
            ticket,
            cancelled,
            loader: self.clone(),
            handle,
        })
    }
}

fn decode_sources(
    image_bytes: &[u8],
    depth_bytes: &[u8],
    cancelled: &AtomicBool,
) -> DepthflowResult<Option<(SourceImage, Heightfield)>> {
    let image = decode_image(image_bytes)?;
    if cancelled.load(Ordering::Acquire) {
        return Ok(None);
    }
    let depth = DepthMatrix::from_json(depth_bytes)?;
    if cancelled.load(Ordering::Acquire) {
        return Ok(None);
    }
    let heightfield = normalize_depth(&depth)?;
    Ok(Some((image, heightfield)))
}

/// In-flight load. Resolve with [`PendingLoad::wait`].
#[derive(Debug)]
pub struct PendingLoad {
    ticket: LoadTicket,
    cancelled: Arc<AtomicBool>,
    loader: SourceLoader,
    handle: JoinHandle<DepthflowResult<Option<(SourceImage, Heightfield)>>>,
}

impl PendingLoad {
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Ask the worker to stop early. The load resolves to `None`.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the worker finishes.
    ///
    /// Returns `Ok(None)` when the load was cancelled or superseded by a newer generation,
    /// whatever the worker produced.
    pub fn wait(self) -> DepthflowResult<Option<LoadedSources>> {
        let generation = self.ticket.generation;
        let outcome = self
            .handle
            .join()
            .map_err(|_| anyhow::anyhow!("source load worker panicked"))?;

        if self.cancelled.load(Ordering::Acquire) {
            tracing::debug!(generation, "source load cancelled");
            return Ok(None);
        }
        if !self.loader.accept(self.ticket) {
            tracing::debug!(generation, "discarding stale source load");
            return Ok(None);
        }

        Ok(outcome?.map(|(image, heightfield)| {
            tracing::debug!(
                generation,
                width = image.width(),
                height = image.height(),
                "source load ready"
            );
            LoadedSources {
                image,
                heightfield,
                ticket: self.ticket,
            }
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
